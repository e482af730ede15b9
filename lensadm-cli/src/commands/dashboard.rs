//! Dashboard overview and section switching

use super::{role, user, App};
use anyhow::Result;
use lensadm_cli::menu::Section;
use lensadm_cli::output;

/// Restore the session, load the active section and print it
pub async fn handle_dashboard_command(app: &App) -> Result<()> {
    let restored = app
        .with_spinner("Loading dashboard", app.dashboard.startup())
        .await;
    if !restored {
        anyhow::bail!("not logged in, run `lensadm auth login` first");
    }

    print_section(app, app.dashboard.menu().active())
}

/// Print the active section, or switch to `section` and print it
pub async fn handle_menu_command(section: Option<Section>, app: &App) -> Result<()> {
    let Some(section) = section else {
        let menu = app.dashboard.menu();
        println!("{} ({})", menu.page_title(), menu.active());
        return Ok(());
    };

    app.require_login()?;
    app.with_spinner("Loading", app.dashboard.select_menu(section))
        .await?;
    print_section(app, section)
}

fn print_section(app: &App, section: Section) -> Result<()> {
    if app.format == output::OutputFormat::Table {
        output::print_heading(app.dashboard.page_title());
        output::print_info(&format!("Logged in as {}", app.dashboard.username()));
    }

    match section {
        Section::Users => user::print_users(&app.dashboard.users().list(), app.format),
        Section::Roles => role::print_roles(&app.dashboard.roles().list(), app.format),
    }
}
