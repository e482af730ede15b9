//! Authentication commands

use super::App;
use anyhow::Result;
use clap::Subcommand;
use dialoguer::{Input, Password};
use lensadm_cli::output;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in to the user manager
    Login {
        /// Username (will be prompted if not provided)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (will be prompted if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Logout (clear stored credentials)
    Logout,

    /// Show current authentication status
    Status,

    /// Show the account the server associates with the stored token
    Whoami,
}

pub async fn handle_auth_command(command: AuthCommands, app: &App) -> Result<()> {
    match command {
        AuthCommands::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => Input::<String>::new()
                    .with_prompt("Username")
                    .allow_empty(true)
                    .interact_text()?,
            };
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()?,
            };

            let session = app
                .with_spinner("Logging in", app.dashboard.login(&username, &password))
                .await?;

            println!("  Username:   {}", session.username);
            println!("  Users:      {}", app.dashboard.users().list().len());
            println!("  Roles:      {}", app.dashboard.roles().list().len());
            println!("  Namespaces: {}", app.dashboard.namespaces().list().len());
        }

        AuthCommands::Logout => {
            if app.dashboard.restore_session() {
                app.dashboard.logout();
            } else {
                output::print_info("Not logged in");
            }
        }

        AuthCommands::Status => {
            let server = app.dashboard.context().api.base_url().to_string();
            if app.dashboard.restore_session() {
                output::print_success(&format!("Logged in as {}", app.dashboard.username()));
            } else {
                output::print_warning("Not logged in");
            }
            println!("  Server: {}", server);
        }

        AuthCommands::Whoami => {
            app.require_login()?;
            let me = app.dashboard.whoami().await?;
            output::print_single(&me, app.format)?;
        }
    }

    Ok(())
}
