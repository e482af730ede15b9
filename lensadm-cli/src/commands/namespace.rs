use super::App;
use anyhow::Result;
use clap::Subcommand;
use lensadm_cli::output;
use tabled::Tabled;

#[derive(Subcommand)]
pub enum NamespaceCommands {
    /// List namespaces users can be bound in
    List,
}

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "NAME")]
    name: String,
}

pub async fn handle_namespace_command(command: NamespaceCommands, app: &App) -> Result<()> {
    app.require_login()?;
    let namespaces = app.dashboard.namespaces();

    match command {
        NamespaceCommands::List => {
            app.with_spinner("Loading namespaces", namespaces.load())
                .await?;
            let list = namespaces.list();
            let rows = list
                .iter()
                .map(|name| NamespaceRow { name: name.clone() })
                .collect();
            output::print_output::<NamespaceRow, _>(rows, &list, app.format)?;
        }
    }

    Ok(())
}
