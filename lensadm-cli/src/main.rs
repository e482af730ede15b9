//! Lensadm CLI
//!
//! Command-line client for the Lens user manager backend

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::auth::AuthCommands;
use commands::namespace::NamespaceCommands;
use commands::role::RoleCommands;
use commands::user::UserCommands;
use commands::App;
use lensadm_cli::config::{Config, ConfigStore};
use lensadm_cli::logging::LoggingConfig;
use lensadm_cli::menu::Section;
use lensadm_cli::notify::{ConsoleNotifier, TerminalConfirm};
use lensadm_cli::output::{self, OutputFormat};
use lensadm_cli::{Dashboard, DashboardError, DashboardOptions};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API server address (defaults to the configured server)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Restore the session and show the active section
    Dashboard,
    /// Show or switch the active section
    Menu {
        /// users or roles
        section: Option<Section>,
    },
    /// Manage lens users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage cluster roles
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },
    /// List namespaces
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // Dashboard errors were already shown by the notifier
        if err.downcast_ref::<DashboardError>().is_none() {
            output::print_error(&format!("{:#}", err));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let _log_guard = LoggingConfig {
        level: cli.log_level.clone(),
        file_path: cli.log_file.clone(),
        json_format: false,
    }
    .init()
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    // Setup failures have not been shown yet, so keep them printable
    let app = build_app(&cli).map_err(|e| anyhow::anyhow!("{}", e))?;

    match cli.command {
        Commands::Auth { command } => commands::auth::handle_auth_command(command, &app).await?,
        Commands::Dashboard => commands::dashboard::handle_dashboard_command(&app).await?,
        Commands::Menu { section } => {
            commands::dashboard::handle_menu_command(section, &app).await?
        }
        Commands::User { command } => commands::user::handle_user_command(command, &app).await?,
        Commands::Role { command } => commands::role::handle_role_command(command, &app).await?,
        Commands::Namespace { command } => {
            commands::namespace::handle_namespace_command(command, &app).await?
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn build_app(cli: &Cli) -> lensadm_cli::Result<App> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let store = ConfigStore::open(config_path)?;
    let config = store.get();

    let console = ConsoleNotifier::new();
    let dashboard = Dashboard::new(DashboardOptions {
        server: cli.server.clone().unwrap_or(config.default_server),
        store,
        notifier: Arc::new(console.clone()),
        confirm: Arc::new(TerminalConfirm {
            assume_yes: cli.yes,
        }),
    })?;

    Ok(App {
        dashboard,
        console,
        format: OutputFormat::parse(cli.output.as_deref().unwrap_or(&config.default_output)),
    })
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
