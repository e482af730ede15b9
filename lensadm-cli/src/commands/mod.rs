//! Command handlers for the `lensadm` binary

pub mod auth;
pub mod dashboard;
pub mod namespace;
pub mod role;
pub mod user;

use anyhow::Result;
use lensadm_cli::notify::ConsoleNotifier;
use lensadm_cli::output::{self, OutputFormat};
use lensadm_cli::Dashboard;
use std::future::Future;

/// Everything a command handler needs
pub struct App {
    pub dashboard: Dashboard,
    pub console: ConsoleNotifier,
    pub format: OutputFormat,
}

impl App {
    /// Adopt the saved session, or fail with a hint to log in
    pub fn require_login(&self) -> Result<()> {
        if self.dashboard.restore_session() {
            Ok(())
        } else {
            anyhow::bail!("not logged in, run `lensadm auth login` first")
        }
    }

    /// Await `fut` behind a spinner
    pub async fn with_spinner<F: Future>(&self, message: &str, fut: F) -> F::Output {
        let spinner = output::spinner(self.console.progress(), message);
        let result = fut.await;
        spinner.finish_and_clear();
        result
    }
}
