//! Lensadm
//!
//! Client library for the Lens user manager backend: session handling, the
//! authenticated API client and the controllers behind the `lensadm` CLI.

pub mod api;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod logging;
pub mod menu;
pub mod namespaces;
pub mod notify;
pub mod observable;
pub mod output;
pub mod roles;
pub mod session;
pub mod users;

pub use dashboard::{Dashboard, DashboardOptions};
pub use error::{DashboardError, Result};
