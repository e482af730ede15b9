//! Dashboard error taxonomy

use lensadm_common::forms::ValidationError;
use thiserror::Error;

/// Message reported when the backend rejects the session
pub const AUTH_FAILED: &str = "authentication failed, please log in again";

/// Message reported when a failed response carries no usable detail
pub const REQUEST_FAILED: &str = "request failed";

#[derive(Error, Debug)]
pub enum DashboardError {
    /// HTTP 401; the session has already been cleared
    #[error("{0}")]
    Auth(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn is_auth(&self) -> bool {
        matches!(self, DashboardError::Auth(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }

    /// HTTP status for request errors
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Auth(_) => Some(401),
            DashboardError::Request { status, .. } => Some(*status),
            DashboardError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(e: toml::de::Error) -> Self {
        DashboardError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for DashboardError {
    fn from(e: toml::ser::Error) -> Self {
        DashboardError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
