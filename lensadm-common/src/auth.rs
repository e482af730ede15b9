//! Authentication types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authenticated session held by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    /// A session counts as logged in only when both fields are present
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty() && !self.username.is_empty()
    }
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Reply of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Reply of `GET /me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
