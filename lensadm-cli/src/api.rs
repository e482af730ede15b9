//! API client for the Kube User Manager backend
//!
//! Every backend call goes through [`ApiClient::request`], which attaches
//! the JSON and bearer headers, maps failures to [`DashboardError`] and ends
//! the session on HTTP 401.

use crate::error::{DashboardError, Result, AUTH_FAILED, REQUEST_FAILED};
use crate::session::SessionManager;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed prefix of every backend endpoint
pub const API_BASE: &str = "/api";

/// Per-call options for [`ApiClient::request`]
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    /// Extra headers; they override the defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(server: &str, session: Arc<SessionManager>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: format!("{}{}", server.trim_end_matches('/'), API_BASE),
            client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Build headers for requests
    fn headers(&self, extra: HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.session.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers.extend(extra);
        headers
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %options.method, %url, "sending request");

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(self.headers(options.headers));
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            info!(method = %options.method, %url, "request unauthorized, ending session");
            self.session.end();
            return Err(DashboardError::Auth(AUTH_FAILED.to_string()));
        }

        if !status.is_success() {
            let message = error_detail(&bytes).unwrap_or_else(|| REQUEST_FAILED.to_string());
            info!(method = %options.method, %url, status = status.as_u16(), %message, "request failed");
            return Err(DashboardError::Request {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(path, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.request(path, RequestOptions::new(Method::PUT).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }
}

/// `/{collection}/{name}` with the name percent-encoded
pub fn resource_path(collection: &str, name: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(name))
}

/// `resource_path` plus a `namespace` query parameter
pub fn namespaced_path(collection: &str, name: &str, suffix: &str, namespace: &str) -> String {
    format!(
        "{}{}?namespace={}",
        resource_path(collection, name),
        suffix,
        urlencoding::encode(namespace)
    )
}

/// Message from a FastAPI error body
///
/// `detail` is either a string or a list of validation entries with `msg`.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::notify::MemoryNotifier;
    use lensadm_common::auth::Session;

    fn client(dir: &tempfile::TempDir) -> ApiClient {
        let store = ConfigStore::open(dir.path().join("cli.toml")).unwrap();
        let session = Arc::new(SessionManager::new(store, Arc::new(MemoryNotifier::new())));
        ApiClient::new("http://localhost:8080/", session).unwrap()
    }

    #[test]
    fn test_base_url_has_api_prefix() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(client(&dir).base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_headers_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let headers = client(&dir).headers(HeaderMap::new());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_with_session_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let api = client(&dir);
        api.session().begin(Session::new("tok", "admin")).unwrap();

        let mut extra = HeaderMap::new();
        extra.insert("x-request-id", HeaderValue::from_static("42"));
        let headers = api.headers(extra);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get("x-request-id").unwrap(), "42");
    }

    #[test]
    fn test_paths_are_encoded() {
        assert_eq!(resource_path("clusterroles", "view"), "/clusterroles/view");
        assert_eq!(
            namespaced_path("lensusers", "admin izin", "/kubeconfig", "kube-system"),
            "/lensusers/admin%20izin/kubeconfig?namespace=kube-system"
        );
    }

    #[test]
    fn test_error_detail_variants() {
        assert_eq!(
            error_detail(br#"{"detail": "user exists"}"#).as_deref(),
            Some("user exists")
        );
        assert_eq!(
            error_detail(br#"{"detail": [{"msg": "field required"}, {"msg": "bad"}]}"#).as_deref(),
            Some("field required; bad")
        );
        assert_eq!(error_detail(b"<html>500</html>"), None);
        assert_eq!(error_detail(br#"{"detail": ""}"#), None);
    }
}
