//! In-process mock of the user manager backend
//!
//! Every request is recorded before routing so tests can assert on exactly
//! what the client sent, including requests that never reach a handler.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lensadm_cli::config::ConfigStore;
use lensadm_cli::notify::{MemoryNotifier, StaticConfirm};
use lensadm_cli::{Dashboard, DashboardOptions};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct Backend {
    pub requests: Mutex<Vec<Recorded>>,
    pub users: Mutex<Vec<Value>>,
    pub roles: Mutex<Vec<Value>>,
    pub namespaces: Vec<String>,
    /// Answer 401 to every authenticated route
    pub reject_token: AtomicBool,
    /// Answer kubeconfig requests without a `data` field
    pub kubeconfig_missing: AtomicBool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            users: Mutex::new(vec![lens_user(
                "alice",
                "kube-system",
                &[("admin", "kube-system")],
            )]),
            roles: Mutex::new(vec![
                cluster_role("admin", "Full access", &["*"]),
                cluster_role("view", "Read only", &["get", "list"]),
            ]),
            namespaces: vec!["default".to_string(), "kube-system".to_string()],
            reject_token: AtomicBool::new(false),
            kubeconfig_missing: AtomicBool::new(false),
        }
    }
}

pub fn lens_user(name: &str, namespace: &str, roles: &[(&str, &str)]) -> Value {
    let roles: Vec<Value> = roles
        .iter()
        .map(|(role, ns)| json!({"name": role, "namespace": ns}))
        .collect();
    json!({
        "apiVersion": "usermanager.osip.cc/v1",
        "kind": "LensUser",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "creationTimestamp": "2024-05-01T08:00:00Z"
        },
        "spec": {"roles": roles}
    })
}

pub fn cluster_role(name: &str, description: &str, verbs: &[&str]) -> Value {
    json!({
        "name": name,
        "labels": {
            "usermanager.osip.cc/managed": "true",
            "description": description
        },
        "rules": [{"apiGroups": [""], "resources": ["pods"], "verbs": verbs}],
        "creationTimestamp": "2024-05-01T08:00:00Z"
    })
}

fn envelope(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn done(message: &str) -> Response {
    Json(json!({"success": true, "message": message})).into_response()
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"detail": message}))).into_response()
}

fn check_token(backend: &Backend, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if backend.reject_token.load(Ordering::SeqCst) || presented != Some(expected.as_str()) {
        return Err(detail(
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials",
        ));
    }
    Ok(())
}

async fn record(State(backend): State<Arc<Backend>>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    backend.requests.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect username or password")
    }
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    Json(json!({"username": USERNAME, "disabled": false})).into_response()
}

async fn namespaces(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    envelope(json!(backend.namespaces))
}

fn namespace_of(query: &HashMap<String, String>) -> String {
    query
        .get("namespace")
        .cloned()
        .unwrap_or_else(|| "kube-system".to_string())
}

fn same_user(user: &Value, name: &str, namespace: &str) -> bool {
    user["metadata"]["name"] == name && user["metadata"]["namespace"] == namespace
}

async fn list_users(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let users = backend.users.lock().unwrap();
    let selected: Vec<Value> = users
        .iter()
        .filter(|u| match query.get("namespace") {
            Some(ns) => u["metadata"]["namespace"] == ns.as_str(),
            None => true,
        })
        .cloned()
        .collect();
    envelope(json!(selected))
}

async fn create_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let namespace = body["namespace"].as_str().unwrap_or_default().to_string();

    let mut users = backend.users.lock().unwrap();
    if users.iter().any(|u| same_user(u, &name, &namespace)) {
        return detail(
            StatusCode::CONFLICT,
            &format!("lensuser {} already exists", name),
        );
    }
    let mut user = lens_user(&name, &namespace, &[]);
    user["spec"]["roles"] = body["roles"].clone();
    users.push(user);
    done("created")
}

async fn get_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let namespace = namespace_of(&query);
    let users = backend.users.lock().unwrap();
    match users.iter().find(|u| same_user(u, &name, &namespace)) {
        Some(user) => envelope(user.clone()),
        None => detail(StatusCode::NOT_FOUND, "lensuser not found"),
    }
}

async fn update_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let namespace = namespace_of(&query);
    let mut users = backend.users.lock().unwrap();
    match users.iter_mut().find(|u| same_user(u, &name, &namespace)) {
        Some(user) => {
            user["spec"]["roles"] = body["roles"].clone();
            done("updated")
        }
        None => detail(StatusCode::NOT_FOUND, "lensuser not found"),
    }
}

async fn delete_user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let namespace = namespace_of(&query);
    let mut users = backend.users.lock().unwrap();
    let before = users.len();
    users.retain(|u| !same_user(u, &name, &namespace));
    if users.len() == before {
        return detail(StatusCode::NOT_FOUND, "lensuser not found");
    }
    done("deleted")
}

async fn kubeconfig(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    if backend.kubeconfig_missing.load(Ordering::SeqCst) {
        return done("no kubeconfig");
    }
    let namespace = namespace_of(&query);
    envelope(json!({
        "apiVersion": "v1",
        "kind": "Config",
        "current-context": format!("{}@lens", name),
        "clusters": [{"name": "lens", "cluster": {"server": "https://10.0.0.1:6443"}}],
        "contexts": [{
            "name": format!("{}@lens", name),
            "context": {"cluster": "lens", "user": name.clone(), "namespace": namespace}
        }],
        "users": [{"name": name.clone(), "user": {"token": "sa-token"}}]
    }))
}

async fn list_roles(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    envelope(json!(*backend.roles.lock().unwrap()))
}

async fn create_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let name = body["name"].as_str().unwrap_or_default();
    let description = body["description"].as_str().unwrap_or_default();
    let mut role = cluster_role(name, description, &[]);
    role["rules"] = body["rules"].clone();
    backend.roles.lock().unwrap().push(role);
    done("created")
}

async fn get_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let roles = backend.roles.lock().unwrap();
    match roles.iter().find(|r| r["name"] == name.as_str()) {
        Some(role) => envelope(role.clone()),
        None => detail(StatusCode::NOT_FOUND, "clusterrole not found"),
    }
}

async fn update_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    let mut roles = backend.roles.lock().unwrap();
    match roles.iter_mut().find(|r| r["name"] == name.as_str()) {
        Some(role) => {
            role["labels"]["description"] = body["description"].clone();
            role["rules"] = body["rules"].clone();
            done("updated")
        }
        None => detail(StatusCode::NOT_FOUND, "clusterrole not found"),
    }
}

async fn delete_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if let Err(response) = check_token(&backend, &headers) {
        return response;
    }
    backend
        .roles
        .lock()
        .unwrap()
        .retain(|r| r["name"] != name.as_str());
    done("deleted")
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/me", get(me))
        .route("/api/namespaces", get(namespaces))
        .route("/api/lensusers", get(list_users).post(create_user))
        .route(
            "/api/lensusers/:name",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/lensusers/:name/kubeconfig", get(kubeconfig))
        .route("/api/clusterroles", get(list_roles).post(create_role))
        .route(
            "/api/clusterroles/:name",
            get(get_role).put(update_role).delete(delete_role),
        )
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

pub struct MockServer {
    pub url: String,
    pub backend: Arc<Backend>,
}

impl MockServer {
    pub async fn start(backend: Backend) -> Self {
        let backend = Arc::new(backend);
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            backend,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.backend.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.backend.requests.lock().unwrap().clear();
    }

    /// Number of recorded requests with this method and path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn reject_token(&self) {
        self.backend.reject_token.store(true, Ordering::SeqCst);
    }

    pub fn drop_kubeconfig(&self) {
        self.backend.kubeconfig_missing.store(true, Ordering::SeqCst);
    }
}

/// A dashboard wired to a fresh mock backend and a temporary config file
pub struct Harness {
    pub server: MockServer,
    pub dashboard: Dashboard,
    pub notifier: MemoryNotifier,
    pub store: ConfigStore,
    pub dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_confirm(true).await
    }

    /// `answer` is what every delete confirmation returns
    pub async fn with_confirm(answer: bool) -> Self {
        let server = MockServer::start(Backend::default()).await;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("cli.toml")).unwrap();
        let notifier = MemoryNotifier::new();
        let dashboard = dashboard(&server.url, store.clone(), notifier.clone(), answer);

        Self {
            server,
            dashboard,
            notifier,
            store,
            dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("cli.toml")
    }

    /// A second dashboard over the same config file, as after a restart
    pub fn reopen(&self) -> (Dashboard, MemoryNotifier) {
        let store = ConfigStore::open(self.config_path()).unwrap();
        let notifier = MemoryNotifier::new();
        let dashboard = dashboard(&self.server.url, store, notifier.clone(), true);
        (dashboard, notifier)
    }

    pub async fn login(&self) {
        self.dashboard.login(USERNAME, PASSWORD).await.unwrap();
        self.server.clear_requests();
        self.notifier.clear();
    }

    /// How many notifications carry exactly this message
    pub fn notices_with(&self, message: &str) -> usize {
        self.notifier
            .notices()
            .iter()
            .filter(|n| n.message == message)
            .count()
    }
}

fn dashboard(url: &str, store: ConfigStore, notifier: MemoryNotifier, answer: bool) -> Dashboard {
    Dashboard::new(DashboardOptions {
        server: url.to_string(),
        store,
        notifier: Arc::new(notifier),
        confirm: Arc::new(StaticConfirm(answer)),
    })
    .unwrap()
}
