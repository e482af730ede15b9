//! Common types shared by every client of the Kube User Manager API

pub mod auth;
pub mod forms;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace lens users are created in unless told otherwise
pub const DEFAULT_NAMESPACE: &str = "kube-system";

/// Role granted to a freshly created user
pub const DEFAULT_ROLE: &str = "admin";

/// Label the backend puts on every cluster role it manages
pub const MANAGED_LABEL: &str = "usermanager.osip.cc/managed";

/// Label holding the human-readable role description
pub const DESCRIPTION_LABEL: &str = "description";

/// Response envelope wrapped around every successful backend reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap `data`, treating a missing payload as the type's default
    pub fn into_data(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }
}

/// Kubernetes-style object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(
        rename = "creationTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Role binding reference carried by a lens user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl RoleRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Both the role and its namespace are filled in
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.namespace.is_empty()
    }
}

impl std::fmt::Display for RoleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.namespace)
    }
}

impl std::str::FromStr for RoleRef {
    type Err = String;

    /// Parse `role@namespace`; a bare role binds in the default namespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, namespace) = match s.split_once('@') {
            Some((name, namespace)) => (name.trim(), namespace.trim()),
            None => (s.trim(), DEFAULT_NAMESPACE),
        };
        if name.is_empty() || namespace.is_empty() {
            return Err(format!("invalid role binding '{}', expected ROLE@NAMESPACE", s));
        }
        Ok(Self::new(name, namespace))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensUserSpec {
    #[serde(default)]
    pub roles: Vec<RoleRef>,
}

/// Lens user custom resource as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensUser {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: LensUserSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl LensUser {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Same name and namespace as `other`
    pub fn same_identity(&self, other: &LensUser) -> bool {
        self.name() == other.name() && self.namespace() == other.namespace()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.metadata.creation_timestamp.as_deref())
    }

    /// Failure message recorded by the operator while provisioning this user
    ///
    /// The operator stores handler progress under `status.kopf.progress`; any
    /// entry with a `failure` flag means no kubeconfig will be produced.
    pub fn provisioning_failure(&self) -> Option<String> {
        let progress = self
            .status
            .as_ref()?
            .get("kopf")?
            .get("progress")?
            .as_object()?;

        progress.values().find_map(|entry| {
            let failed = entry
                .get("failure")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            failed.then(|| {
                entry
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("provisioning failed")
                    .to_string()
            })
        })
    }
}

/// RBAC policy rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub resource_names: Vec<String>,
}

impl PolicyRule {
    /// One-line summary such as `get,list pods`
    pub fn summary(&self) -> String {
        let resources = if self.resources.is_empty() {
            "*".to_string()
        } else {
            self.resources.join(",")
        };
        format!("{} {}", self.verbs.join(","), resources)
    }
}

/// Cluster role managed by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRole {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
    #[serde(
        rename = "creationTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_timestamp: Option<String>,
}

impl ClusterRole {
    pub fn description(&self) -> &str {
        self.labels
            .get(DESCRIPTION_LABEL)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_managed(&self) -> bool {
        self.labels.get(MANAGED_LABEL).map(String::as_str) == Some("true")
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.creation_timestamp.as_deref())
    }
}

/// Body of `POST /lensusers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLensUserRequest {
    pub name: String,
    pub namespace: String,
    pub roles: Vec<RoleRef>,
}

/// Body of `PUT /lensusers/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLensUserRequest {
    pub roles: Vec<RoleRef>,
}

/// Body of `POST /clusterroles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterRoleRequest {
    pub name: String,
    pub description: String,
    pub rules: Vec<PolicyRule>,
}

/// Body of `PUT /clusterroles/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClusterRoleRequest {
    pub description: String,
    pub rules: Vec<PolicyRule>,
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
