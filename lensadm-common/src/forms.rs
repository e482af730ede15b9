//! Editable form buffers and their client-side validation

use crate::{ClusterRole, LensUser, PolicyRule, RoleRef, DEFAULT_NAMESPACE, DEFAULT_ROLE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule editor contents offered when a new role is created
pub const RULES_TEMPLATE: &str = r#"- apiGroups: [""]
  resources: ["pods"]
  verbs: ["get", "list"]"#;

/// Client-side rejection; nothing is sent to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter a username and password")]
    MissingCredentials,
    #[error("please enter a user name")]
    EmptyUserName,
    #[error("add at least one role binding")]
    NoRoles,
    #[error("role binding #{} needs both a role and a namespace", .index + 1)]
    IncompleteRole { index: usize },
    #[error("please enter a role name")]
    EmptyRoleName,
    #[error("YAML format error: {0}")]
    InvalidYaml(String),
    #[error("rules must be a YAML list")]
    RulesNotList,
    #[error("add at least one rule")]
    NoRules,
    #[error("kubeconfig content is empty")]
    EmptyKubeconfig,
}

/// How thoroughly a user form is checked before saving
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every role binding must name both a role and a namespace
    #[default]
    Strict,
    /// Only the user name and the number of bindings are checked
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

/// Edit buffer of the user editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub namespace: String,
    pub roles: Vec<RoleRef>,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            roles: Vec::new(),
        }
    }
}

impl UserForm {
    /// Buffer for a new user: one admin binding in the default namespace
    pub fn for_create() -> Self {
        Self {
            roles: vec![RoleRef::new(DEFAULT_ROLE, DEFAULT_NAMESPACE)],
            ..Self::default()
        }
    }

    /// Deep copy of an existing user so edits never touch the cached list
    pub fn from_user(user: &LensUser) -> Self {
        Self {
            name: user.metadata.name.clone(),
            namespace: user.metadata.namespace.clone(),
            roles: user.spec.roles.clone(),
        }
    }

    pub fn validate(&self, mode: ValidationMode) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyUserName);
        }
        if self.roles.is_empty() {
            return Err(ValidationError::NoRoles);
        }
        if mode == ValidationMode::Strict {
            if let Some(index) = self.roles.iter().position(|r| !r.is_complete()) {
                return Err(ValidationError::IncompleteRole { index });
            }
        }
        Ok(())
    }
}

/// Edit buffer of the role editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleForm {
    pub name: String,
    pub description: String,
    pub rules: Vec<PolicyRule>,
    /// Free-text YAML editor; parsed into `rules` on save
    pub rules_yaml: String,
}

impl RoleForm {
    pub fn for_create() -> Self {
        Self {
            rules_yaml: RULES_TEMPLATE.to_string(),
            ..Self::default()
        }
    }

    /// Copy of an existing role; the caller renders `rules_yaml`
    pub fn from_role(role: &ClusterRole) -> Self {
        Self {
            name: role.name.clone(),
            description: role.description().to_string(),
            rules: role.rules.clone(),
            rules_yaml: String::new(),
        }
    }

    pub fn validate_name(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyRoleName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(roles: Vec<RoleRef>) -> UserForm {
        UserForm {
            name: "alice".to_string(),
            namespace: "kube-system".to_string(),
            roles,
        }
    }

    #[test]
    fn test_create_form_defaults() {
        let form = UserForm::for_create();
        assert!(form.name.is_empty());
        assert_eq!(form.namespace, "kube-system");
        assert_eq!(form.roles, vec![RoleRef::new("admin", "kube-system")]);
    }

    #[test]
    fn test_user_form_rejects_missing_name_and_roles() {
        let mut empty_name = form(vec![RoleRef::new("admin", "default")]);
        empty_name.name.clear();
        assert_eq!(
            empty_name.validate(ValidationMode::Strict),
            Err(ValidationError::EmptyUserName)
        );
        assert_eq!(
            form(vec![]).validate(ValidationMode::Lenient),
            Err(ValidationError::NoRoles)
        );
    }

    #[test]
    fn test_incomplete_role_depends_on_mode() {
        let form = form(vec![
            RoleRef::new("admin", "default"),
            RoleRef::new("", "default"),
        ]);
        assert_eq!(
            form.validate(ValidationMode::Strict),
            Err(ValidationError::IncompleteRole { index: 1 })
        );
        assert_eq!(form.validate(ValidationMode::Lenient), Ok(()));
    }

    #[test]
    fn test_incomplete_role_message_is_one_based() {
        let err = ValidationError::IncompleteRole { index: 0 };
        assert_eq!(
            err.to_string(),
            "role binding #1 needs both a role and a namespace"
        );
    }

    #[test]
    fn test_edit_buffer_is_detached_from_user() {
        let mut user = LensUser::default();
        user.metadata.name = "alice".to_string();
        user.spec.roles = vec![RoleRef::new("admin", "default")];

        let mut form = UserForm::from_user(&user);
        form.roles[0].name = "view".to_string();
        assert_eq!(user.spec.roles[0].name, "admin");
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        assert_eq!(
            LoginForm::new("admin", "").validate(),
            Err(ValidationError::MissingCredentials)
        );
        assert!(LoginForm::new("admin izin", "x").validate().is_ok());
    }

    #[test]
    fn test_role_form_defaults() {
        let form = RoleForm::for_create();
        assert_eq!(form.rules_yaml, RULES_TEMPLATE);
        assert_eq!(form.validate_name(), Err(ValidationError::EmptyRoleName));
    }
}
