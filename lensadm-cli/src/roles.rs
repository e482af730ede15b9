//! Cluster role management

use crate::api::resource_path;
use crate::context::Context;
use crate::editor::{Editor, EditorMode};
use crate::error::{DashboardError, Result};
use crate::observable::Observable;
use lensadm_common::forms::{RoleForm, ValidationError};
use lensadm_common::{
    ClusterRole, CreateClusterRoleRequest, Envelope, PolicyRule, UpdateClusterRoleRequest,
};
use tracing::info;

/// Read-only role viewer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleViewer {
    pub visible: bool,
    pub role: Option<ClusterRole>,
}

pub struct RoleController {
    ctx: Context,
    roles: Observable<Vec<ClusterRole>>,
    editor: Observable<Editor<RoleForm>>,
    viewer: Observable<RoleViewer>,
}

impl RoleController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            roles: Observable::default(),
            editor: Observable::default(),
            viewer: Observable::default(),
        }
    }

    pub fn roles(&self) -> Observable<Vec<ClusterRole>> {
        self.roles.clone()
    }

    pub fn editor(&self) -> Observable<Editor<RoleForm>> {
        self.editor.clone()
    }

    pub fn viewer(&self) -> Observable<RoleViewer> {
        self.viewer.clone()
    }

    pub fn list(&self) -> Vec<ClusterRole> {
        self.roles.get()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.with(Vec::is_empty)
    }

    pub fn find(&self, name: &str) -> Option<ClusterRole> {
        self.roles
            .with(|roles| roles.iter().find(|r| r.name == name).cloned())
    }

    /// `GET /clusterroles`; any failure empties the list
    pub async fn load(&self) -> Result<()> {
        let _busy = self.ctx.busy();
        match self
            .ctx
            .api
            .get::<Envelope<Vec<ClusterRole>>>("/clusterroles")
            .await
        {
            Ok(envelope) => {
                self.roles.set(envelope.into_data());
                Ok(())
            }
            Err(err) => {
                self.ctx.report("load roles", &err);
                self.roles.set(Vec::new());
                Err(err)
            }
        }
    }

    pub async fn fetch(&self, name: &str) -> Result<ClusterRole> {
        let result: Result<ClusterRole> = async {
            let envelope: Envelope<ClusterRole> = self
                .ctx
                .api
                .get(&resource_path("clusterroles", name))
                .await?;
            envelope.data.ok_or_else(|| DashboardError::Request {
                status: 404,
                message: format!("role {} not found", name),
            })
        }
        .await;
        self.ctx.reported("fetch role", result)
    }

    pub fn open_create(&self) {
        self.editor
            .set(Editor::open(EditorMode::Create, RoleForm::for_create()));
    }

    /// Open the editor on a copy of `role`, rules rendered as YAML
    pub fn open_edit(&self, role: &ClusterRole) -> Result<()> {
        let mut form = RoleForm::from_role(role);
        form.rules_yaml = self
            .ctx
            .reported("edit role", render_rules(&form.rules))?;
        self.editor.set(Editor::open(EditorMode::Edit, form));
        Ok(())
    }

    pub fn close_editor(&self) {
        self.editor.set(Editor::default());
    }

    pub fn form(&self) -> RoleForm {
        self.editor.with(|e| e.form.clone())
    }

    pub fn edit_form(&self, f: impl FnOnce(&mut RoleForm)) {
        self.editor.update(|e| f(&mut e.form));
    }

    pub fn view(&self, role: &ClusterRole) {
        self.viewer.set(RoleViewer {
            visible: true,
            role: Some(role.clone()),
        });
    }

    pub fn close_view(&self) {
        self.viewer.update(|v| v.visible = false);
    }

    /// Append an empty rule to the rules in the YAML editor
    ///
    /// Text that does not parse is left as it is and the change is refused.
    pub fn add_rule(&self) -> Result<()> {
        let mut rules = self.editor_rules("add rule")?;
        rules.push(PolicyRule::default());
        self.store_rules(rules)
    }

    /// `Ok(false)` and no change when `index` is out of range
    pub fn remove_rule(&self, index: usize) -> Result<bool> {
        let mut rules = self.editor_rules("remove rule")?;
        if index >= rules.len() {
            return Ok(false);
        }
        rules.remove(index);
        self.store_rules(rules)?;
        Ok(true)
    }

    fn editor_rules(&self, op: &str) -> Result<Vec<PolicyRule>> {
        let yaml = self.editor.with(|e| e.form.rules_yaml.clone());
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.ctx
            .reported(op, parse_rules(&yaml).map_err(DashboardError::from))
    }

    fn store_rules(&self, rules: Vec<PolicyRule>) -> Result<()> {
        let yaml = self.ctx.reported("render rules", render_rules(&rules))?;
        self.editor.update(|e| {
            e.form.rules = rules;
            e.form.rules_yaml = yaml;
        });
        Ok(())
    }

    /// Parse the YAML editor, validate, then create or update the role
    pub async fn save(&self) -> Result<()> {
        let result = self.submit().await;
        self.ctx.reported("save role", result)?;
        self.close_editor();
        let _ = self.load().await;
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let (mode, form) = self.editor.with(|e| (e.mode, e.form.clone()));
        form.validate_name()?;

        let rules = parse_rules(&form.rules_yaml)?;
        self.edit_form(|f| f.rules = rules.clone());
        if rules.is_empty() {
            return Err(ValidationError::NoRules.into());
        }

        let _busy = self.ctx.busy();
        match mode {
            EditorMode::Edit => {
                let body = UpdateClusterRoleRequest {
                    description: form.description,
                    rules,
                };
                self.ctx
                    .api
                    .put::<serde_json::Value, _>(&resource_path("clusterroles", &form.name), &body)
                    .await?;
                info!(name = %form.name, "updated role");
                self.ctx.notifier.success("role updated");
            }
            EditorMode::Create => {
                let body = CreateClusterRoleRequest {
                    name: form.name.clone(),
                    description: form.description,
                    rules,
                };
                self.ctx
                    .api
                    .post::<serde_json::Value, _>("/clusterroles", &body)
                    .await?;
                info!(name = %form.name, "created role");
                self.ctx.notifier.success("role created");
            }
        }
        Ok(())
    }

    /// Delete after confirmation; `Ok(false)` when the user declined
    pub async fn delete(&self, role: &ClusterRole) -> Result<bool> {
        let prompt = format!("Delete role {}? This cannot be undone.", role.name);
        if !self.ctx.confirm.confirm(&prompt) {
            return Ok(false);
        }

        let result = {
            let _busy = self.ctx.busy();
            self.ctx
                .api
                .delete::<serde_json::Value>(&resource_path("clusterroles", &role.name))
                .await
        };
        self.ctx.reported("delete role", result)?;

        info!(name = %role.name, "deleted role");
        self.ctx.notifier.success("role deleted");
        let _ = self.load().await;
        Ok(true)
    }

    pub fn clear(&self) {
        self.roles.set(Vec::new());
        self.editor.set(Editor::default());
        self.viewer.set(RoleViewer::default());
    }
}

/// Parse the rule editor text into policy rules
///
/// The document must be a YAML sequence; anything else is rejected before a
/// request is built.
pub fn parse_rules(yaml: &str) -> std::result::Result<Vec<PolicyRule>, ValidationError> {
    if yaml.trim().is_empty() {
        return Err(ValidationError::RulesNotList);
    }
    let doc: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| ValidationError::InvalidYaml(e.to_string()))?;
    if !doc.is_sequence() {
        return Err(ValidationError::RulesNotList);
    }
    serde_yaml::from_value(doc).map_err(|e| ValidationError::InvalidYaml(e.to_string()))
}

pub fn render_rules(rules: &[PolicyRule]) -> Result<String> {
    Ok(serde_yaml::to_string(rules)?)
}
