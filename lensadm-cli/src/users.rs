//! Lens user management

use crate::api::namespaced_path;
use crate::context::Context;
use crate::editor::{Editor, EditorMode};
use crate::error::{DashboardError, Result};
use crate::observable::Observable;
use lensadm_common::forms::{UserForm, ValidationError, ValidationMode};
use lensadm_common::{CreateLensUserRequest, Envelope, LensUser, RoleRef, UpdateLensUserRequest};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when the kubeconfig names neither a context nor a user
pub const DEFAULT_KUBECONFIG_FILE: &str = "kubeconfig.yaml";

/// Kubeconfig preview dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KubeconfigPreview {
    pub visible: bool,
    /// YAML text shown to the user and written on download
    pub content: String,
    pub user: Option<LensUser>,
}

pub struct UserController {
    ctx: Context,
    validation: ValidationMode,
    users: Observable<Vec<LensUser>>,
    editor: Observable<Editor<UserForm>>,
    preview: Observable<KubeconfigPreview>,
}

impl UserController {
    pub fn new(ctx: Context, validation: ValidationMode) -> Self {
        Self {
            ctx,
            validation,
            users: Observable::default(),
            editor: Observable::default(),
            preview: Observable::default(),
        }
    }

    pub fn users(&self) -> Observable<Vec<LensUser>> {
        self.users.clone()
    }

    pub fn editor(&self) -> Observable<Editor<UserForm>> {
        self.editor.clone()
    }

    pub fn preview(&self) -> Observable<KubeconfigPreview> {
        self.preview.clone()
    }

    pub fn list(&self) -> Vec<LensUser> {
        self.users.get()
    }

    /// Cached user with this name and namespace
    pub fn find(&self, name: &str, namespace: &str) -> Option<LensUser> {
        self.users.with(|users| {
            users
                .iter()
                .find(|u| u.name() == name && u.namespace() == namespace)
                .cloned()
        })
    }

    pub async fn load(&self) -> Result<()> {
        self.load_in(None).await
    }

    /// `GET /lensusers`; any failure empties the list
    pub async fn load_in(&self, namespace: Option<&str>) -> Result<()> {
        let _busy = self.ctx.busy();
        let path = match namespace {
            Some(ns) => format!("/lensusers?namespace={}", urlencoding::encode(ns)),
            None => "/lensusers".to_string(),
        };

        match self.ctx.api.get::<Envelope<Vec<LensUser>>>(&path).await {
            Ok(envelope) => {
                self.users.set(envelope.into_data());
                Ok(())
            }
            Err(err) => {
                self.ctx.report("load users", &err);
                self.users.set(Vec::new());
                Err(err)
            }
        }
    }

    pub async fn fetch(&self, name: &str, namespace: &str) -> Result<LensUser> {
        let result: Result<LensUser> = async {
            let path = namespaced_path("lensusers", name, "", namespace);
            let envelope: Envelope<LensUser> = self.ctx.api.get(&path).await?;
            envelope.data.ok_or_else(|| DashboardError::Request {
                status: 404,
                message: format!("user {} not found", name),
            })
        }
        .await;
        self.ctx.reported("fetch user", result)
    }

    pub fn open_create(&self) {
        self.editor
            .set(Editor::open(EditorMode::Create, UserForm::for_create()));
    }

    pub fn open_edit(&self, user: &LensUser) {
        self.editor
            .set(Editor::open(EditorMode::Edit, UserForm::from_user(user)));
    }

    pub fn close_editor(&self) {
        self.editor.set(Editor::default());
    }

    pub fn form(&self) -> UserForm {
        self.editor.with(|e| e.form.clone())
    }

    pub fn edit_form(&self, f: impl FnOnce(&mut UserForm)) {
        self.editor.update(|e| f(&mut e.form));
    }

    /// Append an empty binding in the form's namespace, else the first known one
    pub fn add_role(&self, namespaces: &[String]) {
        self.editor.update(|e| {
            let namespace = if e.form.namespace.is_empty() {
                namespaces.first().cloned().unwrap_or_default()
            } else {
                e.form.namespace.clone()
            };
            e.form.roles.push(RoleRef::new("", namespace));
        });
    }

    pub fn remove_role(&self, index: usize) -> bool {
        self.editor.modify_if(|e| {
            if index < e.form.roles.len() {
                e.form.roles.remove(index);
                true
            } else {
                false
            }
        })
    }

    /// Validate the editor buffer, then create or update the user
    pub async fn save(&self) -> Result<()> {
        let result = self.submit().await;
        self.ctx.reported("save user", result)?;
        self.close_editor();
        let _ = self.load().await;
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let (mode, form) = self.editor.with(|e| (e.mode, e.form.clone()));
        form.validate(self.validation)?;

        let _busy = self.ctx.busy();
        match mode {
            EditorMode::Edit => {
                let path = namespaced_path("lensusers", &form.name, "", &form.namespace);
                let body = UpdateLensUserRequest { roles: form.roles };
                self.ctx.api.put::<serde_json::Value, _>(&path, &body).await?;
                info!(name = %form.name, namespace = %form.namespace, "updated user");
                self.ctx.notifier.success("user updated");
            }
            EditorMode::Create => {
                let body = CreateLensUserRequest {
                    name: form.name.clone(),
                    namespace: form.namespace.clone(),
                    roles: form.roles,
                };
                self.ctx
                    .api
                    .post::<serde_json::Value, _>("/lensusers", &body)
                    .await?;
                info!(name = %form.name, namespace = %form.namespace, "created user");
                self.ctx.notifier.success("user created");
            }
        }
        Ok(())
    }

    /// Delete after confirmation; `Ok(false)` when the user declined
    pub async fn delete(&self, user: &LensUser) -> Result<bool> {
        let prompt = format!("Delete user {}? This cannot be undone.", user.name());
        if !self.ctx.confirm.confirm(&prompt) {
            return Ok(false);
        }

        let result = {
            let _busy = self.ctx.busy();
            let path = namespaced_path("lensusers", user.name(), "", user.namespace());
            self.ctx.api.delete::<serde_json::Value>(&path).await
        };
        self.ctx.reported("delete user", result)?;

        info!(name = %user.name(), namespace = %user.namespace(), "deleted user");
        self.ctx.notifier.success("user deleted");
        self.users.update(|users| users.retain(|u| !u.same_identity(user)));
        let _ = self.load().await;
        Ok(true)
    }

    /// Fetch the user's kubeconfig and open it in the preview as YAML
    pub async fn preview_kubeconfig(&self, user: &LensUser) -> Result<String> {
        let result: Result<String> = async {
            let path = namespaced_path("lensusers", user.name(), "/kubeconfig", user.namespace());
            let envelope: Envelope<serde_json::Value> = self.ctx.api.get(&path).await?;
            // No kubeconfig in the response leaves nothing to download
            match envelope.data {
                None | Some(serde_json::Value::Null) => Ok(String::new()),
                Some(config) => Ok(serde_yaml::to_string(&config)?),
            }
        }
        .await;
        let content = self.ctx.reported("fetch kubeconfig", result)?;

        self.preview.set(KubeconfigPreview {
            visible: true,
            content: content.clone(),
            user: Some(user.clone()),
        });
        Ok(content)
    }

    pub fn close_preview(&self) {
        self.preview.update(|p| p.visible = false);
    }

    /// Write the previewed kubeconfig into `dir`
    pub fn download_kubeconfig(&self, dir: &Path) -> Result<PathBuf> {
        let preview = self.preview.get();
        let result: Result<PathBuf> = (|| {
            if preview.content.is_empty() {
                return Err(ValidationError::EmptyKubeconfig.into());
            }
            let user_name = preview.user.as_ref().map(LensUser::name);
            let path = dir.join(kubeconfig_filename(&preview.content, user_name));
            std::fs::write(&path, preview.content.as_bytes())?;
            Ok(path)
        })();
        let path = self.ctx.reported("download kubeconfig", result)?;

        info!(path = %path.display(), "saved kubeconfig");
        self.ctx
            .notifier
            .success(&format!("kubeconfig saved as {}", path.display()));
        Ok(path)
    }

    pub fn clear(&self) {
        self.users.set(Vec::new());
        self.editor.set(Editor::default());
        self.preview.set(KubeconfigPreview::default());
    }
}

/// `<current-context>.yaml`, else `<user>.yaml`, else `kubeconfig.yaml`
pub fn kubeconfig_filename(content: &str, user_name: Option<&str>) -> String {
    let context = serde_yaml::from_str::<serde_yaml::Value>(content)
        .ok()
        .and_then(|doc| {
            doc.get("current-context")
                .and_then(serde_yaml::Value::as_str)
                .map(str::to_string)
        })
        .filter(|c| !c.trim().is_empty());

    match context.as_deref().or(user_name.filter(|n| !n.is_empty())) {
        Some(stem) => format!("{}.yaml", sanitize_file_stem(stem)),
        None => DEFAULT_KUBECONFIG_FILE.to_string(),
    }
}

fn sanitize_file_stem(stem: &str) -> String {
    stem.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
