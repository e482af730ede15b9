//! Dashboard application state
//!
//! [`Dashboard`] is constructed once at startup and owns the session, the
//! resource controllers and the menu. Operations report their own failures
//! through the configured [`Notifier`] and also return them, so callers only
//! decide what to do next.

use crate::api::ApiClient;
use crate::config::ConfigStore;
use crate::context::Context;
use crate::error::{DashboardError, Result};
use crate::menu::{MenuController, Section};
use crate::namespaces::NamespaceController;
use crate::notify::{Confirm, Notifier};
use crate::roles::RoleController;
use crate::session::SessionManager;
use crate::users::UserController;
use lensadm_common::auth::{CurrentUser, LoginRequest, Session, TokenResponse};
use lensadm_common::forms::LoginForm;
use lensadm_common::LensUser;
use std::sync::Arc;
use tracing::info;

pub struct DashboardOptions {
    /// Backend origin, e.g. `http://localhost:8080`
    pub server: String,
    pub store: ConfigStore,
    pub notifier: Arc<dyn Notifier>,
    pub confirm: Arc<dyn Confirm>,
}

pub struct Dashboard {
    ctx: Context,
    session: Arc<SessionManager>,
    users: UserController,
    roles: RoleController,
    namespaces: NamespaceController,
    menu: MenuController,
    reload_namespaces_on_login: bool,
}

impl Dashboard {
    pub fn new(options: DashboardOptions) -> Result<Self> {
        let config = options.store.get();
        let session = Arc::new(SessionManager::new(
            options.store.clone(),
            Arc::clone(&options.notifier),
        ));
        let api = ApiClient::new(&options.server, Arc::clone(&session))?;
        let ctx = Context::new(api, options.notifier, options.confirm);

        Ok(Self {
            users: UserController::new(ctx.clone(), config.validation),
            roles: RoleController::new(ctx.clone()),
            namespaces: NamespaceController::new(ctx.clone()),
            menu: MenuController::new(options.store),
            reload_namespaces_on_login: config.reload_namespaces_on_login,
            session,
            ctx,
        })
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn users(&self) -> &UserController {
        &self.users
    }

    pub fn roles(&self) -> &RoleController {
        &self.roles
    }

    pub fn namespaces(&self) -> &NamespaceController {
        &self.namespaces
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn username(&self) -> String {
        self.session.username()
    }

    pub fn page_title(&self) -> &'static str {
        self.menu.page_title()
    }

    /// Adopt saved credentials, without contacting the server
    pub fn restore_session(&self) -> bool {
        self.session.restore()
    }

    /// Restore the saved session and load what the active section needs
    ///
    /// Namespaces and the active section's list load concurrently; the other
    /// section loads when it is first selected.
    pub async fn startup(&self) -> bool {
        if !self.restore_session() {
            return false;
        }

        match self.menu.active() {
            Section::Users => {
                let _ = tokio::join!(self.namespaces.load(), self.users.load());
            }
            Section::Roles => {
                let _ = tokio::join!(self.namespaces.load(), self.roles.load());
            }
        }
        true
    }

    /// Log in, then load users, roles and namespaces concurrently
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let form = LoginForm::new(username, password);
        let result = self.authenticate(&form).await;
        let session = self.ctx.reported("login", result)?;

        self.ctx.notifier.success("login successful");
        self.load_after_login().await;
        Ok(session)
    }

    async fn authenticate(&self, form: &LoginForm) -> Result<Session> {
        form.validate()?;

        let _busy = self.ctx.busy();
        let request = LoginRequest {
            username: form.username.clone(),
            password: form.password.clone(),
        };
        let token: TokenResponse = self.ctx.api.post("/login", &request).await?;
        if token.access_token.is_empty() {
            return Err(DashboardError::Auth(
                "login response did not contain a token".to_string(),
            ));
        }

        let session = Session::new(token.access_token, form.username.clone());
        self.session.begin(session.clone())?;
        self.menu.persist();
        info!(username = %form.username, "logged in");
        Ok(session)
    }

    async fn load_after_login(&self) {
        // Each load reports and recovers from its own failure
        let namespaces = async {
            if self.reload_namespaces_on_login || self.namespaces.is_empty() {
                let _ = self.namespaces.load().await;
            }
        };
        let _ = tokio::join!(self.users.load(), self.roles.load(), namespaces);
    }

    /// End the session and reset every list, editor and the menu
    pub fn logout(&self) {
        self.session.end();
        self.users.clear();
        self.roles.clear();
        self.menu.reset();
    }

    /// Switch section and reload its list
    pub async fn select_menu(&self, section: Section) -> Result<()> {
        self.menu.select(section);
        self.load_section(section).await
    }

    pub async fn load_section(&self, section: Section) -> Result<()> {
        match section {
            Section::Users => self.users.load().await,
            Section::Roles => self.roles.load().await,
        }
    }

    /// Open the user editor for a new user, loading its dropdown data
    pub async fn show_create_user_dialog(&self) {
        self.users.open_create();
        self.ensure_user_editor_data().await;
    }

    pub async fn edit_user(&self, user: &LensUser) {
        self.users.open_edit(user);
        self.ensure_user_editor_data().await;
    }

    async fn ensure_user_editor_data(&self) {
        if self.roles.is_empty() {
            let _ = self.roles.load().await;
        }
        let _ = self.namespaces.ensure_loaded().await;
    }

    /// Add an empty role binding to the user editor
    pub fn add_role(&self) {
        let namespaces = self.namespaces.list();
        self.users.add_role(&namespaces);
    }

    pub fn remove_role(&self, index: usize) -> bool {
        self.users.remove_role(index)
    }

    /// `GET /me`
    pub async fn whoami(&self) -> Result<CurrentUser> {
        let result = self.ctx.api.get::<CurrentUser>("/me").await;
        self.ctx.reported("whoami", result)
    }
}
