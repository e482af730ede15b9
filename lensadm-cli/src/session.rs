//! Session state and credential persistence

use crate::config::ConfigStore;
use crate::error::Result;
use crate::notify::Notifier;
use crate::observable::Observable;
use lensadm_common::auth::Session;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the current session and mirrors it into the configuration file
pub struct SessionManager {
    session: Observable<Session>,
    store: ConfigStore,
    notifier: Arc<dyn Notifier>,
}

impl SessionManager {
    pub fn new(store: ConfigStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: Observable::default(),
            store,
            notifier,
        }
    }

    pub fn session(&self) -> Observable<Session> {
        self.session.clone()
    }

    pub fn current(&self) -> Session {
        self.session.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.with(Session::is_logged_in)
    }

    pub fn token(&self) -> Option<String> {
        self.session
            .with(|s| (!s.token.is_empty()).then(|| s.token.clone()))
    }

    pub fn username(&self) -> String {
        self.session.with(|s| s.username.clone())
    }

    /// Adopt persisted credentials without asking the server
    ///
    /// Returns whether a session was restored. A stale token surfaces later
    /// as a 401 on the first request.
    pub fn restore(&self) -> bool {
        let saved = self.store.with(|c| match (&c.token, &c.username) {
            (Some(token), Some(username)) => Some(Session::new(token, username)),
            _ => None,
        });

        match saved {
            Some(session) if session.is_logged_in() => {
                info!(username = %session.username, "restored saved session");
                self.session.set(session);
                true
            }
            _ => false,
        }
    }

    /// Record a fresh login and persist it
    pub fn begin(&self, session: Session) -> Result<()> {
        self.store.update(|c| {
            c.token = Some(session.token.clone());
            c.username = Some(session.username.clone());
        })?;
        info!(username = %session.username, "session started");
        self.session.set(session);
        Ok(())
    }

    /// Clear the session, its persisted credentials and the saved menu
    ///
    /// Only the call that actually ends an active session returns true and
    /// emits the logged-out notice.
    pub fn end(&self) -> bool {
        let ended = self.session.modify_if(|s| {
            if s.is_logged_in() {
                *s = Session::default();
                true
            } else {
                false
            }
        });

        if ended {
            let persisted = self.store.update(|c| {
                c.token = None;
                c.username = None;
                c.active_menu = None;
            });
            if let Err(e) = persisted {
                warn!(error = %e, "failed to clear saved credentials");
            }
            info!("session ended");
            self.notifier.success("logged out");
        }

        ended
    }
}
