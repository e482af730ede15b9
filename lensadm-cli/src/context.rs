//! Collaborators shared by every controller

use crate::api::ApiClient;
use crate::error::DashboardError;
use crate::notify::{Confirm, Notifier};
use crate::observable::Observable;
use lensadm_common::forms::ValidationError;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Context {
    pub api: ApiClient,
    pub notifier: Arc<dyn Notifier>,
    pub confirm: Arc<dyn Confirm>,
    /// Number of requests in flight; the UI shows a busy state while > 0
    pub loading: Observable<usize>,
}

impl Context {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            api,
            notifier,
            confirm,
            loading: Observable::new(0),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.with(|n| *n > 0)
    }

    /// Mark a request in flight until the guard is dropped
    pub fn busy(&self) -> LoadingGuard {
        self.loading.update(|n| *n += 1);
        LoadingGuard {
            loading: self.loading.clone(),
        }
    }

    /// Surface an operation failure as a notification
    pub fn report(&self, operation: &str, err: &DashboardError) {
        debug!(operation, error = %err, "operation failed");
        match err {
            DashboardError::Validation(ValidationError::InvalidYaml(_)) => {
                self.notifier.error(&err.to_string())
            }
            DashboardError::Validation(_) => self.notifier.warning(&err.to_string()),
            _ => self.notifier.error(&err.to_string()),
        }
    }

    /// Report the error of `result`, if any, and pass it through
    pub fn reported<T>(
        &self,
        operation: &str,
        result: Result<T, DashboardError>,
    ) -> Result<T, DashboardError> {
        if let Err(err) = &result {
            self.report(operation, err);
        }
        result
    }
}

pub struct LoadingGuard {
    loading: Observable<usize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.loading.update(|n| *n = n.saturating_sub(1));
    }
}
