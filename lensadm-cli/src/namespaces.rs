//! Read-only namespace cache

use crate::context::Context;
use crate::error::Result;
use crate::observable::Observable;
use lensadm_common::Envelope;
use tracing::debug;

pub struct NamespaceController {
    ctx: Context,
    namespaces: Observable<Vec<String>>,
}

impl NamespaceController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            namespaces: Observable::default(),
        }
    }

    pub fn namespaces(&self) -> Observable<Vec<String>> {
        self.namespaces.clone()
    }

    pub fn list(&self) -> Vec<String> {
        self.namespaces.get()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.with(Vec::is_empty)
    }

    /// `GET /namespaces`; on failure the previous cache is kept
    pub async fn load(&self) -> Result<()> {
        let result = self
            .ctx
            .api
            .get::<Envelope<Vec<String>>>("/namespaces")
            .await;

        let envelope = self.ctx.reported("load namespaces", result)?;
        let namespaces = envelope.into_data();
        debug!(count = namespaces.len(), "loaded namespaces");
        self.namespaces.set(namespaces);
        Ok(())
    }

    /// Load only when nothing is cached yet
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.is_empty() {
            self.load().await?;
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.namespaces.set(Vec::new());
    }
}
