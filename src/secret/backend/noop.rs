//! No-op Provider backend: every lookup fails with `NotConfigured`.
//!
//! Useful for deployments that want to assert, at startup, that no `secret://`
//! reference is ever resolved - e.g. a CI environment that should fail loudly instead
//! of silently falling back to `IN_MEMORY` if configuration wiring regresses.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::sync::Arc;

pub fn register() {
    registry::register("NOOP", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(NoopProvider))
}

pub struct NoopProvider;

#[async_trait]
impl Provider for NoopProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        Err(Error::NotConfigured(format!(
            "{}: the NOOP secret backend never resolves a secret",
            name
        )))
    }
}
