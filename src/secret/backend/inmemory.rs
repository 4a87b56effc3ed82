//! In-memory Provider backend: an explicit map of secret name to value.
//!
//! The default backend (`SECRET_MANAGER=IN_MEMORY`). Useful for local development and
//! for every test in this crate that needs a Provider without standing up a real
//! vault. Values are seeded via [`InMemoryProvider::insert`] - there is no
//! `Config`-driven way to populate it, since there is no universal place in
//! configuration to put a whole secret map.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Registers the `IN_MEMORY` backend.
pub fn register() {
    registry::register("IN_MEMORY", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(InMemoryProvider::default()))
}

/// A `Provider` backed by a plain concurrent map, seeded by the embedding process.
#[derive(Default, Clone)]
pub struct InMemoryProvider {
    values: Arc<DashMap<String, String>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a secret value.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

#[async_trait]
impl Provider for InMemoryProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        self.values
            .get(name)
            .map(|v| v.clone())
            .ok_or_else(|| Error::ProviderFailure(format!("{}: not found", name)))
    }
}
