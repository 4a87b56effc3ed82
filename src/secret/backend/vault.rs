//! HashiCorp Vault Provider - registry-shaped stub. See `aws.rs` for the rationale.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::sync::Arc;

pub fn register() {
    registry::register("HASHICORP_VAULT", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(HashicorpVaultProvider))
}

pub struct HashicorpVaultProvider;

#[async_trait]
impl Provider for HashicorpVaultProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        Err(Error::NotImplemented(format!(
            "{}: HASHICORP_VAULT is registered but not linked into this build",
            name
        )))
    }
}
