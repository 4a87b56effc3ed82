//! Azure Key Vault Provider - registry-shaped stub. See `aws.rs` for the rationale.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::sync::Arc;

pub fn register() {
    registry::register("AZURE_KEY_VAULT", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(AzureKeyVaultProvider))
}

pub struct AzureKeyVaultProvider;

#[async_trait]
impl Provider for AzureKeyVaultProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        Err(Error::NotImplemented(format!(
            "{}: AZURE_KEY_VAULT is registered but not linked into this build",
            name
        )))
    }
}
