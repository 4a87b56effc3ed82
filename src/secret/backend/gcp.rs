//! Google Secret Manager Provider - registry-shaped stub. See `aws.rs` for the rationale.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::sync::Arc;

pub fn register() {
    registry::register("GOOGLE_SECRET_MANAGER", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(GoogleSecretManagerProvider))
}

pub struct GoogleSecretManagerProvider;

#[async_trait]
impl Provider for GoogleSecretManagerProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        Err(Error::NotImplemented(format!(
            "{}: GOOGLE_SECRET_MANAGER is registered but not linked into this build",
            name
        )))
    }
}
