//! AWS Secrets Manager Provider - registry-shaped stub.
//!
//! Wiring an actual `aws-sdk-secretsmanager` client is explicitly out of scope for
//! this crate (see the purpose-and-scope non-goals): this module exists so
//! `SECRET_MANAGER=AWS_SECRETS_MANAGER` resolves to a registered backend instead of a
//! registry lookup failure when the `aws` feature is compiled in, and so the shape a
//! real integration would take - a `Provider` impl constructed from `Config` - is
//! visible in one place. Every call fails loudly rather than pretending to succeed.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::sync::Arc;

pub fn register() {
    registry::register("AWS_SECRETS_MANAGER", construct);
}

fn construct(_config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(AwsSecretsManagerProvider))
}

pub struct AwsSecretsManagerProvider;

#[async_trait]
impl Provider for AwsSecretsManagerProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        Err(Error::NotImplemented(format!(
            "{}: AWS_SECRETS_MANAGER is registered but not linked into this build",
            name
        )))
    }
}
