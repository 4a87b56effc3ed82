//! Filesystem Provider backend: reads a secret's value from `<secrets_dir>/<name>`.
//!
//! Intended for deployments that mount secrets as files (a Kubernetes `Secret` volume,
//! a Docker secret, a local dev `.secrets/` directory) rather than calling out to a
//! managed vault. `name` is taken verbatim as a filename relative to
//! `config.secrets_dir` - no path traversal protection is applied beyond what
//! `std::path::Path::join` already gives a single path component; a `name` containing
//! `/` is the caller's own malformed reference to account for.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use crate::secret::registry;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub fn register() {
    registry::register("FILESYSTEM", construct);
}

fn construct(config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(FilesystemProvider {
        root: config.secrets_dir.clone(),
    }))
}

/// A `Provider` that reads secret bytes from files under a configured root directory.
pub struct FilesystemProvider {
    root: PathBuf,
}

impl FilesystemProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemProvider { root: root.into() }
    }
}

#[async_trait]
impl Provider for FilesystemProvider {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            Error::ProviderFailure(format!("{}: {}", name, e))
        })?;
        String::from_utf8(bytes)
            .map(|s| s.trim_end_matches('\n').to_string())
            .map_err(|e| Error::ProviderFailure(format!("{}: not valid utf-8: {}", name, e)))
    }
}
