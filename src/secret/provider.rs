//! The abstract "fetch a named secret value" capability every backend implements.

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Stateless capability: fetch a secret's current value by name.
///
/// Methods take `&self` so implementations can be held behind `Arc<dyn Provider>` and
/// shared across the process for its whole lifetime. The backend-specific
/// interpretation of `name` (an ARN, a resource path, a vault key with a version query
/// parameter) is opaque to every caller of this trait - only the concrete backend
/// module knows how to read it.
///
/// `create_secret_version` / `destroy_secret_version` are optional extensions:
/// backends that don't support version management simply inherit the default body,
/// which returns [`Error::NotImplemented`]. That is a capability narrowing a caller can
/// detect by inspecting the error variant, not a programming error.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Fetch the current value of the secret named `name`.
    ///
    /// # Errors
    /// - Backend-reported "not found": terminal, the caller should not retry as-is.
    /// - Transport/auth failure: transient; a higher layer may wrap it
    ///   [`Error::retryable`] and drive it through [`crate::backoff::retry`].
    /// - Malformed `name`: a terminal programming error.
    async fn get_secret_value(&self, name: &str) -> Result<String>;

    /// Create a new version of the secret at `parent`, returning a backend-specific
    /// reference to the created version.
    async fn create_secret_version(&self, _parent: &str, _payload: &[u8]) -> Result<String> {
        Err(Error::NotImplemented(
            "create_secret_version is not supported by this provider".to_string(),
        ))
    }

    /// Destroy a secret version. Idempotent: destroying an already-absent version is
    /// not an error.
    async fn destroy_secret_version(&self, _reference: &str) -> Result<()> {
        Err(Error::NotImplemented(
            "destroy_secret_version is not supported by this provider".to_string(),
        ))
    }
}
