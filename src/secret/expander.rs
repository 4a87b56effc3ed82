//! Decorator over a [`Provider`] that expands a dotted key into a JSON field walk.
//!
//! A secret stored as a JSON blob (e.g. a database credential bundle `{"user": ...,
//! "pass": ...}`) can be addressed field-by-field: `GetSecretValue("creds.pass")`
//! fetches the `creds` secret from the inner provider, parses it as JSON, and returns
//! the string at `.pass`.

use crate::error::{Error, Result};
use crate::secret::provider::Provider;
use async_trait::async_trait;
use serde_json::Value;

/// Wraps `inner`, splitting the first dot out of every fetched key as a JSON path.
pub struct JsonExpandingProvider<P> {
    inner: P,
}

impl<P: Provider> JsonExpandingProvider<P> {
    pub fn new(inner: P) -> Self {
        JsonExpandingProvider { inner }
    }
}

#[async_trait]
impl<P: Provider> Provider for JsonExpandingProvider<P> {
    async fn get_secret_value(&self, name: &str) -> Result<String> {
        let mut parts = name.splitn(2, '.');
        let base = parts.next().unwrap_or(name);
        let path = parts.next();

        let raw = self.inner.get_secret_value(base).await?;

        match path {
            None => Ok(raw),
            Some(path) => {
                let value: Value = serde_json::from_str(&raw)?;
                walk(&value, path)
            }
        }
    }

    async fn create_secret_version(&self, parent: &str, payload: &[u8]) -> Result<String> {
        self.inner.create_secret_version(parent, payload).await
    }

    async fn destroy_secret_version(&self, reference: &str) -> Result<()> {
        self.inner.destroy_secret_version(reference).await
    }
}

/// Walk a dot-separated `path` through a JSON object, terminating on a string leaf.
///
/// An explicit error is returned when the final segment names a non-string value
/// (e.g. a nested object or a number) - the source implementation's own design notes
/// flag its equivalent "return an empty string" behavior as a bug, not a feature to
/// reproduce.
fn walk(value: &Value, path: &str) -> Result<String> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = value;

    for (i, segment) in segments.iter().enumerate() {
        let object = current
            .as_object()
            .ok_or_else(|| Error::MalformedReference("not a string or nested field".to_string()))?;
        let next = object
            .get(*segment)
            .ok_or_else(|| Error::MalformedReference(format!("missing key {:?}", segment)))?;

        if i == segments.len() - 1 {
            return next
                .as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| Error::MalformedReference("not a string or nested field".to_string()));
        }
        current = next;
    }

    unreachable!("path always has at least one segment")
}
