//! Interprets `secret://` references inside free-form configuration strings.
//!
//! Installed once, over a bound [`Provider`], at configuration-binding time. Given a
//! raw environment-variable value it:
//!
//! 1. Splits on commas (list-typed configuration may mix references and literals).
//! 2. Passes through any fragment that doesn't start with `secret://` unchanged.
//! 3. Fetches the rest via the Provider, optionally materializing it to a locked-down
//!    file when the fragment ends with `?target=file`.
//! 4. Rejoins with commas.

use crate::error::{Error, Result};
use crate::secret::provider::Provider;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const REFERENCE_PREFIX: &str = "secret://";
const FILE_TARGET_SUFFIX: &str = "?target=file";

/// Resolves `secret://` references against a bound [`Provider`], materializing
/// file-targeted references under `secrets_dir`.
pub struct Resolver {
    provider: Option<Arc<dyn Provider>>,
    secrets_dir: PathBuf,
}

impl Resolver {
    /// Build a resolver with no bound provider. Any `secret://` reference it
    /// encounters fails with [`Error::NotConfigured`]; plain literals still resolve.
    pub fn unconfigured(secrets_dir: impl Into<PathBuf>) -> Self {
        Resolver {
            provider: None,
            secrets_dir: secrets_dir.into(),
        }
    }

    /// Build a resolver bound to `provider`.
    pub fn new(provider: Arc<dyn Provider>, secrets_dir: impl Into<PathBuf>) -> Self {
        Resolver {
            provider: Some(provider),
            secrets_dir: secrets_dir.into(),
        }
    }

    /// Resolve every comma-separated fragment of `value`, rejoining with commas.
    ///
    /// `env_name` identifies the configuration variable being resolved; it feeds the
    /// deterministic filename used for file materialization so repeated startups with
    /// the same environment converge on the same path.
    pub async fn resolve(&self, env_name: &str, value: &str) -> Result<String> {
        let mut resolved = Vec::new();
        for fragment in value.split(',') {
            resolved.push(self.resolve_fragment(env_name, fragment).await?);
        }
        Ok(resolved.join(","))
    }

    async fn resolve_fragment(&self, env_name: &str, fragment: &str) -> Result<String> {
        let Some(rest) = fragment.strip_prefix(REFERENCE_PREFIX) else {
            return Ok(fragment.to_string());
        };

        let (secret_name, materialize) = match rest.strip_suffix(FILE_TARGET_SUFFIX) {
            Some(name) => (name, true),
            None => (rest, false),
        };

        let provider = self.provider.as_ref().ok_or_else(|| {
            Error::NotConfigured(format!(
                "{}: secret reference encountered but no provider is bound",
                secret_name
            ))
        })?;

        let value = provider
            .get_secret_value(secret_name)
            .await
            .map_err(|e| Error::ProviderFailure(format!("{}: {}", secret_name, e)))?;

        if materialize {
            self.materialize(env_name, secret_name, &value)
        } else {
            Ok(value)
        }
    }

    fn materialize(&self, env_name: &str, secret_name: &str, value: &str) -> Result<String> {
        ensure_secrets_dir(&self.secrets_dir)?;

        let mut hasher = Sha1::new();
        hasher.update(format!("{}.{}", env_name, secret_name).as_bytes());
        let filename = hex::encode(hasher.finalize());
        let path = self.secrets_dir.join(filename);

        write_private_file(&path, value.as_bytes())?;
        debug!("materialized secret {} to {}", secret_name, path.display());

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(unix)]
fn ensure_secrets_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    match std::fs::metadata(dir) {
        Ok(meta) => {
            let mode = meta.permissions().mode() & 0o777;
            if mode & !0o700 != 0 {
                return Err(Error::FilesystemFailure(format!(
                    "secrets directory {} has mode {:o}, refusing to write secrets into a \
                     directory broader than 0700",
                    dir.display(),
                    mode
                )));
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::DirBuilder::new()
                .mode(0o700)
                .create(dir)
                .map_err(Error::from)
        }
        Err(e) => Err(Error::from(e)),
    }
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn ensure_secrets_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(Error::from)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(Error::from)
}
