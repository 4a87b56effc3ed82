//! Environment-driven configuration for the secret subsystem.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Selects which [`crate::secret::Provider`] backend the registry constructs.
///
/// `Default` is `IN_MEMORY`, matching the source's own default - a deployment that
/// never sets `SECRET_MANAGER` gets a Provider that works, just not one backed by a
/// real vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendType {
    AwsSecretsManager,
    AzureKeyVault,
    GoogleSecretManager,
    HashicorpVault,
    Filesystem,
    InMemory,
    Noop,
}

impl Default for BackendType {
    fn default() -> Self {
        BackendType::InMemory
    }
}

impl BackendType {
    /// The registry key this variant dispatches on, e.g. `"AWS_SECRETS_MANAGER"`.
    pub fn registry_name(&self) -> &'static str {
        match self {
            BackendType::AwsSecretsManager => "AWS_SECRETS_MANAGER",
            BackendType::AzureKeyVault => "AZURE_KEY_VAULT",
            BackendType::GoogleSecretManager => "GOOGLE_SECRET_MANAGER",
            BackendType::HashicorpVault => "HASHICORP_VAULT",
            BackendType::Filesystem => "FILESYSTEM",
            BackendType::InMemory => "IN_MEMORY",
            BackendType::Noop => "NOOP",
        }
    }
}

impl FromStr for BackendType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AWS_SECRETS_MANAGER" => Ok(BackendType::AwsSecretsManager),
            "AZURE_KEY_VAULT" => Ok(BackendType::AzureKeyVault),
            "GOOGLE_SECRET_MANAGER" => Ok(BackendType::GoogleSecretManager),
            "HASHICORP_VAULT" => Ok(BackendType::HashicorpVault),
            "FILESYSTEM" => Ok(BackendType::Filesystem),
            "IN_MEMORY" => Ok(BackendType::InMemory),
            "NOOP" => Ok(BackendType::Noop),
            other => Err(Error::InvalidConfig(format!(
                "unrecognized SECRET_MANAGER value {:?}",
                other
            ))),
        }
    }
}

/// Recognized configuration for the secret subsystem.
///
/// Binds to the four canonical environment variables in the crate's external
/// interface: `SECRET_MANAGER`, `SECRETS_DIR`, `SECRET_CACHE_TTL`, `SECRET_EXPANSION`.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend_type: BackendType,
    pub secrets_dir: PathBuf,
    pub secret_cache_ttl: Duration,
    pub secret_expansion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_type: BackendType::default(),
            secrets_dir: PathBuf::from("/var/run/secrets"),
            secret_cache_ttl: Duration::from_secs(5 * 60),
            secret_expansion: false,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to the documented
    /// defaults for any variable that is unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(raw) = std::env::var("SECRET_MANAGER") {
            config.backend_type = raw.parse()?;
        }
        if let Ok(raw) = std::env::var("SECRETS_DIR") {
            config.secrets_dir = PathBuf::from(raw);
        }
        if let Ok(raw) = std::env::var("SECRET_CACHE_TTL") {
            config.secret_cache_ttl = humantime::parse_duration(&raw)?;
        }
        if let Ok(raw) = std::env::var("SECRET_EXPANSION") {
            config.secret_expansion = raw
                .parse::<bool>()
                .map_err(|_| Error::InvalidConfig(format!("SECRET_EXPANSION not a bool: {:?}", raw)))?;
        }

        Ok(config)
    }
}
