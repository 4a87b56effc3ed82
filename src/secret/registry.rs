//! Process-wide registry mapping backend names to Provider constructors.

use crate::error::{Error, Result};
use crate::secret::config::Config;
use crate::secret::provider::Provider;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Constructs a [`Provider`] from a bound [`Config`].
pub type Constructor = fn(&Config) -> Result<Arc<dyn Provider>>;

fn registry() -> &'static RwLock<BTreeMap<&'static str, Constructor>> {
    static REGISTRY: OnceLock<RwLock<BTreeMap<&'static str, Constructor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(BTreeMap::new()))
}

/// Register `constructor` under `name`.
///
/// # Panics
/// Panics if `name` is already registered - a duplicate registration is a fatal
/// programming error, not a recoverable condition, per the source's own contract.
pub fn register(name: &'static str, constructor: Constructor) {
    let mut guard = registry().write().unwrap();
    if guard.contains_key(name) {
        panic!("secret provider backend {:?} registered twice", name);
    }
    debug!("registered secret provider backend {}", name);
    guard.insert(name, constructor);
}

/// The sorted list of currently registered backend names.
pub fn registered() -> Vec<&'static str> {
    registry().read().unwrap().keys().copied().collect()
}

/// Construct the [`Provider`] bound to `config.backend_type`.
///
/// Fails with [`Error::InvalidConfig`] when the name isn't registered - typically
/// because this build didn't compile in that backend's Cargo feature.
pub fn for_config(config: &Config) -> Result<Arc<dyn Provider>> {
    let name = config.backend_type.registry_name();
    let guard = registry().read().unwrap();
    match guard.get(name) {
        Some(constructor) => constructor(config),
        None => Err(Error::InvalidConfig(format!(
            "secret backend {:?} is not registered in this build - was its Cargo feature compiled in?",
            name
        ))),
    }
}
