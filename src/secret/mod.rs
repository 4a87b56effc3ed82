//! Pluggable secret-resolution layer.
//!
//! Composes, leaves first: a [`registry`] of backend constructors, the [`provider`]
//! contract every backend implements, an [`expander`] decorator for JSON-field
//! addressing, a [`caching`] decorator backed by [`crate::cache::Cache`], and a
//! [`resolver`] that interprets `secret://` references inside configuration strings.
//!
//! # Example
//!
//! ```
//! use key_server_secrets::secret::{backend, config::Config, registry, resolver::Resolver};
//!
//! #[tokio::main]
//! async fn main() {
//!     backend::register_all();
//!     let config = Config::default();
//!     let provider = registry::for_config(&config).unwrap();
//!     let resolver = Resolver::new(provider, &config.secrets_dir);
//!     let value = resolver.resolve("MY_VAR", "a literal value").await.unwrap();
//!     assert_eq!(value, "a literal value");
//! }
//! ```

pub mod backend;
pub mod caching;
pub mod config;
pub mod expander;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use caching::CachingProvider;
pub use config::Config;
pub use expander::JsonExpandingProvider;
pub use provider::Provider;
pub use resolver::Resolver;
