//! # key-server-secrets
//!
//! The trust- and configuration-plane primitives shared by every service in an
//! exposure-notification key server: a generic write-through [`cache::Cache`] with
//! coalesced single-flight loading, and a pluggable [`secret`] resolution layer built
//! on top of it.
//!
//! ## Quick Start
//!
//! ```
//! use key_server_secrets::cache::Cache;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), key_server_secrets::Error> {
//!     let cache: std::sync::Arc<Cache<String>> = Cache::new(Duration::from_secs(300));
//!
//!     let value = cache
//!         .write_thru_lookup("api-config:abc123", || async {
//!             Ok("loaded from the authoritative source".to_string())
//!         })
//!         .await?;
//!     assert_eq!(value, "loaded from the authoritative source");
//!     Ok(())
//! }
//! ```
//!
//! Secret references are resolved the same way every service binds its environment:
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
//!     assert_eq!(resolver.resolve("X", "literal,other").await.unwrap(), "literal,other");
//! }
//! ```

#[macro_use]
extern crate log;

pub mod backoff;
pub mod cache;
pub mod error;
pub mod secret;

pub use backoff::{Backoff, Exponential, Fibonacci};
pub use cache::Cache;
pub use error::{Error, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
