//! Parsing and validation of `weave.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`], and resolves per-provider overrides against the
//! provider's built-in defaults.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_providers, ProviderDefaults, ResolvedProvider};
pub use types::*;
