//! Parsing and validation of `gapl.toml` compiler configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`CompilerConfig`] holding the compiler options and the propagation delay model
//! used by the retiming pass.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
