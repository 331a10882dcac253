//! Configuration for hostbridge contexts and tools.
//!
//! All fields have defaults, so an empty file (or no file) is valid.

pub mod config;
pub mod error;
pub mod loader;

pub use {
    config::{BridgeConfig, HostbridgeConfig, LoggingConfig, RuntimeOptions},
    error::{Error, Result},
    loader::{from_toml_str, load, load_or_default},
};
