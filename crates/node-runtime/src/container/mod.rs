//! # Registry Container
//!
//! Holds the configured document registry service.

pub mod config;
pub mod registry;

pub use config::{ConfigError, LoggingConfig, NodeConfig, StorageBackend, StorageConfig};
pub use registry::{NodeRegistry, RegistryContainer};
