//! # Node Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is `main.rs`.
//!
//! - `container/` - Configuration and registry construction
//! - `adapters/` - Storage backend selection
//! - `handlers/` - JSON command protocol

pub mod adapters;
pub mod container;
pub mod handlers;

pub use container::{ConfigError, NodeConfig, RegistryContainer, StorageBackend};
pub use handlers::{handle_line, serve, Command, Response};
