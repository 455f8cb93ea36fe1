//! # Node Configuration
//!
//! Runtime parameters for the registry host.
//!
//! ## Environment overrides
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `AL_STORAGE_BACKEND` | `memory`, `file` or `rocksdb` |
//! | `AL_DATA_DIR` | directory holding the ledger file / database |
//! | `AL_LOG` | tracing filter directive (falls back to `RUST_LOG`) |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// File name of the single-file ledger under `data_dir`.
pub const LEDGER_FILE_NAME: &str = "ledger.db";

/// Directory name of the RocksDB ledger under `data_dir`.
pub const ROCKSDB_DIR_NAME: &str = "ledger-rocksdb";

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults. The result is validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(backend) = lookup("AL_STORAGE_BACKEND") {
            config.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("AL_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup("AL_LOG").or_else(|| lookup("RUST_LOG")) {
            config.logging.filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be served by this build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend.is_persistent() && self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingDataDir {
                backend: self.storage.backend,
            });
        }
        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendUnavailable {
                backend: self.storage.backend,
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `AL_STORAGE_BACKEND` names no known backend.
    #[error("unknown storage backend '{value}' (expected memory, file or rocksdb)")]
    UnknownBackend { value: String },

    /// A persistent backend was selected without a data directory.
    #[error("storage backend '{backend}' requires AL_DATA_DIR")]
    MissingDataDir { backend: StorageBackend },

    /// The backend exists but was not compiled in.
    #[error("storage backend '{backend}' is not compiled in (rebuild with --features {backend})")]
    BackendUnavailable { backend: StorageBackend },

    /// Log filter is blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}

/// Which key-value store backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local map, discarded on exit.
    #[default]
    Memory,
    /// Single file rewritten atomically on each commit.
    File,
    /// RocksDB database (feature `rocksdb`).
    RocksDb,
}

impl StorageBackend {
    /// Name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::RocksDb => "rocksdb",
        }
    }

    /// Whether data outlives the process.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, StorageBackend::Memory)
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Data directory for persistent backends.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the single-file ledger.
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE_NAME)
    }

    /// Path of the RocksDB ledger directory.
    pub fn rocksdb_dir(&self) -> PathBuf {
        self.data_dir.join(ROCKSDB_DIR_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `al_01_document_registry=debug`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
