//! # Adapter Implementations
//!
//! Concrete outbound adapters chosen by the runtime. The registry crate
//! ships the in-memory and single-file stores; this layer adds backend
//! selection and the optional RocksDB store.

pub mod storage;

pub use storage::NodeStore;
