//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod file;
mod lock;
mod memory;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
