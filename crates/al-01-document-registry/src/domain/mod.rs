//! # Domain Layer
//!
//! Pure domain logic for the Document Registry subsystem.
//! No I/O happens here; all storage access goes through `ports`.
//!
//! ## Modules
//!
//! - `entities` - Document record and lifecycle status
//! - `value_objects` - Registration request
//! - `codec` - Document <-> ledger bytes
//! - `keys` - Composite keys for secondary indexes
//! - `timestamp` - Transaction timestamp normalization
//! - `errors` - Domain error types

pub mod codec;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod timestamp;
pub mod value_objects;
