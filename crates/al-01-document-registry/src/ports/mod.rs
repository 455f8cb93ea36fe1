//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (API offered to submitters)
//! - `outbound.rs` - Driven ports (store, transaction context, time)

pub mod inbound;
pub mod outbound;
