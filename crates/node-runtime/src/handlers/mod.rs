//! # Command Handlers
//!
//! Newline-delimited JSON front end for the document registry.

pub mod commands;

pub use commands::{handle_line, serve, Command, ErrorBody, Response};
