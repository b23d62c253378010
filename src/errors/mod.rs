//! # Error Handling
//!
//! Error types for the gateway adapter. Every failed adapter call surfaces
//! exactly one [`GatewayError`] kind; raw transport errors never escape.

pub mod types;

pub use types::{ErrorKind, GatewayError, Result};
