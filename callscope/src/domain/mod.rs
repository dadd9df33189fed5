//! Domain model for callscope
//!
//! This module contains core domain types and errors that provide:
//! - A tagged value type instead of untyped byte buffers
//! - Self-documenting argument descriptors
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{ArgLocation, ArgumentSpec, DynamicSymbolEntry, Value, ValueFormat, VALUE_CAPACITY};

pub use errors::{InstallError, ResolveError};
