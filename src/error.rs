//! Error types for the Glaive engine.
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! [`GlaiveError`] enum. Soft misses (absent keys, empty matches) are never
//! errors: they surface as `None` or as an empty iterator. Index
//! incompatibility is reported as `false` by the compatibility checks and
//! makes the optimizer keep the scan plan.
//!
//! # Examples
//!
//! ```
//! use glaive::error::{GlaiveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(GlaiveError::query("unbound variable $x"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Glaive operations.
#[derive(Error, Debug)]
pub enum GlaiveError {
    /// I/O errors (reading documents or configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index misuse visible to the caller
    #[error("Index error: {0}")]
    Index(String),

    /// Query errors (unbound variables, type errors, bad pictures or patterns)
    #[error("Query error: {0}")]
    Query(String),

    /// Analysis-related errors (tokenization, normalization)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken structural invariant inside an index. Not recoverable.
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with GlaiveError.
pub type Result<T> = std::result::Result<T, GlaiveError>;

impl GlaiveError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Query(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Config(msg.into())
    }

    /// Create a new internal-consistency error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Internal(msg.into())
    }

    /// Whether this error reports a broken internal invariant rather than a
    /// problem with the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, GlaiveError::Internal(_))
    }
}
