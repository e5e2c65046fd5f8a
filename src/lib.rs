//! # Glaive
//!
//! Indexed query evaluation over in-memory document trees.
//!
//! ## Features
//!
//! - Hash-addressed postings store with live rehashing
//! - Value indexes over text contents and attribute values
//! - Full-text index with case, diacritics, stemming and wildcard options
//! - Pull-based, mergeable node id iterators
//! - Rewrite pass that simplifies expressions and substitutes index access
//!   for document scans whenever an index can answer a query exactly

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod fulltext;
pub mod index;
pub mod query;

pub mod prelude {
    pub use crate::config::{EngineConfig, IndexConfig, OptimizerConfig};
    pub use crate::data::{Data, DataBuilder};
    pub use crate::error::{GlaiveError, Result};
    pub use crate::fulltext::{FtCase, FtExpr, FtIndexOptions, FtOptions, PositionFilter, WordsMode};
    pub use crate::index::{IndexIterator, NodeId, ValueKind};
    pub use crate::query::{CmpOp, Expr, Function, Item, QueryProcessor, Value};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
