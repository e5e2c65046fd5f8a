//! Configuration for index construction and query optimization.
//!
//! Every structure has sensible defaults and can be loaded from JSON.
//!
//! # Examples
//!
//! ```
//! use glaive::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert!(config.index.text_index);
//! assert!(config.optimizer.fixed_point);
//!
//! let config = EngineConfig::from_json(r#"{"optimizer": {"fixed_point": false}}"#).unwrap();
//! assert!(!config.optimizer.fixed_point);
//! assert_eq!(config.optimizer.max_passes, 8);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GlaiveError, Result};
use crate::fulltext::options::FtIndexOptions;
use crate::index::id_set::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which indexes are built, and how.
    pub index: IndexConfig,
    /// How compiled queries are rewritten.
    pub optimizer: OptimizerConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.index.validate()?;
        self.optimizer.validate()
    }
}

/// Index construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Build the text value index.
    pub text_index: bool,
    /// Build the attribute value index.
    pub attribute_index: bool,
    /// Build the full-text index with these options.
    pub fulltext: Option<FtIndexOptions>,
    /// Initial number of hash buckets, rounded up to a power of two.
    pub initial_capacity: usize,
    /// Ratio of keys to buckets that triggers a rehash, in (0, 1).
    pub max_load_factor: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            text_index: true,
            attribute_index: true,
            fulltext: Some(FtIndexOptions::default()),
            initial_capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl IndexConfig {
    /// Configuration without any index.
    pub fn none() -> Self {
        IndexConfig {
            text_index: false,
            attribute_index: false,
            fulltext: None,
            ..IndexConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(GlaiveError::config(format!(
                "max_load_factor must be in (0, 1), got {}",
                self.max_load_factor
            )));
        }
        if self.initial_capacity == 0 {
            return Err(GlaiveError::config("initial_capacity must be positive"));
        }
        if let Some(fulltext) = &self.fulltext {
            if fulltext.language.trim().is_empty() {
                return Err(GlaiveError::config("full-text language must not be empty"));
            }
        }
        Ok(())
    }
}

/// Rewrite pass settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Substitute index accesses where the database allows it.
    pub index_rewrites: bool,
    /// Repeat the simplification pass until no rule fires. A single pass is
    /// run otherwise.
    pub fixed_point: bool,
    /// Upper bound on the number of passes in fixed-point mode.
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            index_rewrites: true,
            fixed_point: true,
            max_passes: 8,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(GlaiveError::config("max_passes must be at least 1"));
        }
        Ok(())
    }

    /// Number of passes the optimizer may run.
    pub fn passes(&self) -> usize {
        if self.fixed_point { self.max_passes } else { 1 }
    }
}
