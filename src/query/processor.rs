//! Compile-then-evaluate pipeline for a single query.
//!
//! # Examples
//!
//! ```
//! use glaive::config::{EngineConfig, IndexConfig};
//! use glaive::data::DataBuilder;
//! use glaive::query::expr::Expr;
//! use glaive::query::processor::QueryProcessor;
//! use glaive::query::value::Value;
//!
//! let data = DataBuilder::new(IndexConfig::default()).finish().unwrap();
//! let mut query = QueryProcessor::new(Expr::not(Expr::exists(Expr::var("seq"))), EngineConfig::default());
//! assert_eq!(query.compile(&data).unwrap(), "empty($seq)");
//!
//! query.bind("seq", Value::empty());
//! assert_eq!(query.value(&data).unwrap(), Value::bool(true));
//! ```

use ahash::AHashMap;
use log::debug;

use crate::config::EngineConfig;
use crate::data::Data;
use crate::error::{GlaiveError, Result};
use crate::index::iterator::{IndexIterator, ListIterator};
use crate::query::expr::{Context, Expr};
use crate::query::format::FormatCache;
use crate::query::optimizer::Optimizer;
use crate::query::value::Value;

/// A query together with its variable bindings and picture cache.
#[derive(Debug)]
pub struct QueryProcessor {
    expr: Expr,
    config: EngineConfig,
    vars: AHashMap<String, Value>,
    formats: FormatCache,
    compiled: bool,
}

impl QueryProcessor {
    pub fn new(expr: Expr, config: EngineConfig) -> Self {
        QueryProcessor {
            expr,
            config,
            vars: AHashMap::new(),
            formats: FormatCache::new(),
            compiled: false,
        }
    }

    /// Bind `$name` to `value`. Bindings may change between evaluations.
    pub fn bind<S: Into<String>>(&mut self, name: S, value: Value) -> &mut Self {
        self.vars.insert(name.into(), value);
        self
    }

    /// Optimize the query against `data` and return the resulting plan.
    /// Compiling twice is a no-op.
    pub fn compile(&mut self, data: &Data) -> Result<String> {
        if !self.compiled {
            self.config.validate()?;
            let optimizer = Optimizer::new(&self.config.optimizer, data, &self.formats);
            self.expr = optimizer.optimize(self.expr.clone())?;
            self.compiled = true;
            debug!("compiled plan: {}", self.expr);
        }
        Ok(self.plan())
    }

    /// Display form of the current expression.
    pub fn plan(&self) -> String {
        self.expr.to_string()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn formats(&self) -> &FormatCache {
        &self.formats
    }

    fn ensure_compiled(&self) -> Result<()> {
        if self.compiled {
            Ok(())
        } else {
            Err(GlaiveError::query("query must be compiled before evaluation"))
        }
    }

    /// Evaluate the whole result.
    pub fn value(&self, data: &Data) -> Result<Value> {
        self.ensure_compiled()?;
        self.expr.eval(&Context::new(data, &self.vars, &self.formats))
    }

    /// Result nodes in document order. Index-backed plans stream straight
    /// from the index; other plans are evaluated first.
    pub fn nodes<'a>(&'a self, data: &'a Data) -> Result<Box<dyn IndexIterator + 'a>> {
        self.ensure_compiled()?;
        if let Some(iter) = self.expr.index_iter(data) {
            return Ok(iter);
        }
        let mut ids = self.value(data)?.node_ids()?;
        ids.sort_unstable();
        ids.dedup();
        Ok(Box::new(ListIterator::owned(ids)))
    }
}
