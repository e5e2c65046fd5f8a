//! Main-memory value index over text contents or attribute values.
//!
//! Built incrementally while a document is constructed: every text (or
//! attribute) node hands its value and id to [`ValueIndex::index`]. Reads go
//! through [`ValueIndex::ids`] and [`ValueIndex::count`], which dispatch to a
//! single [`IdSet`] slot and stream its postings.
//!
//! # Examples
//!
//! ```
//! use glaive::index::iterator::collect_ids;
//! use glaive::index::value::{ValueIndex, ValueKind};
//!
//! let mut index = ValueIndex::new(ValueKind::Text);
//! index.index(b"a", 1).unwrap();
//! index.index(b"b", 2).unwrap();
//! index.index(b"a", 3).unwrap();
//!
//! assert_eq!(collect_ids(index.ids(b"a").as_mut()), vec![1, 3]);
//! assert_eq!(index.count(b"c"), 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::id_set::{IdSet, Slot};
use crate::index::iterator::{EmptyIterator, IndexIterator, ListIterator};
use crate::index::{IndexStats, NodeId};

/// Which node values a [`ValueIndex`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text node contents.
    Text,
    /// Attribute values.
    Attribute,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => write!(f, "text"),
            ValueKind::Attribute => write!(f, "attribute"),
        }
    }
}

/// Value index mapping exact values to the ids of the nodes carrying them.
#[derive(Debug, Clone)]
pub struct ValueIndex {
    kind: ValueKind,
    values: IdSet<NodeId>,
}

impl ValueIndex {
    /// Create an empty index.
    pub fn new(kind: ValueKind) -> Self {
        ValueIndex {
            kind,
            values: IdSet::new(),
        }
    }

    /// Create an empty index with an explicit initial capacity and load factor.
    pub fn with_capacity(kind: ValueKind, capacity: usize, max_load_factor: f64) -> Self {
        ValueIndex {
            kind,
            values: IdSet::with_capacity(capacity, max_load_factor),
        }
    }

    /// The kind of values this index covers.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Index `id` under `key`, returning the key's slot.
    pub fn index(&mut self, key: &[u8], id: NodeId) -> Result<Slot> {
        Ok(self.values.insert(key, id)?.slot())
    }

    /// Slot of `key`, or `None` if the value never occurred.
    pub fn get(&self, key: &[u8]) -> Option<Slot> {
        self.values.lookup(key)
    }

    /// The value stored under `slot`.
    pub fn token(&self, slot: Slot) -> Option<&[u8]> {
        self.values.key(slot)
    }

    /// Ids of the nodes whose value equals `key`, in document order.
    pub fn ids(&self, key: &[u8]) -> Box<dyn IndexIterator + '_> {
        match self.values.lookup(key) {
            Some(slot) => Box::new(ListIterator::new(self.values.postings(slot))),
            None => Box::new(EmptyIterator::new()),
        }
    }

    /// Number of nodes whose value equals `key`.
    pub fn count(&self, key: &[u8]) -> usize {
        self.values.lookup(key).map_or(0, |slot| self.values.count(slot))
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value has been indexed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check the structural invariants of the underlying set.
    pub fn verify(&self) -> Result<()> {
        self.values.verify()
    }

    /// Size and growth statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            name: format!("{} values", self.kind),
            keys: self.values.len(),
            postings: self.values.total_postings(),
            capacity: self.values.capacity(),
            rehashes: self.values.rehashes(),
        }
    }
}
