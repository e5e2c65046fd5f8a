//! Main-memory indexes built during document construction.
//!
//! - [`id_set`]: the open-addressed key -> postings store every index uses
//! - [`iterator`]: the pull-based node id protocol read paths return
//! - [`value`]: exact-match indexes over text contents and attribute values
//! - [`fulltext`]: token index over text contents

use serde::{Deserialize, Serialize};

pub mod fulltext;
pub mod id_set;
pub mod iterator;
pub mod value;

pub use self::fulltext::{FtPosting, FullTextIndex};
pub use self::id_set::{IdSet, Inserted, Slot};
pub use self::iterator::{
    EmptyIterator, Ids, IndexIterator, IntersectIterator, ListIterator, UnionIterator, collect_ids,
};
pub use self::value::{ValueIndex, ValueKind};

/// Identifier of a node: its pre-order rank in the document table.
pub type NodeId = u64;

/// Size and growth statistics of one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Human readable index name.
    pub name: String,
    /// Number of distinct keys.
    pub keys: usize,
    /// Number of postings over all keys.
    pub postings: usize,
    /// Number of probe buckets.
    pub capacity: usize,
    /// How often the underlying set grew.
    pub rehashes: usize,
}
