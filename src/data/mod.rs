//! In-memory document table.
//!
//! Nodes are stored in pre-order: a node's id is its rank in document order
//! and its descendants occupy the ids `id + 1 .. id + size`. Attributes are
//! stored right after their element. The indexes are filled by
//! [`DataBuilder`] while nodes are appended and are read-only afterwards.
//!
//! # Examples
//!
//! ```
//! use glaive::config::IndexConfig;
//! use glaive::data::{DataBuilder, NodeKind};
//!
//! let mut builder = DataBuilder::new(IndexConfig::default());
//! builder.open_element("book").unwrap();
//! builder.attribute("id", "b1").unwrap();
//! builder.text("Dune").unwrap();
//! builder.close_element().unwrap();
//! let data = builder.finish().unwrap();
//!
//! assert_eq!(data.len(), 4);
//! assert_eq!(data.kind(1), Some(NodeKind::Element));
//! assert_eq!(data.string_value(1), "Dune");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fulltext::options::FtIndexOptions;
use crate::index::value::{ValueIndex, ValueKind};
use crate::index::{FullTextIndex, IndexStats, NodeId};

pub mod builder;

pub use self::builder::DataBuilder;

/// Kind of a stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Document => write!(f, "document"),
            NodeKind::Element => write!(f, "element"),
            NodeKind::Attribute => write!(f, "attribute"),
            NodeKind::Text => write!(f, "text"),
        }
    }
}

/// One stored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Element or attribute name.
    pub name: Option<String>,
    /// Attribute value or text content.
    pub value: Option<String>,
    pub parent: Option<NodeId>,
    /// Number of nodes in the subtree, the node itself included.
    pub size: u64,
}

/// Which indexes a database carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub nodes: u64,
    pub text_index: bool,
    pub attribute_index: bool,
    /// Build options of the full-text index, if there is one.
    pub fulltext: Option<FtIndexOptions>,
}

/// A finished document together with its indexes.
#[derive(Debug)]
pub struct Data {
    nodes: Vec<Node>,
    meta: MetaData,
    text_index: Option<ValueIndex>,
    attribute_index: Option<ValueIndex>,
    fulltext_index: Option<FullTextIndex>,
}

impl Data {
    /// Number of nodes, the document node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        usize::try_from(id).ok().and_then(|i| self.nodes.get(i))
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.name.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Ids of all nodes below `id` in document order, attributes included.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let size = self.node(id).map_or(1, |node| node.size.max(1));
        (id + 1)..(id + size)
    }

    /// Attributes of element `id`.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id)
            .take_while(move |&child| self.kind(child) == Some(NodeKind::Attribute))
    }

    /// String value: the value of a text or attribute node, the
    /// concatenated descendant text of an element or the document.
    pub fn string_value(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) => match node.kind {
                NodeKind::Text | NodeKind::Attribute => node.value.clone().unwrap_or_default(),
                NodeKind::Element | NodeKind::Document => self
                    .descendants(id)
                    .filter_map(|child| self.node(child))
                    .filter(|child| child.kind == NodeKind::Text)
                    .filter_map(|child| child.value.as_deref())
                    .collect(),
            },
            None => String::new(),
        }
    }

    pub fn text_index(&self) -> Option<&ValueIndex> {
        self.text_index.as_ref()
    }

    pub fn attribute_index(&self) -> Option<&ValueIndex> {
        self.attribute_index.as_ref()
    }

    /// The value index of the given kind, if it was built.
    pub fn value_index(&self, kind: ValueKind) -> Option<&ValueIndex> {
        match kind {
            ValueKind::Text => self.text_index(),
            ValueKind::Attribute => self.attribute_index(),
        }
    }

    pub fn fulltext_index(&self) -> Option<&FullTextIndex> {
        self.fulltext_index.as_ref()
    }

    /// Statistics of every built index.
    pub fn index_stats(&self) -> Vec<IndexStats> {
        let mut stats = Vec::new();
        if let Some(index) = &self.text_index {
            stats.push(index.stats());
        }
        if let Some(index) = &self.attribute_index {
            stats.push(index.stats());
        }
        if let Some(index) = &self.fulltext_index {
            stats.push(index.stats());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;

    fn library() -> Data {
        let mut builder = DataBuilder::new(IndexConfig::default());
        builder.open_element("library").unwrap();
        builder.open_element("book").unwrap();
        builder.attribute("id", "b1").unwrap();
        builder.attribute("lang", "en").unwrap();
        builder.text("Dune").unwrap();
        builder.close_element().unwrap();
        builder.open_element("book").unwrap();
        builder.text("Solaris").unwrap();
        builder.close_element().unwrap();
        builder.close_element().unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_pre_order_layout() {
        let data = library();
        assert_eq!(data.len(), 8);
        assert_eq!(data.kind(0), Some(NodeKind::Document));
        assert_eq!(data.name(1), Some("library"));
        assert_eq!(data.parent(2), Some(1));
        assert_eq!(data.parent(3), Some(2));
        assert_eq!(data.descendants(1).collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(data.attributes(2).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(data.attributes(6).count(), 0);
        assert!(data.node(99).is_none());
    }

    #[test]
    fn test_string_values() {
        let data = library();
        assert_eq!(data.string_value(0), "DuneSolaris");
        assert_eq!(data.string_value(3), "b1");
        assert_eq!(data.string_value(6), "Solaris");
        assert_eq!(data.string_value(42), "");
    }

    #[test]
    fn test_meta_and_stats() {
        let data = library();
        assert_eq!(data.meta().nodes, 8);
        assert!(data.meta().text_index);
        assert_eq!(data.index_stats().len(), 3);
        assert!(data.value_index(ValueKind::Attribute).is_some());
    }
}
