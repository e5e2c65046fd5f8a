//! Incremental construction of a [`Data`] instance.
//!
//! Node ids grow monotonically, so every postings list the builder appends
//! to stays in ascending document order.

use log::debug;

use crate::config::IndexConfig;
use crate::data::{Data, MetaData, Node, NodeKind};
use crate::error::{GlaiveError, Result};
use crate::index::value::{ValueIndex, ValueKind};
use crate::index::{FullTextIndex, NodeId};

/// Builds a document in pre-order and fills the configured indexes.
#[derive(Debug)]
pub struct DataBuilder {
    nodes: Vec<Node>,
    /// Open elements, innermost last. The document node is never popped.
    open: Vec<NodeId>,
    text_index: Option<ValueIndex>,
    attribute_index: Option<ValueIndex>,
    fulltext_index: Option<FullTextIndex>,
}

impl DataBuilder {
    /// Start a document. The document node gets id 0.
    pub fn new(config: IndexConfig) -> Self {
        let capacity = config.initial_capacity;
        let load_factor = config.max_load_factor;
        DataBuilder {
            nodes: vec![Node {
                kind: NodeKind::Document,
                name: None,
                value: None,
                parent: None,
                size: 1,
            }],
            open: vec![0],
            text_index: config
                .text_index
                .then(|| ValueIndex::with_capacity(ValueKind::Text, capacity, load_factor)),
            attribute_index: config
                .attribute_index
                .then(|| ValueIndex::with_capacity(ValueKind::Attribute, capacity, load_factor)),
            fulltext_index: config
                .fulltext
                .map(|options| FullTextIndex::with_capacity(options, capacity, load_factor)),
        }
    }

    fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(0)
    }

    fn push(&mut self, kind: NodeKind, name: Option<String>, value: Option<String>) -> NodeId {
        let id = self.next_id();
        self.nodes.push(Node {
            kind,
            name,
            value,
            parent: Some(self.current()),
            size: 1,
        });
        id
    }

    /// Open a child element of the current element.
    pub fn open_element(&mut self, name: &str) -> Result<NodeId> {
        if name.is_empty() {
            return Err(GlaiveError::index("element name must not be empty"));
        }
        let id = self.push(NodeKind::Element, Some(name.to_string()), None);
        self.open.push(id);
        Ok(id)
    }

    /// Add an attribute to the element opened last. Attributes must precede
    /// the element's children.
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<NodeId> {
        let owner = self.current();
        if owner == 0 {
            return Err(GlaiveError::index("attribute outside of an element"));
        }
        let last = &self.nodes[self.nodes.len() - 1];
        let follows_owner = self.next_id() - 1 == owner
            || (last.kind == NodeKind::Attribute && last.parent == Some(owner));
        if !follows_owner {
            return Err(GlaiveError::index(format!(
                "attribute '{name}' added after the content of its element"
            )));
        }

        let id = self.push(NodeKind::Attribute, Some(name.to_string()), Some(value.to_string()));
        if let Some(index) = &mut self.attribute_index {
            index.index(value.as_bytes(), id)?;
        }
        Ok(id)
    }

    /// Add a text node to the current element. Empty texts are skipped.
    pub fn text(&mut self, value: &str) -> Result<Option<NodeId>> {
        if value.is_empty() {
            return Ok(None);
        }
        let id = self.push(NodeKind::Text, None, Some(value.to_string()));
        if let Some(index) = &mut self.text_index {
            index.index(value.as_bytes(), id)?;
        }
        if let Some(index) = &mut self.fulltext_index {
            index.index_text(id, value)?;
        }
        Ok(Some(id))
    }

    /// Close the current element.
    pub fn close_element(&mut self) -> Result<NodeId> {
        if self.open.len() <= 1 {
            return Err(GlaiveError::index("no open element to close"));
        }
        let id = self.open.pop().unwrap_or(0);
        let size = self.next_id() - id;
        self.nodes[id as usize].size = size;
        Ok(id)
    }

    /// Finish the document. All elements must be closed.
    pub fn finish(mut self) -> Result<Data> {
        if self.open.len() > 1 {
            return Err(GlaiveError::index(format!(
                "{} element(s) left open",
                self.open.len() - 1
            )));
        }
        let total = self.next_id();
        self.nodes[0].size = total;

        for index in [&self.text_index, &self.attribute_index].into_iter().flatten() {
            index.verify()?;
        }
        if let Some(index) = &self.fulltext_index {
            index.verify()?;
        }

        let meta = MetaData {
            nodes: total,
            text_index: self.text_index.is_some(),
            attribute_index: self.attribute_index.is_some(),
            fulltext: self.fulltext_index.as_ref().map(|index| index.options().clone()),
        };
        debug!(
            "built document with {} nodes (text index: {}, attribute index: {}, full-text index: {})",
            total,
            meta.text_index,
            meta.attribute_index,
            meta.fulltext.is_some()
        );

        Ok(Data {
            nodes: self.nodes,
            meta,
            text_index: self.text_index,
            attribute_index: self.attribute_index,
            fulltext_index: self.fulltext_index,
        })
    }
}
