//! Main-memory full-text index.
//!
//! Keys are normalized tokens; each key owns the `(node id, position)` pairs
//! of its occurrences in document order. Tokens are normalized with the
//! index's build-time [`FtIndexOptions`], which are fixed at construction and
//! never change afterwards.

use ahash::AHashMap;
use log::trace;

use crate::analysis::normalize::Normalizer;
use crate::analysis::wildcard::Wildcard;
use crate::error::Result;
use crate::fulltext::options::FtIndexOptions;
use crate::index::id_set::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, IdSet};
use crate::index::{IndexStats, NodeId};

/// One occurrence of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FtPosting {
    /// Text node containing the token.
    pub id: NodeId,
    /// 0-based token position inside that text node.
    pub pos: u32,
}

impl FtPosting {
    /// Create a posting.
    pub fn new(id: NodeId, pos: u32) -> Self {
        FtPosting { id, pos }
    }
}

/// Token index over text nodes.
#[derive(Debug)]
pub struct FullTextIndex {
    options: FtIndexOptions,
    normalizer: Normalizer,
    tokens: IdSet<FtPosting>,
    /// Number of tokens of every indexed text node.
    token_counts: AHashMap<NodeId, u32>,
}

impl FullTextIndex {
    /// Create an empty index built with `options`.
    pub fn new(options: FtIndexOptions) -> Self {
        Self::with_capacity(options, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Create an empty index with an explicit initial capacity and load factor.
    pub fn with_capacity(options: FtIndexOptions, capacity: usize, max_load_factor: f64) -> Self {
        let normalizer = options.normalizer();
        FullTextIndex {
            options,
            normalizer,
            tokens: IdSet::with_capacity(capacity, max_load_factor),
            token_counts: AHashMap::new(),
        }
    }

    /// The build-time options.
    pub fn options(&self) -> &FtIndexOptions {
        &self.options
    }

    /// Tokenize `text` and index every token under node `id`.
    /// Returns the number of tokens indexed.
    pub fn index_text(&mut self, id: NodeId, text: &str) -> Result<u32> {
        let tokens = self.normalizer.tokens(text)?;
        let count = tokens.len() as u32;
        for token in tokens {
            self.tokens
                .insert(token.text.as_bytes(), FtPosting::new(id, token.position))?;
        }
        if count > 0 {
            self.token_counts.insert(id, count);
        }
        trace!("indexed {count} tokens of node {id}");
        Ok(count)
    }

    /// Occurrences of an already normalized token, in document order.
    pub fn postings(&self, token: &str) -> &[FtPosting] {
        match self.tokens.lookup(token.as_bytes()) {
            Some(slot) => self.tokens.postings(slot),
            None => &[],
        }
    }

    /// Occurrences of every token matching `wildcard`, sorted by id and position.
    pub fn wildcard_postings(&self, wildcard: &Wildcard) -> Vec<FtPosting> {
        let mut postings: Vec<FtPosting> = self
            .tokens
            .iter()
            .filter(|(_, key)| {
                std::str::from_utf8(key).is_ok_and(|token| wildcard.matches(token))
            })
            .flat_map(|(slot, _)| self.tokens.postings(slot).iter().copied())
            .collect();
        postings.sort_unstable();
        postings
    }

    /// Number of tokens of text node `id`, 0 if the node holds no token.
    pub fn token_count(&self, id: NodeId) -> u32 {
        self.token_counts.get(&id).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token has been indexed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check the structural invariants of the underlying set.
    pub fn verify(&self) -> Result<()> {
        self.tokens.verify()
    }

    /// Size and growth statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            name: "full-text".to_string(),
            keys: self.tokens.len(),
            postings: self.tokens.total_postings(),
            capacity: self.tokens.capacity(),
            rehashes: self.tokens.rehashes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FullTextIndex {
        let mut index = FullTextIndex::new(FtIndexOptions::default());
        index.index_text(2, "The quick brown fox").unwrap();
        index.index_text(4, "Quick thinking, quicker fox!").unwrap();
        index.index_text(6, "").unwrap();
        index
    }

    #[test]
    fn test_postings() {
        let index = index();
        assert_eq!(
            index.postings("quick"),
            &[FtPosting::new(2, 1), FtPosting::new(4, 0)]
        );
        assert_eq!(index.postings("fox").len(), 2);
        assert!(index.postings("Quick").is_empty());
        assert!(index.postings("missing").is_empty());
    }

    #[test]
    fn test_token_counts() {
        let index = index();
        assert_eq!(index.token_count(2), 4);
        assert_eq!(index.token_count(4), 4);
        assert_eq!(index.token_count(6), 0);
        assert_eq!(index.token_count(99), 0);
    }

    #[test]
    fn test_wildcard_postings_are_sorted() {
        let index = index();
        let wildcard = Wildcard::new("quick.*").unwrap();
        assert_eq!(
            index.wildcard_postings(&wildcard),
            vec![
                FtPosting::new(2, 1),
                FtPosting::new(4, 0),
                FtPosting::new(4, 2)
            ]
        );
    }

    #[test]
    fn test_case_sensitive_index() {
        let options = FtIndexOptions {
            case_sensitive: true,
            ..FtIndexOptions::default()
        };
        let mut index = FullTextIndex::new(options);
        index.index_text(1, "Rust rust").unwrap();
        assert_eq!(index.postings("Rust"), &[FtPosting::new(1, 0)]);
        assert_eq!(index.postings("rust"), &[FtPosting::new(1, 1)]);
        assert_eq!(index.stats().keys, 2);
        index.verify().unwrap();
    }
}
