//! Index-backed full-text iterators.
//!
//! Every [`FtIterator`] yields ascending text node ids together with the
//! matches that survived filtering for that node. Words iterators read
//! postings straight from the [`FullTextIndex`]; `ftand` intersects its
//! operands and `ftor` merges them through a min-heap.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::fulltext::expr::{FtWords, WordsMode};
use crate::fulltext::matches::{self, FtMatch};
use crate::fulltext::options::FtOptions;
use crate::fulltext::position::PositionFilter;
use crate::index::iterator::IndexIterator;
use crate::index::{FtPosting, FullTextIndex, NodeId};

/// Pull-based producer of full-text hits.
pub trait FtIterator: Debug {
    /// Advance to the next hit. Returns `false` once exhausted.
    fn more(&mut self) -> bool;

    /// Id of the current hit.
    fn id(&self) -> NodeId;

    /// Surviving matches of the current hit.
    fn matches(&self) -> &[FtMatch];

    /// Upper bound of the number of hits.
    fn size(&self) -> u64;
}

/// Hits of a words selection.
#[derive(Debug)]
pub struct FtWordsIter<'a> {
    index: &'a FullTextIndex,
    /// Postings of every query term, captured once.
    lists: Vec<Cow<'a, [FtPosting]>>,
    cursors: Vec<usize>,
    mode: WordsMode,
    base: u32,
    options: FtOptions,
    position: PositionFilter,
    current: NodeId,
    matches: Vec<FtMatch>,
}

impl<'a> FtWordsIter<'a> {
    pub fn new(words: &FtWords, index: &'a FullTextIndex) -> Self {
        let lists: Vec<_> = words.terms().iter().map(|term| term.postings(index)).collect();
        FtWordsIter {
            index,
            cursors: vec![0; lists.len()],
            lists,
            mode: words.mode,
            base: words.base(),
            options: words.options.clone(),
            position: words.position,
            current: NodeId::MAX,
            matches: Vec::new(),
        }
    }

    fn head(&self, term: usize) -> Option<NodeId> {
        self.lists[term].get(self.cursors[term]).map(|posting| posting.id)
    }

    /// Next id at which the terms can produce a match.
    fn next_candidate(&mut self) -> Option<NodeId> {
        if self.lists.is_empty() {
            return None;
        }
        match self.mode {
            WordsMode::Any => (0..self.lists.len()).filter_map(|term| self.head(term)).min(),
            WordsMode::All | WordsMode::Phrase => loop {
                let mut target = 0;
                for term in 0..self.lists.len() {
                    target = target.max(self.head(term)?);
                }
                let mut aligned = true;
                for (list, cursor) in self.lists.iter().zip(self.cursors.iter_mut()) {
                    while list.get(*cursor).is_some_and(|posting| posting.id < target) {
                        *cursor += 1;
                    }
                    match list.get(*cursor) {
                        Some(posting) if posting.id == target => {}
                        Some(_) => aligned = false,
                        None => return None,
                    }
                }
                if aligned {
                    break Some(target);
                }
            },
        }
    }
}

impl FtIterator for FtWordsIter<'_> {
    fn more(&mut self) -> bool {
        while let Some(id) = self.next_candidate() {
            let mut occurrences = Vec::with_capacity(self.lists.len());
            for (list, cursor) in self.lists.iter().zip(self.cursors.iter_mut()) {
                let mut positions = Vec::new();
                while let Some(posting) = list.get(*cursor).filter(|posting| posting.id == id) {
                    positions.push(posting.pos);
                    *cursor += 1;
                }
                occurrences.push(positions);
            }

            let mut found = matches::words_matches(&occurrences, self.mode, self.base);
            matches::filter(&mut found, &self.options, self.position, self.index.token_count(id));
            if !found.is_empty() {
                self.current = id;
                self.matches = found;
                return true;
            }
        }
        self.current = NodeId::MAX;
        self.matches.clear();
        false
    }

    fn id(&self) -> NodeId {
        self.current
    }

    fn matches(&self) -> &[FtMatch] {
        &self.matches
    }

    fn size(&self) -> u64 {
        let lengths = self.lists.iter().map(|list| list.len() as u64);
        match self.mode {
            WordsMode::Any => lengths.sum(),
            WordsMode::All | WordsMode::Phrase => lengths.min().unwrap_or(0),
        }
    }
}

/// Hits of an `ftand` array: ids every operand hits, with the pairwise
/// concatenation of their matches.
#[derive(Debug)]
pub struct FtAndIter<'a> {
    index: &'a FullTextIndex,
    children: Vec<Box<dyn FtIterator + 'a>>,
    options: FtOptions,
    position: PositionFilter,
    current: NodeId,
    matches: Vec<FtMatch>,
    exhausted: bool,
}

impl<'a> FtAndIter<'a> {
    pub fn new(
        children: Vec<Box<dyn FtIterator + 'a>>,
        options: FtOptions,
        position: PositionFilter,
        index: &'a FullTextIndex,
    ) -> Self {
        FtAndIter {
            index,
            exhausted: children.is_empty(),
            children,
            options,
            position,
            current: NodeId::MAX,
            matches: Vec::new(),
        }
    }

    /// Move every child to the smallest id all of them hit.
    fn align(&mut self) -> Option<NodeId> {
        loop {
            let target = self.children.iter().map(|child| child.id()).max()?;
            let mut aligned = true;
            for child in &mut self.children {
                while child.id() < target {
                    if !child.more() {
                        return None;
                    }
                }
                if child.id() != target {
                    aligned = false;
                }
            }
            if aligned {
                return Some(target);
            }
        }
    }

    fn finish(&mut self) -> bool {
        self.exhausted = true;
        self.current = NodeId::MAX;
        self.matches.clear();
        false
    }
}

impl FtIterator for FtAndIter<'_> {
    fn more(&mut self) -> bool {
        while !self.exhausted {
            // Every child sits on the previous hit (or before the first one).
            if !self.children.iter_mut().all(|child| child.more()) {
                return self.finish();
            }
            let Some(id) = self.align() else {
                return self.finish();
            };

            let mut combined = vec![FtMatch::empty()];
            for child in &self.children {
                combined = matches::and(&combined, child.matches());
            }
            matches::filter(&mut combined, &self.options, self.position, self.index.token_count(id));
            if !combined.is_empty() {
                self.current = id;
                self.matches = combined;
                return true;
            }
        }
        false
    }

    fn id(&self) -> NodeId {
        self.current
    }

    fn matches(&self) -> &[FtMatch] {
        &self.matches
    }

    fn size(&self) -> u64 {
        self.children.iter().map(|child| child.size()).min().unwrap_or(0)
    }
}

/// Hits of an `ftor` array: ids any operand hits, with the matches of every
/// operand hitting them.
#[derive(Debug)]
pub struct FtOrIter<'a> {
    index: &'a FullTextIndex,
    children: Vec<Box<dyn FtIterator + 'a>>,
    /// Live children keyed by their current id.
    heap: BinaryHeap<Reverse<(NodeId, usize)>>,
    options: FtOptions,
    position: PositionFilter,
    current: NodeId,
    matches: Vec<FtMatch>,
    size: u64,
}

impl<'a> FtOrIter<'a> {
    pub fn new(
        mut children: Vec<Box<dyn FtIterator + 'a>>,
        options: FtOptions,
        position: PositionFilter,
        index: &'a FullTextIndex,
    ) -> Self {
        let size = children.iter().map(|child| child.size()).sum();
        let mut heap = BinaryHeap::with_capacity(children.len());
        for (i, child) in children.iter_mut().enumerate() {
            if child.more() {
                heap.push(Reverse((child.id(), i)));
            }
        }
        FtOrIter {
            index,
            children,
            heap,
            options,
            position,
            current: NodeId::MAX,
            matches: Vec::new(),
            size,
        }
    }
}

impl FtIterator for FtOrIter<'_> {
    fn more(&mut self) -> bool {
        while let Some(&Reverse((id, _))) = self.heap.peek() {
            let mut combined = Vec::new();
            let mut advanced = Vec::new();
            while self.heap.peek().is_some_and(|Reverse((next, _))| *next == id) {
                if let Some(Reverse((_, i))) = self.heap.pop() {
                    advanced.push(i);
                }
            }
            advanced.sort_unstable();
            for i in advanced {
                let child = &mut self.children[i];
                combined.extend_from_slice(child.matches());
                if child.more() {
                    self.heap.push(Reverse((child.id(), i)));
                }
            }

            matches::filter(&mut combined, &self.options, self.position, self.index.token_count(id));
            if !combined.is_empty() {
                self.current = id;
                self.matches = combined;
                return true;
            }
        }
        self.current = NodeId::MAX;
        self.matches.clear();
        false
    }

    fn id(&self) -> NodeId {
        self.current
    }

    fn matches(&self) -> &[FtMatch] {
        &self.matches
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Exposes full-text hits through the plain [`IndexIterator`] protocol.
#[derive(Debug)]
pub struct FtHits<'a> {
    inner: Box<dyn FtIterator + 'a>,
}

impl<'a> FtHits<'a> {
    pub fn new(inner: Box<dyn FtIterator + 'a>) -> Self {
        FtHits { inner }
    }
}

impl IndexIterator for FtHits<'_> {
    fn more(&mut self) -> bool {
        self.inner.more()
    }

    fn id(&self) -> NodeId {
        self.inner.id()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulltext::expr::FtExpr;
    use crate::fulltext::options::FtIndexOptions;
    use crate::index::iterator::collect_ids;

    fn index() -> FullTextIndex {
        let mut index = FullTextIndex::new(FtIndexOptions::default());
        index.index_text(1, "the quick brown fox").unwrap();
        index.index_text(3, "a lazy dog").unwrap();
        index.index_text(5, "quick dog, lazy fox").unwrap();
        index.index_text(7, "fox").unwrap();
        index
    }

    fn hits(expr: FtExpr, index: &FullTextIndex) -> Vec<NodeId> {
        let expr = expr.compile(&FtOptions::new()).unwrap();
        let iter = expr.index_equivalent(index).unwrap();
        collect_ids(&mut FtHits::new(iter))
    }

    #[test]
    fn test_words_iter() {
        let index = index();
        assert_eq!(hits(FtExpr::words("fox", WordsMode::Any), &index), vec![1, 5, 7]);
        assert_eq!(hits(FtExpr::words("dog fox", WordsMode::Any), &index), vec![1, 3, 5, 7]);
        assert_eq!(hits(FtExpr::words("lazy fox", WordsMode::All), &index), vec![5]);
        assert_eq!(hits(FtExpr::words("lazy fox", WordsMode::Phrase), &index), vec![5]);
        assert_eq!(hits(FtExpr::words("brown quick", WordsMode::Phrase), &index), Vec::<NodeId>::new());
        assert!(hits(FtExpr::words("cat", WordsMode::Any), &index).is_empty());
    }

    #[test]
    fn test_and_or_iters() {
        let index = index();
        let and = FtExpr::and(vec![
            FtExpr::words("quick", WordsMode::Any),
            FtExpr::words("fox", WordsMode::Any),
        ]);
        assert_eq!(hits(and, &index), vec![1, 5]);

        let or = FtExpr::or(vec![
            FtExpr::words("brown", WordsMode::Any),
            FtExpr::words("dog", WordsMode::Any),
        ]);
        assert_eq!(hits(or, &index), vec![1, 3, 5]);
    }

    #[test]
    fn test_constraints_filter_hits() {
        let index = index();
        let ordered = FtExpr::and(vec![
            FtExpr::words("quick", WordsMode::Any),
            FtExpr::words("fox", WordsMode::Any),
        ])
        .with_options(FtOptions::new().with_window(2));
        assert!(hits(ordered, &index).is_empty());

        let at_end = FtExpr::words("fox", WordsMode::Any).with_position(PositionFilter::End);
        assert_eq!(hits(at_end, &index), vec![1, 5, 7]);
        let at_start = FtExpr::words("fox", WordsMode::Any).with_position(PositionFilter::Start);
        assert_eq!(hits(at_start, &index), vec![7]);
    }

    #[test]
    fn test_matches_are_exposed() {
        let index = index();
        let expr = FtExpr::words("fox", WordsMode::Any)
            .compile(&FtOptions::new())
            .unwrap();
        let mut iter = expr.index_equivalent(&index).unwrap();
        assert!(iter.more());
        assert_eq!(iter.id(), 1);
        assert_eq!(iter.matches()[0].strings[0].start, 3);
    }

    #[test]
    fn test_wildcard_terms() {
        let index = index();
        let expr = FtExpr::words("qu.* f.x", WordsMode::All)
            .with_options(FtOptions::new().with_wildcards(true));
        assert_eq!(hits(expr, &index), vec![1, 5]);
    }
}
