//! Pull-based iterators over node ids.
//!
//! An [`IndexIterator`] is finite, single pass and may be dropped at any
//! point. The cursor starts *before* the first id: [`IndexIterator::more`]
//! advances it and reports whether an id is available, after which
//! [`IndexIterator::id`] returns that id.
//!
//! Producers feeding [`UnionIterator`] or [`IntersectIterator`] must yield
//! ascending ids. Value and full-text postings satisfy this by construction
//! because node ids grow monotonically while a document is built.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::index::NodeId;

/// Trait for lazy producers of node ids.
pub trait IndexIterator: Debug {
    /// Advance to the next id. Returns `false` once the iterator is exhausted.
    fn more(&mut self) -> bool;

    /// The current id. Only meaningful after [`more`](Self::more) returned `true`.
    fn id(&self) -> NodeId;

    /// Advance to the first id that is `>= target`.
    fn skip_to(&mut self, target: NodeId) -> bool {
        while self.more() {
            if self.id() >= target {
                return true;
            }
        }
        false
    }

    /// Upper bound of the number of ids this iterator yields.
    fn size(&self) -> u64;
}

/// An iterator that yields nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyIterator;

impl EmptyIterator {
    /// Create a new empty iterator.
    pub fn new() -> Self {
        EmptyIterator
    }
}

impl IndexIterator for EmptyIterator {
    fn more(&mut self) -> bool {
        false
    }

    fn id(&self) -> NodeId {
        NodeId::MAX
    }

    fn skip_to(&mut self, _target: NodeId) -> bool {
        false
    }

    fn size(&self) -> u64 {
        0
    }
}

/// An iterator over a single postings list.
///
/// The list is captured once at construction, either borrowed from an index
/// or owned (scan results), and never re-derived from a slot afterwards.
#[derive(Debug, Clone)]
pub struct ListIterator<'a> {
    ids: Cow<'a, [NodeId]>,
    /// Index of the next id to hand out.
    next: usize,
}

impl<'a> ListIterator<'a> {
    /// Iterate over a borrowed postings list.
    pub fn new(ids: &'a [NodeId]) -> Self {
        ListIterator {
            ids: Cow::Borrowed(ids),
            next: 0,
        }
    }

    /// Iterate over an owned list of ids.
    pub fn owned(ids: Vec<NodeId>) -> ListIterator<'static> {
        ListIterator {
            ids: Cow::Owned(ids),
            next: 0,
        }
    }
}

impl IndexIterator for ListIterator<'_> {
    fn more(&mut self) -> bool {
        if self.next < self.ids.len() {
            self.next += 1;
            true
        } else {
            false
        }
    }

    fn id(&self) -> NodeId {
        match self.next {
            0 => NodeId::MAX,
            n => self.ids.get(n - 1).copied().unwrap_or(NodeId::MAX),
        }
    }

    fn size(&self) -> u64 {
        self.ids.len() as u64
    }
}

/// A heap entry ordered so that the smallest current id is on top.
#[derive(Debug)]
struct HeapEntry<'a> {
    iter: Box<dyn IndexIterator + 'a>,
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter.id() == other.iter.id()
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower ids come first
        other.iter.id().cmp(&self.iter.id())
    }
}

/// Sorted union (OR) of ascending iterators. Duplicate ids are yielded once.
#[derive(Debug)]
pub struct UnionIterator<'a> {
    heap: BinaryHeap<HeapEntry<'a>>,
    current: NodeId,
    started: bool,
    size: u64,
}

impl<'a> UnionIterator<'a> {
    /// Create a union over `iters`.
    pub fn new(iters: Vec<Box<dyn IndexIterator + 'a>>) -> Self {
        let mut heap = BinaryHeap::with_capacity(iters.len());
        let mut size = 0;
        for mut iter in iters {
            size += iter.size();
            if iter.more() {
                heap.push(HeapEntry { iter });
            }
        }

        UnionIterator {
            heap,
            current: NodeId::MAX,
            started: false,
            size,
        }
    }

    /// Advance every child positioned on the current id past it.
    fn advance_current(&mut self) {
        let current = self.current;
        let mut reinsert = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.iter.id() != current {
                break;
            }
            let Some(mut entry) = self.heap.pop() else {
                break;
            };
            let mut alive = true;
            while entry.iter.id() == current {
                if !entry.iter.more() {
                    alive = false;
                    break;
                }
            }
            if alive {
                reinsert.push(entry);
            }
        }
        self.heap.extend(reinsert);
    }
}

impl IndexIterator for UnionIterator<'_> {
    fn more(&mut self) -> bool {
        if self.started {
            self.advance_current();
        }
        self.started = true;

        match self.heap.peek() {
            Some(top) => {
                self.current = top.iter.id();
                true
            }
            None => {
                self.current = NodeId::MAX;
                false
            }
        }
    }

    fn id(&self) -> NodeId {
        self.current
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Sorted intersection (AND) of ascending iterators.
#[derive(Debug)]
pub struct IntersectIterator<'a> {
    iters: Vec<Box<dyn IndexIterator + 'a>>,
    current: NodeId,
    started: bool,
    exhausted: bool,
}

impl<'a> IntersectIterator<'a> {
    /// Create an intersection over `iters`. An empty input yields nothing.
    pub fn new(mut iters: Vec<Box<dyn IndexIterator + 'a>>) -> Self {
        // Drive the cheapest child first.
        iters.sort_by_key(|iter| iter.size());
        let exhausted = iters.is_empty() || !iters.iter_mut().all(|iter| iter.more());

        IntersectIterator {
            iters,
            current: NodeId::MAX,
            started: false,
            exhausted,
        }
    }

    /// Skip children forward until all of them agree on one id.
    fn align(&mut self) -> bool {
        loop {
            let target = self.iters.iter().map(|iter| iter.id()).max().unwrap_or(NodeId::MAX);
            let mut aligned = true;
            for iter in &mut self.iters {
                if iter.id() < target {
                    if !iter.skip_to(target) {
                        return false;
                    }
                    if iter.id() != target {
                        aligned = false;
                    }
                }
            }
            if aligned {
                self.current = target;
                return true;
            }
        }
    }
}

impl IndexIterator for IntersectIterator<'_> {
    fn more(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.started && !self.iters[0].more() {
            self.exhausted = true;
            self.current = NodeId::MAX;
            return false;
        }
        self.started = true;

        if self.align() {
            true
        } else {
            self.exhausted = true;
            self.current = NodeId::MAX;
            false
        }
    }

    fn id(&self) -> NodeId {
        self.current
    }

    fn size(&self) -> u64 {
        self.iters.iter().map(|iter| iter.size()).min().unwrap_or(0)
    }
}

/// Adapter exposing an [`IndexIterator`] as a standard [`Iterator`].
#[derive(Debug)]
pub struct Ids<'a> {
    inner: Box<dyn IndexIterator + 'a>,
}

impl<'a> Ids<'a> {
    /// Wrap `inner`.
    pub fn new(inner: Box<dyn IndexIterator + 'a>) -> Self {
        Ids { inner }
    }
}

impl Iterator for Ids<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.inner.more() {
            Some(self.inner.id())
        } else {
            None
        }
    }
}

/// Drain an iterator into a vector.
pub fn collect_ids<I: IndexIterator + ?Sized>(iter: &mut I) -> Vec<NodeId> {
    let mut ids = Vec::new();
    while iter.more() {
        ids.push(iter.id());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[NodeId]) -> Box<dyn IndexIterator + '_> {
        Box::new(ListIterator::new(ids))
    }

    #[test]
    fn test_empty_iterator() {
        let mut iter = EmptyIterator::new();
        assert!(!iter.more());
        assert!(!iter.skip_to(5));
        assert_eq!(iter.size(), 0);
        assert_eq!(iter.id(), NodeId::MAX);
    }

    #[test]
    fn test_list_iterator() {
        let ids = [1, 3, 5];
        let mut iter = ListIterator::new(&ids);
        assert_eq!(iter.size(), 3);
        assert!(iter.more());
        assert_eq!(iter.id(), 1);
        assert!(iter.skip_to(4));
        assert_eq!(iter.id(), 5);
        assert!(!iter.more());
    }

    #[test]
    fn test_owned_list_iterator() {
        let mut iter = ListIterator::owned(vec![2, 4]);
        assert_eq!(collect_ids(&mut iter), vec![2, 4]);
        assert!(!iter.more());
    }

    #[test]
    fn test_union_iterator() {
        let a = [1, 4, 7];
        let b = [2, 4, 8, 9];
        let c: [NodeId; 0] = [];
        let mut union = UnionIterator::new(vec![list(&a), list(&b), list(&c)]);
        assert_eq!(collect_ids(&mut union), vec![1, 2, 4, 7, 8, 9]);
        assert!(!union.more());
    }

    #[test]
    fn test_union_collapses_repeated_ids() {
        let a = [1, 1, 2];
        let mut union = UnionIterator::new(vec![list(&a)]);
        assert_eq!(collect_ids(&mut union), vec![1, 2]);
    }

    #[test]
    fn test_intersect_iterator() {
        let a = [1, 3, 4, 7, 9];
        let b = [3, 4, 5, 9];
        let c = [0, 3, 9, 10];
        let mut inter = IntersectIterator::new(vec![list(&a), list(&b), list(&c)]);
        assert_eq!(collect_ids(&mut inter), vec![3, 9]);
        assert!(!inter.more());
    }

    #[test]
    fn test_intersect_with_empty_child() {
        let a = [1, 2];
        let mut inter = IntersectIterator::new(vec![list(&a), Box::new(EmptyIterator)]);
        assert!(!inter.more());

        let mut none = IntersectIterator::new(Vec::new());
        assert!(!none.more());
    }

    #[test]
    fn test_ids_adapter() {
        let a = [5, 6];
        let ids: Vec<NodeId> = Ids::new(list(&a)).collect();
        assert_eq!(ids, vec![5, 6]);
    }
}
