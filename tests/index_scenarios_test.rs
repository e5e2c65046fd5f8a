//! Integration tests for the value indexes and the iterator protocol.

use glaive::index::{
    IdSet, IndexIterator, IntersectIterator, ListIterator, UnionIterator, ValueIndex, ValueKind,
    collect_ids,
};
use glaive::prelude::*;

#[test]
fn test_value_index_lookup() -> Result<()> {
    let mut index = ValueIndex::new(ValueKind::Text);
    for (token, id) in [("a", 1), ("b", 2), ("a", 3)] {
        index.index(token.as_bytes(), id)?;
    }

    assert_eq!(collect_ids(index.ids(b"a").as_mut()), vec![1, 3]);
    assert_eq!(collect_ids(index.ids(b"b").as_mut()), vec![2]);
    assert!(collect_ids(index.ids(b"c").as_mut()).is_empty());
    Ok(())
}

#[test]
fn test_rehash_keeps_every_posting() -> Result<()> {
    let mut set: IdSet<NodeId> = IdSet::with_capacity(2, 0.75);
    for i in 0..1000u64 {
        set.insert(format!("key-{}", i % 300).as_bytes(), i)?;
    }
    assert!(set.rehashes() >= 2);
    assert_eq!(set.len(), 300);
    set.verify()?;

    for k in 0..300u64 {
        let slot = set.lookup(format!("key-{k}").as_bytes()).expect("key was inserted");
        let expected: Vec<NodeId> = (0..1000u64).filter(|i| i % 300 == k).collect();
        assert_eq!(set.postings(slot), expected.as_slice());
    }
    Ok(())
}

#[test]
fn test_document_indexes_are_built_in_document_order() -> Result<()> {
    let mut builder = DataBuilder::new(IndexConfig::default());
    builder.open_element("list")?;
    for value in ["red", "green", "red", "blue", "red"] {
        builder.open_element("color")?;
        builder.attribute("name", value)?;
        builder.text(value)?;
        builder.close_element()?;
    }
    builder.close_element()?;
    let data = builder.finish()?;

    let text = data.text_index().expect("text index is configured");
    let ids = collect_ids(text.ids(b"red").as_mut());
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    for id in ids {
        assert_eq!(data.string_value(id), "red");
    }

    let attributes = data.attribute_index().expect("attribute index is configured");
    assert_eq!(attributes.count(b"green"), 1);
    assert_eq!(attributes.count(b"purple"), 0);
    Ok(())
}

#[test]
fn test_merged_iterators() {
    let a = [1, 5, 9, 12];
    let b = [2, 5, 12, 40];
    let union: Vec<Box<dyn IndexIterator + '_>> =
        vec![Box::new(ListIterator::new(&a)), Box::new(ListIterator::new(&b))];
    assert_eq!(
        collect_ids(&mut UnionIterator::new(union)),
        vec![1, 2, 5, 9, 12, 40]
    );

    let intersection: Vec<Box<dyn IndexIterator + '_>> =
        vec![Box::new(ListIterator::new(&a)), Box::new(ListIterator::new(&b))];
    assert_eq!(
        collect_ids(&mut IntersectIterator::new(intersection)),
        vec![5, 12]
    );
}

#[test]
fn test_missing_index_is_reported_as_none() -> Result<()> {
    let data = DataBuilder::new(IndexConfig::none()).finish()?;
    assert!(data.text_index().is_none());
    assert!(data.attribute_index().is_none());
    assert!(data.fulltext_index().is_none());
    assert!(data.index_stats().is_empty());
    Ok(())
}
