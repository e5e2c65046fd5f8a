//! Integration tests for the rewrite pass.

use glaive::index::collect_ids;
use glaive::prelude::*;

fn library() -> Result<Data> {
    let mut builder = DataBuilder::new(IndexConfig::default());
    builder.open_element("library")?;
    for (id, title) in [("b1", "Dune"), ("b2", "Emma"), ("b3", "Dune")] {
        builder.open_element("book")?;
        builder.attribute("id", id)?;
        builder.text(title)?;
        builder.close_element()?;
    }
    builder.close_element()?;
    builder.finish()
}

#[test]
fn test_not_exists_becomes_empty() -> Result<()> {
    let data = library()?;
    let mut query = QueryProcessor::new(
        Expr::not(Expr::exists(Expr::var("seq"))),
        EngineConfig::default(),
    );
    assert_eq!(query.compile(&data)?, "empty($seq)");

    query.bind("seq", Value::empty());
    assert_eq!(query.value(&data)?, Value::bool(true));

    query.bind("seq", Value::single(Item::Int(1)));
    assert_eq!(query.value(&data)?, Value::bool(false));
    Ok(())
}

#[test]
fn test_index_plan_matches_scan_plan() -> Result<()> {
    let data = library()?;
    let expr = Expr::filter(
        Expr::text(),
        Expr::general(
            CmpOp::Eq,
            Expr::context(),
            Expr::seq(vec![Expr::str("Dune"), Expr::str("Emma")]),
        ),
    );

    let mut indexed = QueryProcessor::new(expr.clone(), EngineConfig::default());
    let plan = indexed.compile(&data)?;
    assert_eq!(plan, "union(text-index(\"Dune\"), text-index(\"Emma\"))");

    let mut config = EngineConfig::default();
    config.optimizer.index_rewrites = false;
    let mut scanned = QueryProcessor::new(expr, config);
    assert_eq!(scanned.compile(&data)?, "//text()[. = (\"Dune\", \"Emma\")]");

    let from_index = collect_ids(indexed.nodes(&data)?.as_mut());
    let from_scan = collect_ids(scanned.nodes(&data)?.as_mut());
    assert_eq!(from_index, vec![4, 7, 10]);
    assert_eq!(from_index, from_scan);
    Ok(())
}

#[test]
fn test_element_with_id_with_and_without_index() -> Result<()> {
    let expr = Expr::call(Function::ElementWithId, vec![Expr::str("b3 b1 missing")])?;
    let indexed = library()?;

    let mut builder = DataBuilder::new(IndexConfig::none());
    builder.open_element("library")?;
    for (id, title) in [("b1", "Dune"), ("b2", "Emma"), ("b3", "Dune")] {
        builder.open_element("book")?;
        builder.attribute("id", id)?;
        builder.text(title)?;
        builder.close_element()?;
    }
    builder.close_element()?;
    let plain = builder.finish()?;

    for data in [&indexed, &plain] {
        let mut query = QueryProcessor::new(expr.clone(), EngineConfig::default());
        query.compile(data)?;
        assert_eq!(query.value(data)?.node_ids()?, vec![2, 8]);
    }
    Ok(())
}

#[test]
fn test_rewrites_preserve_results() -> Result<()> {
    let data = library()?;
    let inputs = [
        Value::empty(),
        Value::single(Item::Int(0)),
        Value::single(Item::str("x")),
        Value::nodes(vec![2, 5]),
    ];
    let pairs = [
        (
            Expr::not(Expr::not(Expr::var("x"))),
            Expr::boolean(Expr::var("x")),
        ),
        (
            Expr::not(Expr::empty(Expr::var("x"))),
            Expr::exists(Expr::var("x")),
        ),
    ];

    for (rewritten, reference) in pairs {
        for input in &inputs {
            let mut a = QueryProcessor::new(rewritten.clone(), EngineConfig::default());
            a.compile(&data)?;
            a.bind("x", input.clone());
            let mut b = QueryProcessor::new(reference.clone(), EngineConfig::default());
            b.compile(&data)?;
            b.bind("x", input.clone());
            assert_eq!(a.value(&data)?, b.value(&data)?, "{rewritten} on {input}");
        }
    }
    Ok(())
}

#[test]
fn test_single_pass_and_fixed_point_agree_on_results() -> Result<()> {
    let data = library()?;
    let expr = Expr::not(Expr::not(Expr::not(Expr::empty(Expr::attributes(Some("id"))))));

    let mut fixed = QueryProcessor::new(expr.clone(), EngineConfig::default());
    fixed.compile(&data)?;

    let mut config = EngineConfig::default();
    config.optimizer.fixed_point = false;
    let mut single = QueryProcessor::new(expr, config);
    single.compile(&data)?;

    assert_eq!(fixed.value(&data)?, single.value(&data)?);
    assert_eq!(fixed.value(&data)?, Value::bool(true));
    Ok(())
}
