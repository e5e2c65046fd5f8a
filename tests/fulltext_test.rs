//! Integration tests for full-text queries: index-backed plans and scan
//! plans must return the same nodes.

use glaive::index::collect_ids;
use glaive::prelude::*;

const TEXTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "Quick thinking saves the day",
    "A café in Paris",
    "Brown bread and brown rice",
    "QUICK QUICK slow",
    "jumping foxes are running",
];

fn corpus(fulltext: FtIndexOptions) -> Result<Data> {
    let config = IndexConfig {
        fulltext: Some(fulltext),
        ..IndexConfig::default()
    };
    let mut builder = DataBuilder::new(config);
    builder.open_element("texts")?;
    for text in TEXTS {
        builder.open_element("p")?;
        builder.text(text)?;
        builder.close_element()?;
    }
    builder.close_element()?;
    builder.finish()
}

fn query(ft: FtExpr) -> Expr {
    Expr::filter(Expr::text(), Expr::contains(Expr::context(), ft))
}

/// Plan and matching text values under the given optimizer settings.
fn run(data: &Data, ft: FtExpr, index_rewrites: bool) -> Result<(String, Vec<String>)> {
    let mut config = EngineConfig::default();
    config.optimizer.index_rewrites = index_rewrites;
    let mut processor = QueryProcessor::new(query(ft), config);
    let plan = processor.compile(data)?;
    let ids = collect_ids(processor.nodes(data)?.as_mut());
    Ok((plan, ids.into_iter().map(|id| data.string_value(id)).collect()))
}

fn assert_equivalent(data: &Data, ft: FtExpr) -> Result<Vec<String>> {
    let (index_plan, from_index) = run(data, ft.clone(), true)?;
    let (scan_plan, from_scan) = run(data, ft, false)?;
    assert!(index_plan.starts_with("fulltext-index("), "{index_plan}");
    assert!(scan_plan.starts_with("//text()["), "{scan_plan}");
    assert_eq!(from_index, from_scan, "{index_plan}");
    Ok(from_index)
}

#[test]
fn test_case_insensitive_query_on_case_sensitive_index_falls_back_to_scan() -> Result<()> {
    let sensitive = corpus(FtIndexOptions {
        case_sensitive: true,
        ..FtIndexOptions::default()
    })?;
    let insensitive = corpus(FtIndexOptions::default())?;
    let ft = FtExpr::words("quick", WordsMode::Any).with_options(FtOptions::new().with_case(FtCase::Insensitive));

    let (fallback_plan, fallback) = run(&sensitive, ft.clone(), true)?;
    let (index_plan, indexed) = run(&insensitive, ft, true)?;

    assert!(fallback_plan.starts_with("//text()["), "{fallback_plan}");
    assert!(index_plan.starts_with("fulltext-index("), "{index_plan}");
    assert_eq!(fallback, indexed);
    assert_eq!(indexed.len(), 3);
    Ok(())
}

#[test]
fn test_words_modes() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;

    let any = assert_equivalent(&data, FtExpr::words("fox rice", WordsMode::Any))?;
    assert_eq!(any, vec![TEXTS[0], TEXTS[3]]);

    let all = assert_equivalent(&data, FtExpr::words("brown quick", WordsMode::All))?;
    assert_eq!(all, vec![TEXTS[0]]);

    let phrase = assert_equivalent(&data, FtExpr::words("brown fox", WordsMode::Phrase))?;
    assert_eq!(phrase, vec![TEXTS[0]]);

    let none = assert_equivalent(&data, FtExpr::words("fox brown", WordsMode::Phrase))?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn test_diacritics_are_folded_by_default() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;
    let hits = assert_equivalent(&data, FtExpr::words("cafe", WordsMode::Any))?;
    assert_eq!(hits, vec![TEXTS[2]]);
    Ok(())
}

#[test]
fn test_case_sensitive_index() -> Result<()> {
    let data = corpus(FtIndexOptions {
        case_sensitive: true,
        ..FtIndexOptions::default()
    })?;
    let upper = FtExpr::words("QUICK", WordsMode::Any).with_options(FtOptions::new().with_case(FtCase::Sensitive));
    assert_eq!(assert_equivalent(&data, upper)?, vec![TEXTS[4]]);

    let uppercased = FtExpr::words("quick", WordsMode::Any).with_options(FtOptions::new().with_case(FtCase::Upper));
    assert_eq!(assert_equivalent(&data, uppercased)?, vec![TEXTS[4]]);
    Ok(())
}

#[test]
fn test_stemming_index() -> Result<()> {
    let data = corpus(FtIndexOptions {
        stemming: true,
        ..FtIndexOptions::default()
    })?;
    let stemmed = FtExpr::words("running", WordsMode::Any).with_options(FtOptions::new().with_stemming(true));
    assert_eq!(assert_equivalent(&data, stemmed)?, vec![TEXTS[5]]);

    // The index stems every token, so unstemmed queries cannot use it.
    let (plan, _) = run(&data, FtExpr::words("running", WordsMode::Any), true)?;
    assert!(plan.starts_with("//text()["), "{plan}");
    Ok(())
}

#[test]
fn test_combinators() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;

    let and = FtExpr::and(vec![
        FtExpr::words("brown", WordsMode::Any),
        FtExpr::words("rice", WordsMode::Any),
    ]);
    assert_eq!(assert_equivalent(&data, and)?, vec![TEXTS[3]]);

    let or = FtExpr::or(vec![
        FtExpr::words("paris", WordsMode::Any),
        FtExpr::words("day", WordsMode::Any),
    ]);
    assert_eq!(assert_equivalent(&data, or)?, vec![TEXTS[1], TEXTS[2]]);
    Ok(())
}

#[test]
fn test_positional_constraints() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;

    let window = FtExpr::words("quick dog", WordsMode::All).with_options(FtOptions::new().with_window(3));
    assert!(assert_equivalent(&data, window)?.is_empty());

    let wide = FtExpr::words("quick dog", WordsMode::All).with_options(FtOptions::new().with_window(9));
    assert_eq!(assert_equivalent(&data, wide)?, vec![TEXTS[0]]);

    let at_start = FtExpr::words("quick", WordsMode::Any).with_position(PositionFilter::Start);
    assert_eq!(assert_equivalent(&data, at_start)?, vec![TEXTS[1], TEXTS[4]]);

    let at_end = FtExpr::words("dog rice", WordsMode::Any).with_position(PositionFilter::End);
    assert_eq!(assert_equivalent(&data, at_end)?, vec![TEXTS[0], TEXTS[3]]);
    Ok(())
}

#[test]
fn test_negation_is_never_index_backed() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;
    let ft = FtExpr::not(FtExpr::words("quick", WordsMode::Any));
    let (plan, hits) = run(&data, ft, true)?;
    assert!(plan.starts_with("//text()["), "{plan}");
    assert_eq!(hits, vec![TEXTS[2], TEXTS[3], TEXTS[5]]);
    Ok(())
}

#[test]
fn test_one_ineligible_operand_keeps_the_whole_array_on_scan() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;
    let ft = FtExpr::or(vec![
        FtExpr::words("paris", WordsMode::Any),
        FtExpr::not(FtExpr::words("quick", WordsMode::Any)),
    ]);
    let (plan, hits) = run(&data, ft.clone(), true)?;
    let (_, scanned) = run(&data, ft, false)?;
    assert!(plan.starts_with("//text()["), "{plan}");
    assert_eq!(hits, scanned);
    assert_eq!(hits, vec![TEXTS[2], TEXTS[3], TEXTS[5]]);
    Ok(())
}

#[test]
fn test_wildcards() -> Result<()> {
    let data = corpus(FtIndexOptions::default())?;
    let ft = FtExpr::words("fox.*", WordsMode::Any).with_options(FtOptions::new().with_wildcards(true));
    assert_eq!(assert_equivalent(&data, ft)?, vec![TEXTS[0], TEXTS[5]]);
    Ok(())
}
