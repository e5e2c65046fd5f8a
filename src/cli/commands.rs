//! Command implementations for the Glaive CLI.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{EngineConfig, IndexConfig};
use crate::data::{Data, DataBuilder, NodeKind};
use crate::error::Result;
use crate::fulltext::{FtExpr, FtOptions, PositionFilter};
use crate::index::{Ids, NodeId, ValueKind};
use crate::query::{CmpOp, Expr, NodeTest, QueryProcessor};

/// Name of the element wrapping all records.
pub const ROOT_ELEMENT: &str = "records";

/// One line of a records file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
}

impl ElementRecord {
    /// Why the record cannot become an element, if it cannot.
    fn problem(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            Some("empty element name")
        } else if self.attributes.keys().any(String::is_empty) {
            Some("empty attribute name")
        } else {
            None
        }
    }
}

/// Execute a CLI command.
pub fn execute_command(args: GlaiveArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;

    match &args.command {
        Command::Search(search_args) => search(search_args, config, &args),
        Command::Lookup(lookup_args) => lookup(lookup_args, config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, config, &args),
    }
}

/// Build a database from a JSON Lines records file. Every record becomes an
/// element below a single `records` element. Malformed lines are skipped.
pub fn load_records(path: &Path, config: &IndexConfig) -> Result<(Data, usize)> {
    let reader = BufReader::new(File::open(path)?);
    let mut builder = DataBuilder::new(config.clone());
    builder.open_element(ROOT_ELEMENT)?;

    let mut records = 0;
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ElementRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping line {}: {e}", line_num + 1);
                continue;
            }
        };
        if let Some(problem) = record.problem() {
            warn!("skipping line {}: {problem}", line_num + 1);
            continue;
        }
        builder.open_element(&record.name)?;
        for (name, value) in &record.attributes {
            builder.attribute(name, value)?;
        }
        builder.text(&record.text)?;
        builder.close_element()?;
        records += 1;
    }

    builder.close_element()?;
    let data = builder.finish()?;
    info!("loaded {records} records ({} nodes) from {}", data.len(), path.display());
    Ok((data, records))
}

/// Full-text query described by the search arguments.
pub fn search_expr(args: &SearchArgs) -> FtExpr {
    let mut options = FtOptions::new();
    if let Some(case) = args.case {
        options = options.with_case(case.into());
    }
    if args.diacritics_sensitive {
        options = options.with_diacritics_sensitive(true);
    }
    if args.stemming {
        options = options.with_stemming(true);
    }
    if args.wildcards {
        options = options.with_wildcards(true);
    }
    if let Some(language) = &args.language {
        options = options.with_language(language.as_str());
    }
    if args.ordered {
        options = options.with_ordered(true);
    }
    if let Some(window) = args.window {
        options = options.with_window(window);
    }
    if args.min_distance.is_some() || args.max_distance.is_some() {
        options = options.with_distance(
            args.min_distance.unwrap_or(0),
            args.max_distance.unwrap_or(u32::MAX),
        );
    }

    let position = if args.at_start {
        PositionFilter::Start
    } else if args.at_end {
        PositionFilter::End
    } else {
        PositionFilter::Any
    };
    FtExpr::words(args.query.as_str(), args.mode.into())
        .with_options(options)
        .with_position(position)
}

/// Run `expr` and collect at most `limit` hits.
fn run_query(expr: Expr, data: &Data, config: EngineConfig, limit: usize) -> Result<SearchResults> {
    let start_time = Instant::now();
    let mut query = QueryProcessor::new(expr, config);
    let plan = query.compile(data)?;
    debug!("plan: {plan}");

    let ids: Vec<NodeId> = Ids::new(query.nodes(data)?).collect();
    let hits = ids.iter().take(limit).map(|&id| hit(data, id)).collect();

    Ok(SearchResults {
        plan,
        hits,
        total_hits: ids.len() as u64,
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}

fn hit(data: &Data, id: NodeId) -> Hit {
    let owner = data.parent(id).unwrap_or(id);
    let attribute = match data.kind(id) {
        Some(NodeKind::Attribute) => data.name(id).map(str::to_string),
        _ => None,
    };
    let attributes = data
        .attributes(owner)
        .filter_map(|attr| Some((data.name(attr)?.to_string(), data.string_value(attr))))
        .collect();
    Hit {
        id,
        element: data.name(owner).unwrap_or_default().to_string(),
        attribute,
        attributes,
        value: data.string_value(id),
    }
}

/// Full-text search over the text of every record.
fn search(args: &SearchArgs, config: EngineConfig, cli_args: &GlaiveArgs) -> Result<()> {
    let (data, _) = load_records(&args.input, &config.index)?;
    let expr = Expr::filter(Expr::text(), Expr::contains(Expr::context(), search_expr(args)));
    let results = run_query(expr, &data, config, args.limit)?;
    output_result("Search results", &results, cli_args)
}

/// Exact value lookup.
fn lookup(args: &LookupArgs, config: EngineConfig, cli_args: &GlaiveArgs) -> Result<()> {
    let (data, _) = load_records(&args.input, &config.index)?;
    let step = match args.kind() {
        ValueKind::Text => NodeTest::Text,
        ValueKind::Attribute => NodeTest::Attribute(args.attribute_name().map(str::to_string)),
    };
    let expr = Expr::filter(
        Expr::Step(step),
        Expr::general(CmpOp::Eq, Expr::context(), Expr::str(args.value.as_str())),
    );
    let results = run_query(expr, &data, config, args.limit)?;
    output_result("Lookup results", &results, cli_args)
}

/// Index statistics.
fn show_stats(args: &StatsArgs, config: EngineConfig, cli_args: &GlaiveArgs) -> Result<()> {
    let (data, records) = load_records(&args.input, &config.index)?;
    let stats = StatsResult {
        records,
        nodes: data.len(),
        indexes: data.index_stats(),
    };
    output_result("Index statistics", &stats, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn records_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "book", "attributes": {{"id": "b1"}}, "text": "The Quick Brown Fox"}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"name": "", "text": "nameless"}}"#).unwrap();
        writeln!(file, r#"{{"name": "book", "attributes": {{"": "x"}}, "text": "keyless"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"name": "book", "attributes": {{"id": "b2", "lang": "en"}}, "text": "a lazy dog"}}"#).unwrap();
        file
    }

    #[test]
    fn test_load_records() {
        let file = records_file();
        let (data, records) = load_records(file.path(), &IndexConfig::default()).unwrap();
        assert_eq!(records, 2);
        // document, records, book, @id, text, book, @id, @lang, text
        assert_eq!(data.len(), 9);
        assert_eq!(data.name(1), Some(ROOT_ELEMENT));
        assert_eq!(data.string_value(4), "The Quick Brown Fox");
    }

    #[test]
    fn test_search_uses_fulltext_index() {
        let file = records_file();
        let (data, _) = load_records(file.path(), &IndexConfig::default()).unwrap();
        let args = GlaiveArgs::try_parse_from([
            "glaive",
            "search",
            "unused",
            "quick fox",
            "--mode",
            "all",
        ])
        .unwrap();
        let Command::Search(search_args) = args.command else {
            panic!("Expected Search command");
        };
        let expr = Expr::filter(Expr::text(), Expr::contains(Expr::context(), search_expr(&search_args)));
        let results = run_query(expr, &data, EngineConfig::default(), 10).unwrap();
        assert!(results.plan.starts_with("fulltext-index("), "{}", results.plan);
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.hits[0].element, "book");
        assert_eq!(results.hits[0].value, "The Quick Brown Fox");
        assert_eq!(results.hits[0].attributes.get("id").map(String::as_str), Some("b1"));
    }

    #[test]
    fn test_attribute_lookup() {
        let file = records_file();
        let (data, _) = load_records(file.path(), &IndexConfig::default()).unwrap();
        let expr = Expr::filter(
            Expr::attributes(Some("id")),
            Expr::general(CmpOp::Eq, Expr::context(), Expr::str("b2")),
        );
        let results = run_query(expr, &data, EngineConfig::default(), 10).unwrap();
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.hits[0].attribute.as_deref(), Some("id"));
        assert_eq!(results.hits[0].id, 6);
    }

    #[test]
    fn test_limit_keeps_total() {
        let file = records_file();
        let (data, _) = load_records(file.path(), &IndexConfig::default()).unwrap();
        let results = run_query(Expr::text(), &data, EngineConfig::default(), 1).unwrap();
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.total_hits, 2);
    }
}
