//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::cli::args::{GlaiveArgs, OutputFormat};
use crate::error::Result;
use crate::index::{IndexStats, NodeId};

/// A node returned by a search or lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Id of the matching node.
    pub id: NodeId,
    /// Name of the element owning the node.
    pub element: String,
    /// Name of the matching attribute, for attribute lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Attributes of the owning element.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    pub value: String,
}

impl Hit {
    /// The owning element as a start tag, `<name a="v">`.
    pub fn start_tag(&self) -> String {
        let mut tag = format!("<{}", self.element);
        for (name, value) in &self.attributes {
            tag.push_str(&format!(" {name}=\"{value}\""));
        }
        tag.push('>');
        tag
    }
}

/// Result structure for search and lookup operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResults {
    /// Plan the query was evaluated with.
    pub plan: String,
    pub hits: Vec<Hit>,
    pub total_hits: u64,
    pub duration_ms: u64,
}

/// Result structure for index statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResult {
    pub records: usize,
    pub nodes: usize,
    pub indexes: Vec<IndexStats>,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl HumanOutput for SearchResults {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Search Results:")?;
        writeln!(out, "═══════════════")?;
        for (i, hit) in self.hits.iter().enumerate() {
            writeln!(out)?;
            match &hit.attribute {
                Some(attribute) => writeln!(
                    out,
                    "Result {}: {} @{} (node {})",
                    i + 1,
                    hit.start_tag(),
                    attribute,
                    hit.id
                )?,
                None => writeln!(out, "Result {}: {} (node {})", i + 1, hit.start_tag(), hit.id)?,
            }
            writeln!(out, "  {}", hit.value)?;
        }
        writeln!(out)?;
        writeln!(out, "Total hits: {}", self.total_hits)?;
        writeln!(out, "Plan: {}", self.plan)?;
        writeln!(out, "Search time: {}ms", self.duration_ms)
    }
}

impl HumanOutput for StatsResult {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Index Statistics:")?;
        writeln!(out, "════════════════")?;
        writeln!(out, "Records: {}", self.records)?;
        writeln!(out, "Nodes: {}", self.nodes)?;
        for stats in &self.indexes {
            writeln!(out)?;
            writeln!(out, "Index: {}", stats.name)?;
            writeln!(out, "  Distinct keys: {}", stats.keys)?;
            writeln!(out, "  Postings: {}", stats.postings)?;
            writeln!(out, "  Capacity: {}", stats.capacity)?;
            writeln!(out, "  Rehashes: {}", stats.rehashes)?;
        }
        Ok(())
    }
}

/// Output a result to stdout in the requested format.
pub fn output_result<T: Serialize + HumanOutput>(message: &str, result: &T, args: &GlaiveArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Write a result to `out` in the requested format.
pub fn write_result<T: Serialize + HumanOutput>(
    out: &mut dyn Write,
    message: &str,
    result: &T,
    args: &GlaiveArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)?;
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn results() -> SearchResults {
        SearchResults {
            plan: "text-index(\"x\")".to_string(),
            hits: vec![Hit {
                id: 3,
                element: "entry".to_string(),
                attribute: None,
                attributes: BTreeMap::from([("id".to_string(), "e1".to_string())]),
                value: "x".to_string(),
            }],
            total_hits: 1,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_json_output() {
        let args = GlaiveArgs::try_parse_from(["glaive", "-f", "json", "stats", "r.jsonl"]).unwrap();
        let mut out = Vec::new();
        write_result(&mut out, "Search results", &results(), &args).unwrap();

        let parsed: SearchResults = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.hits, results().hits);
        assert_eq!(parsed.plan, "text-index(\"x\")");
    }

    #[test]
    fn test_human_output() {
        let args = GlaiveArgs::try_parse_from(["glaive", "stats", "r.jsonl"]).unwrap();
        let mut out = Vec::new();
        write_result(&mut out, "Search results", &results(), &args).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Result 1: <entry id=\"e1\"> (node 3)"));
        assert!(text.contains("Total hits: 1"));
        assert!(!text.contains("Search results"));
    }
}
