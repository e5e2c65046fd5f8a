//! Command line argument parsing for the Glaive CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fulltext::{FtCase, WordsMode};
use crate::index::ValueKind;

/// Glaive - indexed queries over element records
#[derive(Parser, Debug, Clone)]
#[command(name = "glaive")]
#[command(about = "Indexed value and full-text queries over element records")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct GlaiveArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, env = "GLAIVE_CONFIG", value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl GlaiveArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Full-text search over the text of the records
    Search(SearchArgs),

    /// Exact lookup of a text or attribute value
    Lookup(LookupArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for full-text search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Records file (JSON Lines)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Search text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// How the query words must occur
    #[arg(short, long, default_value = "any")]
    pub mode: SearchMode,

    /// Case matching
    #[arg(long)]
    pub case: Option<CaseMode>,

    /// Match diacritics exactly
    #[arg(long)]
    pub diacritics_sensitive: bool,

    /// Match word stems
    #[arg(long)]
    pub stemming: bool,

    /// Treat `.` in query words as a wildcard
    #[arg(long)]
    pub wildcards: bool,

    /// Language used for stemming
    #[arg(long)]
    pub language: Option<String>,

    /// Query words must occur in query order
    #[arg(long)]
    pub ordered: bool,

    /// All matched words must lie within a window of this many words
    #[arg(long, value_name = "WORDS")]
    pub window: Option<u32>,

    /// Minimum number of words between matched words
    #[arg(long, value_name = "WORDS")]
    pub min_distance: Option<u32>,

    /// Maximum number of words between matched words
    #[arg(long, value_name = "WORDS")]
    pub max_distance: Option<u32>,

    /// Match must start at the first word
    #[arg(long, conflicts_with = "at_end")]
    pub at_start: bool,

    /// Match must end at the last word
    #[arg(long)]
    pub at_end: bool,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for value lookups
#[derive(Parser, Debug, Clone)]
pub struct LookupArgs {
    /// Records file (JSON Lines)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Value to look up
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Look up attribute values, optionally of one attribute only
    #[arg(short, long, value_name = "NAME", num_args = 0..=1, default_missing_value = "*")]
    pub attribute: Option<String>,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

impl LookupArgs {
    /// Which value index the lookup reads.
    pub fn kind(&self) -> ValueKind {
        match self.attribute {
            Some(_) => ValueKind::Attribute,
            None => ValueKind::Text,
        }
    }

    /// Attribute name restriction, if any.
    pub fn attribute_name(&self) -> Option<&str> {
        self.attribute.as_deref().filter(|name| *name != "*")
    }
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Records file (JSON Lines)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

/// Search modes
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Any query word
    Any,
    /// All query words
    All,
    /// The query words as a phrase
    Phrase,
}

impl From<SearchMode> for WordsMode {
    fn from(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Any => WordsMode::Any,
            SearchMode::All => WordsMode::All,
            SearchMode::Phrase => WordsMode::Phrase,
        }
    }
}

/// Case matching modes
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Insensitive,
    Sensitive,
    Lower,
    Upper,
}

impl From<CaseMode> for FtCase {
    fn from(mode: CaseMode) -> Self {
        match mode {
            CaseMode::Insensitive => FtCase::Insensitive,
            CaseMode::Sensitive => FtCase::Sensitive,
            CaseMode::Lower => FtCase::Lower,
            CaseMode::Upper => FtCase::Upper,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_search_command() {
        let args = GlaiveArgs::try_parse_from([
            "glaive",
            "search",
            "records.jsonl",
            "quick fox",
            "--mode",
            "phrase",
            "--case",
            "sensitive",
            "--window",
            "4",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.input, PathBuf::from("records.jsonl"));
            assert_eq!(search_args.query, "quick fox");
            assert!(matches!(search_args.mode, SearchMode::Phrase));
            assert!(matches!(search_args.case, Some(CaseMode::Sensitive)));
            assert_eq!(search_args.window, Some(4));
            assert_eq!(search_args.limit, 10);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_lookup_attribute_flag() {
        let args = GlaiveArgs::try_parse_from(["glaive", "lookup", "r.jsonl", "x"]).unwrap();
        let Command::Lookup(lookup) = args.command else {
            panic!("Expected Lookup command");
        };
        assert_eq!(lookup.kind(), ValueKind::Text);

        let args =
            GlaiveArgs::try_parse_from(["glaive", "lookup", "r.jsonl", "x", "--attribute", "id"]).unwrap();
        let Command::Lookup(lookup) = args.command else {
            panic!("Expected Lookup command");
        };
        assert_eq!(lookup.kind(), ValueKind::Attribute);
        assert_eq!(lookup.attribute_name(), Some("id"));

        let args = GlaiveArgs::try_parse_from(["glaive", "lookup", "r.jsonl", "x", "-a"]).unwrap();
        let Command::Lookup(lookup) = args.command else {
            panic!("Expected Lookup command");
        };
        assert_eq!(lookup.kind(), ValueKind::Attribute);
        assert_eq!(lookup.attribute_name(), None);
    }

    #[test]
    fn test_verbosity_levels() {
        let args = GlaiveArgs::try_parse_from(["glaive", "stats", "r.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = GlaiveArgs::try_parse_from(["glaive", "-vv", "stats", "r.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = GlaiveArgs::try_parse_from(["glaive", "--quiet", "stats", "r.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            GlaiveArgs::try_parse_from(["glaive", "--format", "json", "stats", "r.jsonl"]).unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }

    #[test]
    fn test_start_and_end_conflict() {
        let result = GlaiveArgs::try_parse_from([
            "glaive", "search", "r.jsonl", "q", "--at-start", "--at-end",
        ]);
        assert!(result.is_err());
    }
}
