//! `glaive` binary: full-text search, value lookup and index statistics
//! over a JSON Lines records file.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use glaive::cli::args::GlaiveArgs;
use glaive::cli::commands::execute_command;

fn main() {
    let args = GlaiveArgs::parse();

    // Warnings cover skipped input lines and index fallbacks; debug shows
    // every rewrite and the final plan.
    let log_level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // GLAIVE_LOG takes env_logger filter syntax and overrides -v/-q.
    Builder::new()
        .filter_level(log_level)
        .parse_env("GLAIVE_LOG")
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
