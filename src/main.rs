// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so --json output on stdout stays clean)
// 3. Normalize the two URLs and run the race
// 4. Print the path (or "No path found!") and how long it took
// 5. Exit with proper code (0 = path found, 1 = no path, 2 = error)
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - tuning knobs
mod error;    // src/error.rs - error types
mod race;     // src/race.rs - validate, resolve, search
mod search;   // src/search/ - the breadth-first search engine
mod wiki;     // src/wiki/ - Wikipedia link extraction, validation, redirects

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use race::{Race, RaceReport};
use search::{NodeId, SearchOutcome, SearchStats};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = a path was found
//   Ok(1) = no path
//   Ok(2) = the endpoints were rejected
//   Err = unexpected error
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let start = wiki::normalize(&cli.start).context("invalid --start URL")?;
    let end = wiki::normalize(&cli.end).context("invalid --end URL")?;
    let config = cli.search_config();
    tracing::debug!(?config, "search configuration");

    let race = Race::wikipedia(&config).context("failed to set up HTTP clients")?;

    if !cli.json {
        println!("🏁 Racing from {} to {}", start, end);
        println!("Processing...please wait");
    }

    let report = match race.run(&start, &end, cli.mode).await {
        Ok(report) => report,
        // A rejected race is a normal answer, not a crash
        Err(e) if e.is_validation() => {
            eprintln!("❌ {}", e);
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    };

    print_report(&report, cli.json)?;

    Ok(if report.outcome.path().is_some() { 0 } else { 1 })
}

// Uses RUST_LOG if set, otherwise picks a level from --verbose / --quiet
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// Shape of the --json output
#[derive(Serialize)]
struct JsonReport<'a> {
    start: &'a str,
    end: &'a str,
    mode: search::SearchMode,
    result: &'static str,
    path: Option<&'a [NodeId]>,
    stats: &'a SearchStats,
    elapsed_ms: u64,
}

fn print_report(report: &RaceReport, json: bool) -> Result<()> {
    if json {
        let output = JsonReport {
            start: &report.start,
            end: &report.end,
            mode: report.mode,
            result: result_label(&report.outcome),
            path: report.outcome.path(),
            stats: &report.stats,
            elapsed_ms: report.elapsed.as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &report.outcome {
        SearchOutcome::Found { path } => {
            println!("\n✅ Found a path with {} link(s):", path.len() - 1);
            for (step, page) in path.iter().enumerate() {
                println!("   {}. {}", step + 1, page);
            }
        }
        SearchOutcome::Exhausted => println!("\n❌ No path found!"),
        SearchOutcome::DepthLimited { depth } => {
            println!("\n❌ No path found within {} link(s)!", depth)
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages fetched: {}", report.stats.fetched);
    println!("   🔎 Pages discovered: {}", report.stats.discovered);
    println!("   ⚠️  Failed fetches: {}", report.stats.failed);
    println!("Execution Time: {}", format_elapsed(report.elapsed));

    Ok(())
}

fn result_label(outcome: &SearchOutcome) -> &'static str {
    match outcome {
        SearchOutcome::Found { .. } => "found",
        SearchOutcome::Exhausted => "no_path",
        SearchOutcome::DepthLimited { .. } => "depth_limited",
    }
}

// Formats a duration as "{minutes}m {seconds}s", e.g. "1m 5.250s"
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let minutes = (total / 60.0).floor();
    format!("{}m {:.3}s", minutes as u64, total - minutes * 60.0)
}
