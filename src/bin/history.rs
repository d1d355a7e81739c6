//! Roll up a series of analysis results for one scenario.
//!
//! Reads NDJSON `AnalysisResult` records (as written by `lossim --runs N
//! --output FILE`, or collected from storage), oldest first, and prints the
//! averages plus whether the latest run moved risk and ROI up or down.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use lossim::report::{AnalysisResult, summarize_history};

#[derive(Debug, Parser)]
#[command(name = "history", version)]
struct Cli {
    /// NDJSON file of analysis results, oldest first.
    #[arg(default_value = "results.ndjson")]
    path: PathBuf,

    /// Print the summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let file = match File::open(&cli.path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: cannot open {}: {e}", cli.path.display());
            eprintln!("Run `lossim --runs N --output {}` first.", cli.path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut results: Vec<AnalysisResult> = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading line {}: {e}", line_no + 1);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AnalysisResult>(&line) {
            Ok(r) => results.push(r),
            Err(e) => {
                eprintln!("error: failed to deserialize line {}: {e}", line_no + 1);
                return ExitCode::FAILURE;
            }
        }
    }
    debug!(count = results.len(), "loaded analysis results");

    let Some(summary) = summarize_history(&results) else {
        warn!(path = %cli.path.display(), "no analysis results found");
        println!("No analysis results found.");
        return ExitCode::SUCCESS;
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let flag = |b: bool| if b { "yes" } else { "no" };
    println!("=== Analysis history ({} results) ===", summary.total_analyses);
    println!("  {:<26} {:>14.1}", "Latest risk score", summary.latest_risk_score);
    println!("  {:<26} {:>14.2}", "Latest expected loss", summary.latest_expected_loss);
    println!("\n--- Averages ---");
    println!("  {:<26} {:>14.2}", "Expected annual loss", summary.averages.expected_annual_loss);
    println!("  {:<26} {:>14.2}", "P90 severe impact", summary.averages.p90_severe_impact);
    println!("  {:<26} {:>13.1}%", "Security ROI", summary.averages.security_roi);
    println!("  {:<26} {:>14.1}", "Risk score", summary.averages.risk_score);
    println!("\n--- Trends (latest vs average) ---");
    println!("  {:<26} {:>14}", "Risk increasing", flag(summary.trends.risk_increasing));
    println!("  {:<26} {:>14}", "ROI improving", flag(summary.trends.roi_improving));
    ExitCode::SUCCESS
}
