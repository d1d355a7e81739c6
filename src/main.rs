use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lossim::analysis::percentile;
use lossim::config::{DEFAULT_CHUNK_SIZE, DEFAULT_ITERATIONS, DEFAULT_SEED, Scenario, SimulationConfig};
use lossim::report::{self, AnalysisResult};

/// Estimate annual loss exposure for a scenario by Monte Carlo simulation.
#[derive(Debug, Parser)]
#[command(name = "lossim", version)]
struct Cli {
    /// Scenario JSON file. Uses the built-in demo scenario when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Trials per run. More trials reduce sampling noise only.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Trials per RNG stream.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Run chunks on the current thread instead of the rayon pool.
    #[arg(long)]
    serial: bool,

    /// Write the result as JSON (NDJSON, one line per run, with --runs).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Repeat the analysis with seeds seed..seed+N (wrapping) and report the spread.
    #[arg(long)]
    runs: Option<u64>,

    /// Suppress the printed report.
    #[arg(long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match &cli.scenario {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
            let scenario: Scenario = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
            info!(path = %path.display(), events = scenario.risk_events.len(), "loaded scenario");
            scenario
        }
        None => Scenario::demo(),
    };

    let base_config = SimulationConfig {
        seed: cli.seed,
        iterations: cli.iterations,
        chunk_size: cli.chunk_size,
        parallel: !cli.serial,
    };

    let results: Vec<AnalysisResult> = match cli.runs {
        Some(n) => {
            use rayon::prelude::*;

            // Each run already spreads its chunks over the pool; the outer
            // loop only adds independent seeds.
            (0..n)
                .into_par_iter()
                .map(|i| {
                    report::analyse(&scenario, &base_config.for_run(i))
                })
                .collect::<lossim::Result<Vec<_>>>()?
        }
        None => vec![report::analyse(&scenario, &base_config)?],
    };

    if let Some(path) = &cli.output {
        let file = File::create(path)
            .map_err(|e| format!("cannot create {}: {e}", path.display()))?;
        let mut writer = BufWriter::new(file);
        if cli.runs.is_none() {
            serde_json::to_writer_pretty(&mut writer, &results[0])?;
            writeln!(writer)?;
        } else {
            for r in &results {
                serde_json::to_writer(&mut writer, r)?;
                writeln!(writer)?;
            }
        }
        writer.flush()?;
    }

    if !cli.quiet {
        match results.as_slice() {
            [] => {}
            [single] => print_result(single),
            many => print_seed_spread(many),
        }
    }
    Ok(())
}

fn print_result(r: &AnalysisResult) {
    let c = &r.components_analyzed;
    println!(
        "=== Loss exposure (seed {}, {} trials; {} events, {} assets, {} defenses) ===",
        r.seed, r.iterations, c.risk_events, c.business_assets, c.defense_systems
    );
    let rows = [
        ("Minimum", r.minimum_loss),
        ("P10", r.confidence_intervals.p10),
        ("P25", r.confidence_intervals.p25),
        ("P50 (median)", r.p50_median_impact),
        ("P75", r.confidence_intervals.p75),
        ("P90 (severe)", r.p90_severe_impact),
        ("P95 / VaR95", r.p95_impact),
        ("P99 (worst case)", r.p99_worst_case),
        ("Maximum", r.maximum_loss),
        ("CVaR95", r.conditional_var_95),
        ("Expected annual loss", r.expected_annual_loss),
        ("Standard deviation", r.standard_deviation),
    ];
    for (label, value) in rows {
        println!("  {label:<22} {value:>16.2}");
    }
    println!("\n=== Business metrics ===");
    println!("  {:<22} {:>16.2}", "Total defense cost", r.total_defense_cost);
    println!("  {:<22} {:>16.2}", "Total asset value", r.total_asset_value);
    println!("  {:<22} {:>15.1}%", "Security ROI", r.security_roi);
    println!("  {:<22} {:>16.1}", "Risk score (0-100)", r.risk_score);
}

/// Spread of the headline estimates across seeds: how much the answer moves
/// from sampling noise alone at this iteration count.
fn print_seed_spread(results: &[AnalysisResult]) {
    println!(
        "\n=== Seed spread (N={} runs, {} trials each) ===",
        results.len(),
        results.first().map(|r| r.iterations).unwrap_or(0)
    );
    println!(
        "{:<22} | {:>14} | {:>14} | {:>14} | {:>14}",
        "Metric", "min", "p50", "max", "max-min %"
    );
    println!("{}", "-".repeat(22 + 4 * 17));

    let metrics: [(&str, fn(&AnalysisResult) -> f64); 5] = [
        ("Expected annual loss", |r| r.expected_annual_loss),
        ("P50", |r| r.p50_median_impact),
        ("P90", |r| r.p90_severe_impact),
        ("CVaR95", |r| r.conditional_var_95),
        ("Risk score", |r| r.risk_score),
    ];
    for (label, extract) in metrics {
        let mut values: Vec<f64> = results.iter().map(extract).collect();
        values.sort_by(f64::total_cmp);
        let lo = values[0];
        let hi = values[values.len() - 1];
        let mid = percentile(&values, 0.5);
        let rel = if mid > 0.0 { (hi - lo) / mid * 100.0 } else { 0.0 };
        println!("{label:<22} | {lo:>14.2} | {mid:>14.2} | {hi:>14.2} | {rel:>13.2}%");
    }
}
