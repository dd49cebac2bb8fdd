//! Trackfuse synthetic-matching CLI
//!
//! Generates a deterministic synthetic event, runs the full matching
//! pipeline on it, and reports match purity against the truth pairing.

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use trackfuse_core::{MatchingConfig, MatchingRun};
use trackfuse_env::{ConstantFieldMap, HelixPropagator};
use trackfuse_sim::{physics_seed, EventOracle, MatchingReport, OracleConfig};

/// Deterministic matching driver for trackfuse
#[derive(Parser, Debug)]
#[command(name = "trackfuse-sim")]
#[command(about = "Run synthetic two-subsystem matching events", long_about = None)]
struct Args {
    /// Master seed for determinism
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of true particles per event
    #[arg(short, long, default_value = "20")]
    tracks: usize,

    /// Number of consecutive events to run
    #[arg(short, long, default_value = "1")]
    events: usize,

    /// Solenoid field strength (kGauss)
    #[arg(long, default_value = "-5.0", allow_hyphen_values = true)]
    bz: f64,

    /// Minimum purity for a run to pass
    #[arg(long, default_value = "0.9")]
    min_purity: f64,

    /// Write the last event's global tracks to this JSON file
    #[arg(short, long)]
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let oracle_config = OracleConfig {
        n_tracks: args.tracks,
        bz: args.bz,
        ..Default::default()
    };
    let matching_config = MatchingConfig {
        matching_plane_z: oracle_config.plane_z,
        ..Default::default()
    };

    let mut oracle = EventOracle::new(physics_seed(args.seed), oracle_config);
    let field = ConstantFieldMap::new(args.bz);
    let propagator = HelixPropagator;

    let mut reports: Vec<MatchingReport> = Vec::with_capacity(args.events);
    let mut failed = 0usize;

    for event_index in 0..args.events {
        let event = oracle.generate();
        let mut run = MatchingRun::new(matching_config.clone());

        if let Err(e) = run.run(&event.source, &propagator, &field) {
            error!("event {event_index} aborted: {e}");
            std::process::exit(1);
        }

        let report = MatchingReport::from_run(args.seed, &run, args.min_purity);
        if !args.json {
            if report.passed {
                info!(
                    "event {} | purity {:.3} ({}/{} correct, {} matched) | mean chi2 {:.2}",
                    event_index,
                    report.purity(),
                    report.correct,
                    report.n_seeds,
                    report.matched,
                    report.mean_chi2.unwrap_or(0.0),
                );
            } else {
                error!(
                    "event {} FAILED | purity {:.3} below {:.3}",
                    event_index,
                    report.purity(),
                    args.min_purity,
                );
            }
        }
        if !report.passed {
            failed += 1;
        }

        if event_index + 1 == args.events {
            if let Some(path) = &args.output {
                if let Err(e) = run.save_global(path) {
                    error!("failed to persist global tracks: {e}");
                    std::process::exit(1);
                }
            }
        }

        reports.push(report);
    }

    if args.json {
        let summary = serde_json::json!({
            "seed": args.seed,
            "events": reports.len(),
            "failed": failed,
            "reports": reports,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("report serialization")
        );
    } else if failed == 0 {
        info!("all {} event(s) passed", reports.len());
    } else {
        error!("{failed}/{} event(s) failed", reports.len());
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
