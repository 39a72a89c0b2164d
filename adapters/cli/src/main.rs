#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Ember Rescue runs headlessly.

mod report;
mod rules_file;
mod scenario_text;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_rescue_core::{Rules, Scenario};
use ember_rescue_system_actions::RandomDecisions;
use ember_rescue_system_turn::{run_batch, BatchSummary, RunResult, StepOutcome, TurnOrchestrator};
use ember_rescue_world::query;
use tracing_subscriber::EnvFilter;

/// Cooperative fire-rescue simulation.
#[derive(Parser, Debug)]
#[command(name = "ember-rescue", version)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Scenario text file; the reference building is used when omitted.
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,

    /// TOML file overriding the default rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Log per-action detail.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play one seeded run and print a line per turn.
    Run {
        /// Seed of the shared random stream.
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Turns played before the run is called off.
        #[arg(long, default_value_t = 50)]
        max_turns: u32,

        /// Print every event after its turn line.
        #[arg(long)]
        events: bool,
    },
    /// Play many seeded runs and report them as CSV.
    Batch {
        /// Number of runs.
        #[arg(long, default_value_t = 100)]
        runs: u32,

        /// Seed of the first run; later runs count up from it.
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Turns played before a run is called off.
        #[arg(long, default_value_t = 50)]
        max_turns: u32,

        /// Write the CSV to this file instead of stdout.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scenario = load_scenario(cli.scenario.as_deref())?;
    let rules = match cli.rules.as_deref() {
        Some(path) => rules_file::load(path)
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => Rules::default(),
    };

    match cli.mode {
        Mode::Run {
            seed,
            max_turns,
            events,
        } => play(&scenario, rules, seed, max_turns, events),
        Mode::Batch {
            runs,
            seed,
            max_turns,
            csv,
        } => batch(&scenario, &rules, seed, runs, max_turns, csv.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(scenario_text::parse(scenario_text::REFERENCE_SCENARIO)?);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario from {}", path.display()))?;
    scenario_text::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

fn play(scenario: &Scenario, rules: Rules, seed: u64, max_turns: u32, events: bool) -> Result<()> {
    let mut orchestrator = TurnOrchestrator::new(scenario, rules, seed, RandomDecisions);
    tracing::info!(seed, max_turns, "starting run");

    while query::turn(orchestrator.world()) < max_turns {
        let StepOutcome::Advanced(summary) = orchestrator.step() else {
            break;
        };
        println!("{}", report::turn_line(&summary));
        if events {
            for event in &summary.events {
                println!("    {event:?}");
            }
        }
    }

    let world = orchestrator.world();
    let result = match query::outcome(world) {
        Some(outcome) => RunResult::Finished(outcome),
        None => RunResult::TurnLimit,
    };
    println!(
        "result {}  turns {}  rescued {}  lost {}  damage {}",
        report::result_label(result),
        query::turn(world),
        query::rescued(world),
        query::lost(world),
        query::damage(world),
    );
    Ok(())
}

fn batch(
    scenario: &Scenario,
    rules: &Rules,
    seed: u64,
    runs: u32,
    max_turns: u32,
    csv_path: Option<&Path>,
) -> Result<()> {
    let reports = run_batch(scenario, rules, seed, runs, max_turns);
    let csv = report::csv(&reports);
    match csv_path {
        Some(path) => fs::write(path, &csv)
            .with_context(|| format!("writing batch results to {}", path.display()))?,
        None => print!("{csv}"),
    }
    eprintln!("{}", report::summary_line(&BatchSummary::from_reports(&reports)));
    Ok(())
}
