use ember_rescue_core::{GameOutcome, Rules, Scenario};
use ember_rescue_system_actions::RandomDecisions;
use ember_rescue_world::query;

use crate::{RunResult, TurnOrchestrator};

/// Final counters of one seeded run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Zero-based position in the batch.
    pub id: u32,
    /// Seed of the shared random stream.
    pub seed: u64,
    /// How the run ended.
    pub result: RunResult,
    /// Turns played.
    pub turns: u32,
    /// Victims carried out.
    pub rescued: u32,
    /// Victims lost.
    pub lost: u32,
    /// Structural damage.
    pub damage: u32,
}

/// Aggregate over a batch of runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchSummary {
    /// Runs played.
    pub runs: u32,
    /// Runs that ended in victory.
    pub victories: u32,
    /// Share of victories, `0.0` for an empty batch.
    pub win_rate: f64,
    /// Mean number of turns played.
    pub mean_turns: f64,
}

impl BatchSummary {
    /// Summarises the provided reports.
    #[must_use]
    pub fn from_reports(reports: &[RunReport]) -> Self {
        let runs = u32::try_from(reports.len()).unwrap_or(u32::MAX);
        let victories = reports
            .iter()
            .filter(|report| report.result == RunResult::Finished(GameOutcome::Victory))
            .count();
        let victories = u32::try_from(victories).unwrap_or(u32::MAX);
        let total_turns: u64 = reports.iter().map(|report| u64::from(report.turns)).sum();

        let (win_rate, mean_turns) = if runs == 0 {
            (0.0, 0.0)
        } else {
            (
                f64::from(victories) / f64::from(runs),
                total_turns as f64 / f64::from(runs),
            )
        };
        Self {
            runs,
            victories,
            win_rate,
            mean_turns,
        }
    }
}

/// Plays `runs` independent runs seeded `first_seed`, `first_seed + 1`, ...
///
/// Every run uses random fallback decisions and stops after `max_turns`.
#[must_use]
pub fn run_batch(
    scenario: &Scenario,
    rules: &Rules,
    first_seed: u64,
    runs: u32,
    max_turns: u32,
) -> Vec<RunReport> {
    (0..runs)
        .map(|id| {
            let seed = first_seed.wrapping_add(u64::from(id));
            let mut orchestrator =
                TurnOrchestrator::new(scenario, rules.clone(), seed, RandomDecisions);
            let result = orchestrator.run_to_completion(max_turns);
            let world = orchestrator.world();
            let report = RunReport {
                id,
                seed,
                result,
                turns: query::turn(world),
                rescued: query::rescued(world),
                lost: query::lost(world),
                damage: query::damage(world),
            };
            tracing::info!(
                id,
                seed,
                result = ?report.result,
                turns = report.turns,
                rescued = report.rescued,
                lost = report.lost,
                damage = report.damage,
                "run complete"
            );
            report
        })
        .collect()
}
