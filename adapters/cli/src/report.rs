//! Plain-text and CSV rendering of run results.

use std::fmt::Write as _;

use ember_rescue_core::GameOutcome;
use ember_rescue_system_turn::{BatchSummary, RunReport, RunResult, TurnSummary};

const CSV_HEADER: &str = "id,seed,result,turns,rescued,lost,damage";

/// Short label for how a run ended.
pub(crate) fn result_label(result: RunResult) -> &'static str {
    match result {
        RunResult::Finished(GameOutcome::Victory) => "victory",
        RunResult::Finished(GameOutcome::DefeatVictimsLost) => "defeat_victims_lost",
        RunResult::Finished(GameOutcome::DefeatStructuralCollapse) => "defeat_collapse",
        RunResult::TurnLimit => "turn_limit",
    }
}

/// One status line per turn.
pub(crate) fn turn_line(summary: &TurnSummary) -> String {
    format!(
        "turn {:>3}  rescued {}  lost {}  damage {:>2}  active POIs {}  deck {:>2}  events {}",
        summary.turn,
        summary.rescued,
        summary.lost,
        summary.damage,
        summary.active_pois,
        summary.deck_remaining,
        summary.events.len(),
    )
}

/// Per-run rows with a header.
pub(crate) fn csv(reports: &[RunReport]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for report in reports {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            report.id,
            report.seed,
            result_label(report.result),
            report.turns,
            report.rescued,
            report.lost,
            report.damage,
        );
    }
    out
}

/// Aggregate line printed after a batch.
pub(crate) fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "runs {}  victories {}  win rate {:.1}%  mean turns {:.1}",
        summary.runs,
        summary.victories,
        summary.win_rate * 100.0,
        summary.mean_turns,
    )
}
