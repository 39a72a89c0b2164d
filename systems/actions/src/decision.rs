use ember_rescue_core::{CellCoord, Direction, SimRng};
use ember_rescue_world::query::FirefighterSnapshot;
use rand::Rng;

/// Action a firefighter can take without a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalAction {
    /// Remove fire from the cell.
    Extinguish(CellCoord),
    /// Knock fire on the cell back to smoke.
    ReduceFire(CellCoord),
    /// Remove smoke from the cell.
    ClearSmoke(CellCoord),
    /// Open or close the door on that side.
    ToggleDoor(Direction),
    /// Swing the axe at the wall on that side.
    CutWall(Direction),
    /// Step one cell.
    Move(Direction),
    /// End the activation.
    Pass,
}

/// Chooses among the legal local actions when no plan applies.
///
/// `options` is never empty and always ends with [`LocalAction::Pass`].
/// Returning an out-of-range index passes.
pub trait DecisionSource {
    /// Picks the index of the action to take.
    fn choose(
        &mut self,
        firefighter: &FirefighterSnapshot,
        options: &[LocalAction],
        rng: &mut SimRng,
    ) -> usize;
}

/// Uniform choice drawn from the run's shared stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomDecisions;

impl DecisionSource for RandomDecisions {
    fn choose(
        &mut self,
        _firefighter: &FirefighterSnapshot,
        options: &[LocalAction],
        rng: &mut SimRng,
    ) -> usize {
        if options.is_empty() {
            return 0;
        }
        rng.gen_range(0..options.len())
    }
}

/// Always takes the first option, which makes activations fully scripted.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstLegal;

impl DecisionSource for FirstLegal {
    fn choose(
        &mut self,
        _firefighter: &FirefighterSnapshot,
        _options: &[LocalAction],
        _rng: &mut SimRng,
    ) -> usize {
        0
    }
}
