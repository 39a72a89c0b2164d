#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Global turn sequencing for a rescue run.
//!
//! A turn runs in a fixed order: firefighters act, fire spreads and knocks
//! down anyone caught in it, the point-of-interest deck tops the board up,
//! action points are recovered and the end thresholds are checked. The first
//! turn is spent entering the building and has no fire phase.

mod batch;

use ember_rescue_core::{
    seeded_rng, Command, Event, FirefighterId, GameOutcome, Rules, Scenario, SimRng,
};
use ember_rescue_system_actions::{ActionResolver, DecisionSource};
use ember_rescue_system_fire as fire;
use ember_rescue_system_poi_deck::PoiDeck;
use ember_rescue_world::{self as world, query, World};
use rand::seq::SliceRandom;

pub use batch::{run_batch, BatchSummary, RunReport};

/// Snapshot of the counters after a completed turn, plus what happened in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnSummary {
    /// One-based number of the turn.
    pub turn: u32,
    /// Victims carried out so far.
    pub rescued: u32,
    /// Victims lost so far.
    pub lost: u32,
    /// Structural damage so far.
    pub damage: u32,
    /// Tokens on the board plus victims being carried.
    pub active_pois: u32,
    /// Tokens left in the deck.
    pub deck_remaining: usize,
    /// Events emitted during the turn, in order.
    pub events: Vec<Event>,
}

/// Result of asking for one more turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The turn was played.
    Advanced(TurnSummary),
    /// The run already ended; nothing changed.
    Refused(GameOutcome),
}

/// How a bounded run finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunResult {
    /// A terminal threshold was reached.
    Finished(GameOutcome),
    /// The turn cap was hit first.
    TurnLimit,
}

/// Owns a run: the world, the deck, the shared random stream and the resolver.
#[derive(Debug)]
pub struct TurnOrchestrator<D> {
    world: World,
    deck: PoiDeck,
    resolver: ActionResolver<D>,
    rng: SimRng,
}

impl<D: DecisionSource> TurnOrchestrator<D> {
    /// Sets up a run of `scenario` under `rules`, seeded with `seed`.
    #[must_use]
    pub fn new(scenario: &Scenario, rules: Rules, seed: u64, decisions: D) -> Self {
        let resolver = ActionResolver::new(&rules, decisions);
        Self {
            world: World::new(scenario, rules),
            deck: PoiDeck::new(),
            resolver,
            rng: seeded_rng(seed),
        }
    }

    /// Read-only view of the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current point-of-interest deck.
    #[must_use]
    pub fn deck(&self) -> &PoiDeck {
        &self.deck
    }

    /// Plays one global turn, or refuses if the run is over.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(outcome) = query::outcome(&self.world) {
            return StepOutcome::Refused(outcome);
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::AdvanceTurn, &mut events);
        let turn = query::turn(&self.world);

        let mut order: Vec<FirefighterId> = query::firefighters(&self.world)
            .iter()
            .map(|firefighter| firefighter.id)
            .collect();
        if turn == 1 {
            for id in order {
                self.resolver.enter(
                    &mut self.world,
                    id,
                    &mut self.deck,
                    &mut self.rng,
                    &mut events,
                );
            }
        } else {
            order.shuffle(&mut self.rng);
            for id in order {
                self.resolver.activate(
                    &mut self.world,
                    id,
                    &mut self.deck,
                    &mut self.rng,
                    &mut events,
                );
            }
            fire::advance(&mut self.world, &mut self.rng, &mut events);
        }

        let _ = self
            .deck
            .replenish(&mut self.world, &mut self.rng, &mut events);
        world::apply(&mut self.world, Command::RecoverActionPoints, &mut events);
        world::apply(&mut self.world, Command::CheckEndConditions, &mut events);

        let summary = TurnSummary {
            turn,
            rescued: query::rescued(&self.world),
            lost: query::lost(&self.world),
            damage: query::damage(&self.world),
            active_pois: query::active_poi_count(&self.world),
            deck_remaining: self.deck.remaining(),
            events,
        };
        tracing::debug!(
            turn,
            rescued = summary.rescued,
            lost = summary.lost,
            damage = summary.damage,
            active_pois = summary.active_pois,
            events = summary.events.len(),
            "turn complete"
        );
        StepOutcome::Advanced(summary)
    }

    /// Plays turns until the run ends or `max_turns` turns have been played.
    pub fn run_to_completion(&mut self, max_turns: u32) -> RunResult {
        while query::turn(&self.world) < max_turns {
            if let StepOutcome::Refused(outcome) = self.step() {
                return RunResult::Finished(outcome);
            }
        }
        match query::outcome(&self.world) {
            Some(outcome) => RunResult::Finished(outcome),
            None => RunResult::TurnLimit,
        }
    }
}
