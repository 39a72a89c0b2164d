#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Point-of-interest deck that keeps the board stocked with hidden tokens.

use ember_rescue_core::{CellCoord, Command, Event, PoiKind, SimRng};
use ember_rescue_world::{self as world, query, World};
use rand::seq::SliceRandom;

/// Shuffled backlog of victim and false-alarm tokens.
///
/// The deck is built lazily from the supply left after the scenario's
/// pre-placed tokens, the first time the board runs short.
#[derive(Clone, Debug, Default)]
pub struct PoiDeck {
    tokens: Option<Vec<PoiKind>>,
}

impl PoiDeck {
    /// Creates an uninitialised deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the deck has been built.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.tokens.is_some()
    }

    /// Tokens left in the deck, `0` before it is built.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.as_ref().map_or(0, Vec::len)
    }

    /// Remaining tokens of one kind.
    #[must_use]
    pub fn remaining_of(&self, kind: PoiKind) -> usize {
        self.tokens
            .as_ref()
            .map_or(0, |tokens| tokens.iter().filter(|token| **token == kind).count())
    }

    /// Tops the board back up to the active target.
    ///
    /// Tokens that find no legal cell go back into the deck, which is then
    /// reshuffled. A victim placed under a firefighter standing on an entry
    /// is rescued on the spot, so the active count is re-read after every
    /// placement. Returns the number of tokens placed.
    pub fn replenish(
        &mut self,
        world: &mut World,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        if query::is_over(world) {
            return 0;
        }
        let target = query::rules(world).active_poi_target;
        let active = query::active_poi_count(world);
        if active >= target {
            return 0;
        }

        let tokens = self.tokens.get_or_insert_with(|| build_deck(world, rng, out_events));
        let mut placed = 0;
        let mut misses_left = target - active;
        while misses_left > 0 && query::active_poi_count(world) < target {
            let Some(kind) = tokens.pop() else {
                tracing::debug!("point-of-interest deck exhausted");
                break;
            };
            out_events.push(Event::PoiDrawn { kind });

            match choose_cell(world, kind, rng) {
                Some(cell) => {
                    world::apply(world, Command::PlacePoi { cell, kind }, out_events);
                    placed += 1;
                }
                None => {
                    tracing::debug!(?kind, "no cell accepts token, returning it");
                    tokens.push(kind);
                    tokens.shuffle(rng);
                    out_events.push(Event::PoiReturned { kind });
                    misses_left -= 1;
                }
            }
        }
        placed
    }
}

fn build_deck(world: &World, rng: &mut SimRng, out_events: &mut Vec<Event>) -> Vec<PoiKind> {
    let rules = query::rules(world);
    let (placed_victims, placed_false_alarms) = query::initial_poi_counts(world);
    let victims = rules.victim_supply.saturating_sub(placed_victims);
    let false_alarms = rules.false_alarm_supply.saturating_sub(placed_false_alarms);

    let mut tokens: Vec<PoiKind> = std::iter::repeat(PoiKind::Victim)
        .take(victims as usize)
        .chain(std::iter::repeat(PoiKind::FalseAlarm).take(false_alarms as usize))
        .collect();
    tokens.shuffle(rng);

    tracing::debug!(victims, false_alarms, "point-of-interest deck built");
    out_events.push(Event::DeckInitialised {
        victims,
        false_alarms,
    });
    tokens
}

/// Random empty interior cell with at least one open side.
///
/// False alarms avoid cells where a firefighter stands.
fn choose_cell(world: &World, kind: PoiKind, rng: &mut SimRng) -> Option<CellCoord> {
    let mut candidates: Vec<CellCoord> = query::interior_cells(world)
        .into_iter()
        .filter(|cell| {
            query::cell(world, *cell).is_some_and(|view| view.poi.is_none() && !view.walls.is_sealed())
        })
        .collect();
    candidates.shuffle(rng);

    candidates.into_iter().find(|cell| {
        kind != PoiKind::FalseAlarm || query::firefighters_at(world, *cell).is_empty()
    })
}
