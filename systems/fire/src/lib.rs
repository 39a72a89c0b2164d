#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fire phase: one random ignition roll, a one-hop flashover pass and the
//! knockdown check that follows them.
//!
//! Explosions travel as rays. A ray breaks through live doors, takes one
//! point out of an intact interior wall and stops unless that point destroyed
//! it, ignites every cell it enters, and hands over to a shockwave when it
//! reaches a cell that was already burning. A shockwave passes burning cells
//! and ignites the first cell that is not, then stops.

use std::collections::BTreeSet;

use ember_rescue_core::{CellCoord, Command, Direction, DoorState, Event, FireCause, SimRng, Segment};
use ember_rescue_world::{self as world, query, World};
use rand::seq::SliceRandom;

/// Runs the whole fire phase for one turn.
pub fn advance(world: &mut World, rng: &mut SimRng, out_events: &mut Vec<Event>) {
    let _ = roll_ignition(world, rng, out_events);
    flashover(world, out_events);
    knock_down_burning(world, out_events);
}

/// Picks one interior cell uniformly and escalates it one step.
///
/// Clear cells gain smoke, smoky cells ignite and burning cells explode.
/// Returns the cell rolled, or `None` when the building has no interior.
pub fn roll_ignition(
    world: &mut World,
    rng: &mut SimRng,
    out_events: &mut Vec<Event>,
) -> Option<CellCoord> {
    let cells = query::interior_cells(world);
    let cell = *cells.choose(rng)?;
    tracing::debug!(?cell, "ignition roll");

    if query::has_fire(world, cell) {
        explode(world, cell, out_events);
    } else if query::has_smoke(world, cell) {
        world::apply(
            world,
            Command::Ignite {
                cell,
                cause: FireCause::Ignition,
            },
            out_events,
        );
    } else {
        world::apply(
            world,
            Command::PlaceSmoke {
                cell,
                cause: FireCause::Ignition,
            },
            out_events,
        );
    }
    Some(cell)
}

/// Detonates a burning cell in all four directions.
pub fn explode(world: &mut World, origin: CellCoord, out_events: &mut Vec<Event>) {
    tracing::info!(?origin, "explosion");
    out_events.push(Event::ExplosionTriggered { cell: origin });

    for direction in Direction::ALL {
        if let Some(segment) = Segment::of(origin, direction) {
            blast_door(world, segment, out_events);
        }
    }

    for direction in Direction::ALL {
        let mut current = origin;
        while let Some(next) = break_through(world, current, direction, out_events) {
            if query::has_fire(world, next) {
                shockwave(world, next, direction, out_events);
                break;
            }
            world::apply(
                world,
                Command::Ignite {
                    cell: next,
                    cause: FireCause::Explosion,
                },
                out_events,
            );
            current = next;
        }
    }
}

/// Carries an explosion on from a burning cell.
///
/// Passes through burning cells and ignites the first one that is not.
pub fn shockwave(
    world: &mut World,
    start: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    tracing::debug!(?start, ?direction, "shockwave");
    out_events.push(Event::ShockwaveTriggered {
        cell: start,
        direction,
    });

    let mut current = start;
    while let Some(next) = break_through(world, current, direction, out_events) {
        if query::has_fire(world, next) {
            current = next;
            continue;
        }
        world::apply(
            world,
            Command::Ignite {
                cell: next,
                cause: FireCause::Shockwave,
            },
            out_events,
        );
        break;
    }
}

/// Pushes a blast across the boundary on the `direction` side of `cell`.
///
/// Returns the interior cell on the far side when the blast gets through.
fn break_through(
    world: &mut World,
    cell: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Option<CellCoord> {
    let next = query::neighbour(world, cell, direction)?;
    let segment = Segment::of(cell, direction)?;

    blast_door(world, segment, out_events);
    if query::has_intact_wall(world, cell, direction) {
        if query::is_perimeter_segment(world, segment) {
            return None;
        }
        world::apply(world, Command::BlastWall { segment }, out_events);
        if query::has_intact_wall(world, cell, direction) {
            return None;
        }
    }

    query::is_interior(world, next).then_some(next)
}

fn blast_door(world: &mut World, segment: Segment, out_events: &mut Vec<Event>) {
    if matches!(
        query::door_state(world, segment),
        Some(DoorState::Open | DoorState::Closed)
    ) {
        world::apply(world, Command::BlastDoor { segment }, out_events);
    }
}

/// Spreads fire one hop from every cell that was burning when the pass began.
///
/// Smoke next to fire ignites and clear cells next to fire gain smoke. Walls
/// block the spread; doors do not.
pub fn flashover(world: &mut World, out_events: &mut Vec<Event>) {
    let mut new_fires = BTreeSet::new();
    let mut new_smokes = BTreeSet::new();

    for cell in query::fire_cells(world) {
        for direction in Direction::ALL {
            if !query::can_traverse(world, cell, direction) {
                continue;
            }
            let Some(next) = query::neighbour(world, cell, direction) else {
                continue;
            };
            if !query::is_interior(world, next) || query::has_fire(world, next) {
                continue;
            }
            if query::has_smoke(world, next) {
                let _ = new_fires.insert(next);
            } else {
                let _ = new_smokes.insert(next);
            }
        }
    }

    for cell in &new_fires {
        world::apply(
            world,
            Command::Ignite {
                cell: *cell,
                cause: FireCause::Flashover,
            },
            out_events,
        );
    }
    for cell in new_smokes.difference(&new_fires) {
        world::apply(
            world,
            Command::PlaceSmoke {
                cell: *cell,
                cause: FireCause::Flashover,
            },
            out_events,
        );
    }
}

/// Sends every firefighter standing in fire to the ambulance.
pub fn knock_down_burning(world: &mut World, out_events: &mut Vec<Event>) {
    let burning: Vec<_> = query::firefighters(world)
        .into_iter()
        .filter(|member| member.entered && query::has_fire(world, member.cell))
        .map(|member| member.id)
        .collect();

    for firefighter in burning {
        world::apply(world, Command::KnockDown { firefighter }, out_events);
    }
}
