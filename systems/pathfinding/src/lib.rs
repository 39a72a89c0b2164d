#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded A* planner that prices door opening and wall cutting into edges.
//!
//! Closed doors and intact interior walls are traversable at a surcharge so
//! the planner can route through them; the executor clears the obstacle
//! before stepping. Searches give up quietly when they exceed their node
//! budget, their wall-clock budget or the straight-line distance cutoff.

mod plan;

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap},
    time::{Duration, Instant},
};

use ember_rescue_core::{CellCoord, Direction, DoorState, PlannerRules, PoiKind, Segment};
use ember_rescue_world::{
    query::{self, FirefighterSnapshot},
    World,
};

pub use plan::{Clearing, GoalKind, Hop, Plan};

/// Options that shape a single search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SearchOptions {
    /// Penalise landing on fire and smoke.
    pub avoid_hazards: bool,
    /// Forbid landing on fire outright.
    pub carrying: bool,
    /// The goal is a fire cell to fight from the last hop.
    pub toward_fire: bool,
}

/// Why a search produced no route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchFailure {
    /// Start and goal are farther apart than the distance cutoff.
    TooFar,
    /// The explored-node budget ran out.
    NodeLimit,
    /// The wall-clock budget ran out.
    TimeLimit,
    /// Every reachable cell was explored without meeting the goal.
    Unreachable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CacheKey {
    start: CellCoord,
    goal: CellCoord,
    options: SearchOptions,
}

/// A* planner with a route cache.
#[derive(Clone, Debug)]
pub struct PathPlanner {
    rules: PlannerRules,
    cache: BTreeMap<CacheKey, Vec<Hop>>,
}

impl PathPlanner {
    /// Creates a planner with the provided budgets and edge prices.
    #[must_use]
    pub fn new(rules: PlannerRules) -> Self {
        Self {
            rules,
            cache: BTreeMap::new(),
        }
    }

    /// Number of routes currently cached.
    #[must_use]
    pub fn cached_routes(&self) -> usize {
        self.cache.len()
    }

    /// Picks a goal for the firefighter and plans a route to it.
    ///
    /// Carriers head for the nearest exits. Otherwise the nearest victims
    /// within the search radius are tried, then fire next to the firefighter,
    /// then any fire that can be reached.
    pub fn plan_for(&mut self, world: &World, firefighter: &FirefighterSnapshot) -> Option<Plan> {
        let start = firefighter.cell;

        if firefighter.carrying {
            let exits = nearest(start, query::entries(world).iter().copied(), |_| true);
            let options = SearchOptions {
                avoid_hazards: true,
                carrying: true,
                toward_fire: false,
            };
            return self.first_route(world, start, exits, self.rules.exit_candidates, options, GoalKind::Exit);
        }

        let radius = self.rules.victim_search_radius;
        let victims = nearest(
            start,
            query::pois(world)
                .into_iter()
                .filter(|(_, kind)| *kind == PoiKind::Victim)
                .map(|(cell, _)| cell),
            |cell| start.manhattan_distance(cell) < radius,
        );
        let options = SearchOptions {
            avoid_hazards: true,
            carrying: false,
            toward_fire: false,
        };
        if let Some(plan) = self.first_route(
            world,
            start,
            victims,
            self.rules.victim_candidates,
            options,
            GoalKind::Victim,
        ) {
            return Some(plan);
        }

        if let Some(plan) = adjacent_fire(world, start) {
            return Some(plan);
        }

        let fires = nearest(start, query::fire_cells(world).into_iter(), |_| true);
        let options = SearchOptions {
            avoid_hazards: false,
            carrying: false,
            toward_fire: true,
        };
        self.first_route(world, start, fires, usize::MAX, options, GoalKind::Fire)
    }

    fn first_route(
        &mut self,
        world: &World,
        start: CellCoord,
        goals: Vec<CellCoord>,
        limit: usize,
        options: SearchOptions,
        kind: GoalKind,
    ) -> Option<Plan> {
        goals.into_iter().take(limit).find_map(|goal| {
            self.find_path(world, start, goal, options)
                .ok()
                .map(|hops| Plan::new(kind, goal, hops))
        })
    }

    /// Plans a route from `start` to `goal`.
    ///
    /// Cached routes are reused until a cell along them catches fire. The
    /// goal cell is exempt only for fire-fighting searches; a carrier's
    /// route is dropped as soon as its exit burns.
    pub fn find_path(
        &mut self,
        world: &World,
        start: CellCoord,
        goal: CellCoord,
        options: SearchOptions,
    ) -> Result<Vec<Hop>, SearchFailure> {
        if start == goal {
            return Ok(Vec::new());
        }
        if start.manhattan_distance(goal) > self.rules.max_distance {
            return Err(SearchFailure::TooFar);
        }

        let key = CacheKey {
            start,
            goal,
            options,
        };
        if let Some(hops) = self.cache.get(&key) {
            let goal_exempt = options.toward_fire && !options.carrying;
            let scorched = hops.iter().any(|hop| {
                (hop.cell != goal || !goal_exempt) && query::has_fire(world, hop.cell)
            });
            if !scorched {
                return Ok(hops.clone());
            }
            let _ = self.cache.remove(&key);
        }

        let result = self.search(world, start, goal, options);
        match &result {
            Ok(hops) => {
                let _ = self.cache.insert(key, hops.clone());
            }
            Err(failure) => {
                tracing::debug!(?start, ?goal, ?failure, "no route");
            }
        }
        result
    }

    fn search(
        &self,
        world: &World,
        start: CellCoord,
        goal: CellCoord,
        options: SearchOptions,
    ) -> Result<Vec<Hop>, SearchFailure> {
        let started = Instant::now();
        let budget = Duration::from_millis(self.rules.time_budget_ms);

        let mut open = BinaryHeap::new();
        let mut came_from: BTreeMap<CellCoord, (CellCoord, Clearing)> = BTreeMap::new();
        let mut g_scores: BTreeMap<CellCoord, u32> = BTreeMap::new();
        let _ = g_scores.insert(start, 0);
        open.push(Reverse((start.manhattan_distance(goal), start)));

        let mut explored = 0;
        while let Some(Reverse((_, current))) = open.pop() {
            if current == goal {
                return Ok(reconstruct(&came_from, start, goal));
            }

            explored += 1;
            if explored > self.rules.max_nodes {
                return Err(SearchFailure::NodeLimit);
            }
            if self.rules.time_budget_ms > 0 && started.elapsed() > budget {
                return Err(SearchFailure::TimeLimit);
            }

            let current_g = g_scores.get(&current).copied().unwrap_or(u32::MAX);
            for direction in Direction::ALL {
                let Some((next, clearing, cost)) =
                    self.edge(world, current, direction, options)
                else {
                    continue;
                };
                let tentative = current_g.saturating_add(cost);
                if tentative < g_scores.get(&next).copied().unwrap_or(u32::MAX) {
                    let _ = came_from.insert(next, (current, clearing));
                    let _ = g_scores.insert(next, tentative);
                    open.push(Reverse((tentative + next.manhattan_distance(goal), next)));
                }
            }
        }

        Err(SearchFailure::Unreachable)
    }

    fn edge(
        &self,
        world: &World,
        from: CellCoord,
        direction: Direction,
        options: SearchOptions,
    ) -> Option<(CellCoord, Clearing, u32)> {
        let next = query::neighbour(world, from, direction)?;
        if !query::is_walkable_edge(world, from, next) {
            return None;
        }
        let burning = query::has_fire(world, next);
        if options.carrying && burning {
            return None;
        }

        let clearing = clearing_needed(world, from, direction)?;
        let mut cost = 1 + match clearing {
            Clearing::None => 0,
            Clearing::OpenDoor => self.rules.door_surcharge,
            Clearing::CutWall => self.rules.wall_surcharge,
        };
        if options.avoid_hazards {
            if burning {
                cost += self.rules.fire_penalty;
            } else if query::has_smoke(world, next) {
                cost += self.rules.smoke_penalty;
            }
        }
        Some((next, clearing, cost))
    }
}

/// Obstacle that must be cleared before crossing the `direction` side of `cell`.
///
/// Returns `None` when the boundary cannot be crossed at all.
#[must_use]
pub fn clearing_needed(world: &World, cell: CellCoord, direction: Direction) -> Option<Clearing> {
    if query::is_passable(world, cell, direction) {
        return Some(Clearing::None);
    }
    let segment = Segment::of(cell, direction)?;
    if query::door_state(world, segment) == Some(DoorState::Closed) {
        return Some(Clearing::OpenDoor);
    }
    if query::has_intact_wall(world, cell, direction) && !query::is_perimeter_segment(world, segment) {
        return Some(Clearing::CutWall);
    }
    None
}

/// Fire on any side of `start`, walls and doors notwithstanding; the hop
/// records what has to be cleared before the fire can be fought.
fn adjacent_fire(world: &World, start: CellCoord) -> Option<Plan> {
    Direction::ALL.into_iter().find_map(|direction| {
        let next = query::neighbour(world, start, direction)?;
        if !query::is_interior(world, next) || !query::has_fire(world, next) {
            return None;
        }
        let clearing = clearing_needed(world, start, direction)?;
        Some(Plan::new(
            GoalKind::Fire,
            next,
            vec![Hop {
                cell: next,
                clearing,
            }],
        ))
    })
}

fn nearest(
    origin: CellCoord,
    cells: impl Iterator<Item = CellCoord>,
    keep: impl Fn(CellCoord) -> bool,
) -> Vec<CellCoord> {
    let mut cells: Vec<CellCoord> = cells.filter(|cell| keep(*cell)).collect();
    cells.sort_by_key(|cell| (origin.manhattan_distance(*cell), *cell));
    cells
}

fn reconstruct(
    came_from: &BTreeMap<CellCoord, (CellCoord, Clearing)>,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<Hop> {
    let mut hops = Vec::new();
    let mut current = goal;
    while current != start {
        let Some(&(previous, clearing)) = came_from.get(&current) else {
            break;
        };
        hops.push(Hop {
            cell: current,
            clearing,
        });
        current = previous;
    }
    hops.reverse();
    hops
}
