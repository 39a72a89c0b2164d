#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-firefighter activation: follow a plan while action points last, fall
//! back to local actions when there is none.

mod decision;

use std::collections::BTreeMap;

use ember_rescue_core::{
    CellCoord, Command, Direction, DoorState, Event, FirefighterId, PoiKind, Rules, Segment,
    SimRng,
};
use ember_rescue_system_pathfinding::{clearing_needed, Clearing, GoalKind, PathPlanner, Plan};
use ember_rescue_system_poi_deck::PoiDeck;
use ember_rescue_world::{
    self as world,
    query::{self, FirefighterSnapshot},
    World,
};

pub use decision::{DecisionSource, FirstLegal, LocalAction, RandomDecisions};

/// Upper bound on commands issued in one activation.
const MAX_ACTIONS_PER_ACTIVATION: usize = 64;

/// Drives firefighters through their activations.
#[derive(Debug)]
pub struct ActionResolver<D> {
    planner: PathPlanner,
    plans: BTreeMap<FirefighterId, Plan>,
    decisions: D,
}

enum Progress {
    Continue,
    Done,
}

impl<D: DecisionSource> ActionResolver<D> {
    /// Creates a resolver that consults `decisions` when no plan applies.
    #[must_use]
    pub fn new(rules: &Rules, decisions: D) -> Self {
        Self {
            planner: PathPlanner::new(rules.planner.clone()),
            plans: BTreeMap::new(),
            decisions,
        }
    }

    /// Cached plan of a firefighter, if one is held.
    #[must_use]
    pub fn plan(&self, firefighter: FirefighterId) -> Option<&Plan> {
        self.plans.get(&firefighter)
    }

    /// Teleports a firefighter onto its entry. This consumes its turn.
    pub fn enter(
        &mut self,
        world: &mut World,
        firefighter: FirefighterId,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) {
        let _ = self.issue(
            world,
            Command::EnterBuilding { firefighter },
            deck,
            rng,
            out_events,
        );
    }

    /// Spends the firefighter's action points until none remain or it passes.
    pub fn activate(
        &mut self,
        world: &mut World,
        firefighter: FirefighterId,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) {
        for _ in 0..MAX_ACTIONS_PER_ACTIVATION {
            let Some(me) = query::firefighter(world, firefighter) else {
                return;
            };
            if !me.entered {
                self.enter(world, firefighter, deck, rng, out_events);
                return;
            }
            if me.action_points == 0 {
                return;
            }

            let progress = match self.current_plan(world, &me) {
                Some(plan) => self.follow(world, &me, plan, deck, rng, out_events),
                None => self.improvise(world, &me, deck, rng, out_events),
            };
            if let Progress::Done = progress {
                return;
            }
        }
        tracing::warn!(firefighter = firefighter.get(), "activation cut short");
    }

    /// Takes the cached plan if it still holds, otherwise asks the planner for one.
    fn current_plan(&mut self, world: &World, me: &FirefighterSnapshot) -> Option<Plan> {
        if let Some(plan) = self.plans.remove(&me.id) {
            if plan_holds(world, me, &plan) {
                return Some(plan);
            }
            tracing::debug!(firefighter = me.id.get(), "dropping stale plan");
        }
        let plan = self.planner.plan_for(world, me)?;
        tracing::debug!(
            firefighter = me.id.get(),
            kind = ?plan.kind(),
            target = ?plan.target(),
            hops = plan.remaining().len(),
            "new plan"
        );
        Some(plan)
    }

    fn follow(
        &mut self,
        world: &mut World,
        me: &FirefighterSnapshot,
        mut plan: Plan,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) -> Progress {
        let rules = query::rules(world).clone();
        let step = plan
            .next_hop()
            .and_then(|hop| Some((hop, me.cell.direction_to(hop.cell)?)));
        let Some((hop, direction)) = step else {
            return self.improvise(world, me, deck, rng, out_events);
        };

        let clearing = clearing_needed(world, me.cell, direction);
        let (command, cost) = match clearing {
            None => return self.improvise(world, me, deck, rng, out_events),
            Some(Clearing::OpenDoor) => (
                Command::ToggleDoor {
                    firefighter: me.id,
                    direction,
                },
                rules.toggle_door_cost,
            ),
            Some(Clearing::CutWall) => (
                Command::CutWall {
                    firefighter: me.id,
                    direction,
                },
                rules.cut_wall_cost,
            ),
            Some(Clearing::None) if plan.kind() == GoalKind::Fire && hop.cell == plan.target() => {
                if me.action_points >= rules.extinguish_cost {
                    (
                        Command::ExtinguishFire {
                            firefighter: me.id,
                            cell: hop.cell,
                        },
                        rules.extinguish_cost,
                    )
                } else {
                    (
                        Command::ReduceFire {
                            firefighter: me.id,
                            cell: hop.cell,
                        },
                        rules.reduce_fire_cost,
                    )
                }
            }
            Some(Clearing::None) => {
                let cost = if me.carrying || query::has_fire(world, hop.cell) {
                    rules.heavy_move_cost
                } else {
                    rules.move_cost
                };
                (
                    Command::MoveFirefighter {
                        firefighter: me.id,
                        direction,
                    },
                    cost,
                )
            }
        };

        if me.action_points < cost {
            let _ = self.plans.insert(me.id, plan);
            return self.pass(world, me.id, deck, rng, out_events);
        }

        let is_move = matches!(command, Command::MoveFirefighter { .. });
        let is_treatment = matches!(
            command,
            Command::ExtinguishFire { .. } | Command::ReduceFire { .. }
        );
        if !self.issue(world, command, deck, rng, out_events) {
            return self.pass(world, me.id, deck, rng, out_events);
        }
        if is_move {
            plan.advance();
        }
        if !is_treatment {
            let _ = self.plans.insert(me.id, plan);
        }
        Progress::Continue
    }

    fn improvise(
        &mut self,
        world: &mut World,
        me: &FirefighterSnapshot,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) -> Progress {
        let options = local_actions(world, me);
        let index = self.decisions.choose(me, &options, rng);
        let action = options.get(index).copied().unwrap_or(LocalAction::Pass);
        tracing::debug!(firefighter = me.id.get(), ?action, "local action");

        let firefighter = me.id;
        let command = match action {
            LocalAction::Extinguish(cell) => Command::ExtinguishFire { firefighter, cell },
            LocalAction::ReduceFire(cell) => Command::ReduceFire { firefighter, cell },
            LocalAction::ClearSmoke(cell) => Command::ClearSmoke { firefighter, cell },
            LocalAction::ToggleDoor(direction) => Command::ToggleDoor {
                firefighter,
                direction,
            },
            LocalAction::CutWall(direction) => Command::CutWall {
                firefighter,
                direction,
            },
            LocalAction::Move(direction) => Command::MoveFirefighter {
                firefighter,
                direction,
            },
            LocalAction::Pass => return self.pass(world, firefighter, deck, rng, out_events),
        };

        if self.issue(world, command, deck, rng, out_events) {
            Progress::Continue
        } else {
            self.pass(world, firefighter, deck, rng, out_events)
        }
    }

    fn pass(
        &mut self,
        world: &mut World,
        firefighter: FirefighterId,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) -> Progress {
        let _ = self.issue(world, Command::PassTurn { firefighter }, deck, rng, out_events);
        Progress::Done
    }

    /// Applies a command and tops the board up when it resolved a token.
    ///
    /// Returns `false` when the world rejected the command.
    fn issue(
        &mut self,
        world: &mut World,
        command: Command,
        deck: &mut PoiDeck,
        rng: &mut SimRng,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let first = out_events.len();
        world::apply(world, command, out_events);

        let mut accepted = true;
        let mut resolved_token = false;
        for event in &out_events[first..] {
            match event {
                Event::ActionRejected { .. } => accepted = false,
                Event::FalseAlarmCleared { .. }
                | Event::VictimRescued { .. }
                | Event::VictimLost { .. } => resolved_token = true,
                _ => {}
            }
        }
        if resolved_token {
            let _ = deck.replenish(world, rng, out_events);
        }
        accepted
    }
}

/// A cached plan holds while its next hop is adjacent, nothing ahead burns
/// and its goal still makes sense.
fn plan_holds(world: &World, me: &FirefighterSnapshot, plan: &Plan) -> bool {
    let Some(hop) = plan.next_hop() else {
        return false;
    };
    if me.cell.direction_to(hop.cell).is_none() || plan.is_scorched(world) {
        return false;
    }
    match plan.kind() {
        GoalKind::Exit => me.carrying,
        GoalKind::Victim => {
            !me.carrying && query::poi(world, plan.target()) == Some(PoiKind::Victim)
        }
        GoalKind::Fire => !me.carrying && query::has_fire(world, plan.target()),
    }
}

/// Legal, affordable actions around the firefighter, ending with a pass.
#[must_use]
pub fn local_actions(world: &World, me: &FirefighterSnapshot) -> Vec<LocalAction> {
    let rules = query::rules(world);
    let ap = me.action_points;
    let mut options = Vec::new();

    let adjacent = Direction::ALL.into_iter().filter_map(|direction| {
        let next = query::neighbour(world, me.cell, direction)?;
        (query::is_interior(world, next) && query::is_passable(world, me.cell, direction))
            .then_some(next)
    });
    let cells: Vec<CellCoord> = std::iter::once(me.cell).chain(adjacent).collect();

    for &cell in &cells {
        if query::has_fire(world, cell) {
            if ap >= rules.extinguish_cost {
                options.push(LocalAction::Extinguish(cell));
            }
            if ap >= rules.reduce_fire_cost {
                options.push(LocalAction::ReduceFire(cell));
            }
        } else if query::has_smoke(world, cell) && ap >= rules.clear_smoke_cost {
            options.push(LocalAction::ClearSmoke(cell));
        }
    }

    for direction in Direction::ALL {
        let Some(segment) = Segment::of(me.cell, direction) else {
            continue;
        };
        let door = query::door_state(world, segment);
        if matches!(door, Some(DoorState::Open | DoorState::Closed)) && ap >= rules.toggle_door_cost
        {
            options.push(LocalAction::ToggleDoor(direction));
        }
        if query::has_intact_wall(world, me.cell, direction)
            && !query::is_perimeter_segment(world, segment)
            && ap >= rules.cut_wall_cost
        {
            options.push(LocalAction::CutWall(direction));
        }
    }

    for direction in Direction::ALL {
        let Some(next) = query::neighbour(world, me.cell, direction) else {
            continue;
        };
        if !query::is_walkable_edge(world, me.cell, next)
            || !query::is_passable(world, me.cell, direction)
        {
            continue;
        }
        let burning = query::has_fire(world, next);
        if me.carrying && burning {
            continue;
        }
        let cost = if me.carrying || burning {
            rules.heavy_move_cost
        } else {
            rules.move_cost
        };
        if ap >= cost {
            options.push(LocalAction::Move(direction));
        }
    }

    options.push(LocalAction::Pass);
    options
}
