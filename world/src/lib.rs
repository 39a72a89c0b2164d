#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Ember Rescue.
//!
//! The world owns the grid, the mirrored wall and door state, the firefighter
//! roster and the run counters. It changes only through [`apply`], which
//! validates every [`Command`] and reports what happened as [`Event`] values.

mod crew;
mod grid;
mod structure;

use ember_rescue_core::{
    CellCoord, Command, Direction, DoorState, Event, FirefighterId, GameOutcome, LossCause,
    PoiKind, RejectionReason, Rules, Scenario, Segment,
};

use crate::{
    crew::{Crew, Firefighter},
    grid::{GridModel, Ignition},
    structure::{StructureState, WallHit},
};

/// Represents the authoritative Ember Rescue world state.
#[derive(Clone, Debug)]
pub struct World {
    rules: Rules,
    grid: GridModel,
    structure: StructureState,
    crew: Crew,
    entries: Vec<CellCoord>,
    ambulance: CellCoord,
    turn: u32,
    rescued: u32,
    lost: u32,
    damage: u32,
    outcome: Option<GameOutcome>,
    initial_victims: u32,
    initial_false_alarms: u32,
}

impl World {
    /// Builds the world from a perimeter-padded scenario.
    ///
    /// Malformed pieces (out-of-range POIs, fires or entries, doors between
    /// non-adjacent cells) are skipped with a warning.
    #[must_use]
    pub fn new(scenario: &Scenario, rules: Rules) -> Self {
        let expected = u64::from(scenario.columns) * u64::from(scenario.rows);
        if scenario.walls.len() as u64 != expected {
            tracing::warn!(
                expected,
                provided = scenario.walls.len(),
                "wall mask count does not match grid size"
            );
        }

        let mut grid = GridModel::new(scenario.columns, scenario.rows, &scenario.walls);
        let structure = StructureState::new(&mut grid, &scenario.doors);

        let mut initial_victims = 0;
        let mut initial_false_alarms = 0;
        for &(cell, kind) in &scenario.pois {
            if !grid.is_interior(cell) || grid.poi(cell).is_some() {
                tracing::warn!(?cell, ?kind, "skipping point of interest");
                continue;
            }
            grid.put_poi(cell, kind);
            match kind {
                PoiKind::Victim => initial_victims += 1,
                PoiKind::FalseAlarm => initial_false_alarms += 1,
            }
        }

        for &cell in &scenario.fires {
            if grid.is_interior(cell) {
                let _ = grid.ignite(cell);
            } else {
                tracing::warn!(?cell, "skipping fire outside the building");
            }
        }

        let entries: Vec<CellCoord> = scenario
            .entries
            .iter()
            .copied()
            .filter(|cell| {
                let interior = grid.is_interior(*cell);
                if !interior {
                    tracing::warn!(?cell, "skipping entry outside the building");
                }
                interior
            })
            .collect();

        let ambulance = scenario
            .ambulance
            .filter(|cell| grid.is_perimeter(*cell))
            .or_else(|| entries.first().map(|entry| crew::outside_of(&grid, *entry)))
            .unwrap_or_else(|| CellCoord::new(0, 0));

        let crew = Crew::assemble(
            &grid,
            &entries,
            rules.firefighters,
            rules.initial_action_points,
        );

        Self {
            rules,
            grid,
            structure,
            crew,
            entries,
            ambulance,
            turn: 0,
            rescued: 0,
            lost: 0,
            damage: 0,
            outcome: None,
            initial_victims,
            initial_false_alarms,
        }
    }

    fn is_entry(&self, cell: CellCoord) -> bool {
        self.entries.contains(&cell)
    }

    /// Firefighters walk between interior cells, or across the outer wall at an entry.
    fn is_walkable_edge(&self, from: CellCoord, to: CellCoord) -> bool {
        let inside = self.grid.is_interior(from) && self.grid.is_interior(to);
        let leaving = self.is_entry(from) && self.grid.is_perimeter(to);
        let arriving = self.grid.is_perimeter(from) && self.is_entry(to);
        inside || leaving || arriving
    }

    fn within_reach(&self, from: CellCoord, target: CellCoord) -> bool {
        from == target
            || from.direction_to(target).is_some_and(|direction| {
                self.grid.is_interior(target)
                    && self.structure.is_passable(&self.grid, from, direction)
            })
    }

    fn active_member(&self, id: FirefighterId) -> Result<&Firefighter, RejectionReason> {
        let member = self
            .crew
            .get(id)
            .ok_or(RejectionReason::UnknownFirefighter)?;
        if member.entered {
            Ok(member)
        } else {
            Err(RejectionReason::NotEntered)
        }
    }

    fn pay(&mut self, id: FirefighterId, amount: u32, out_events: &mut Vec<Event>) {
        if let Some(remaining) = self.crew.get_mut(id).and_then(|member| member.spend(amount)) {
            out_events.push(Event::ActionPointsSpent {
                firefighter: id,
                amount,
                remaining,
            });
        }
    }

    fn arrive(&mut self, id: FirefighterId, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.rescue_at_entry(id, cell, out_events);
        let Some(member) = self.crew.get_mut(id) else {
            return;
        };

        match self.grid.poi(cell) {
            Some(PoiKind::Victim) if !member.carrying => {
                let _ = self.grid.take_poi(cell);
                member.carrying = true;
                tracing::debug!(firefighter = id.get(), ?cell, "victim picked up");
                out_events.push(Event::VictimPickedUp {
                    firefighter: id,
                    cell,
                });
            }
            Some(PoiKind::FalseAlarm) => {
                let _ = self.grid.take_poi(cell);
                tracing::debug!(firefighter = id.get(), ?cell, "false alarm cleared");
                out_events.push(Event::FalseAlarmCleared {
                    firefighter: id,
                    cell,
                });
            }
            _ => return,
        }
        self.rescue_at_entry(id, cell, out_events);
    }

    /// A carrier standing on an entry hands the victim over.
    fn rescue_at_entry(&mut self, id: FirefighterId, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.is_entry(cell) {
            return;
        }
        let Some(member) = self.crew.get_mut(id).filter(|member| member.carrying) else {
            return;
        };
        member.carrying = false;
        self.rescued += 1;
        tracing::info!(firefighter = id.get(), ?cell, rescued = self.rescued, "victim rescued");
        out_events.push(Event::VictimRescued {
            firefighter: id,
            cell,
        });
    }

    fn lose_victim_to_fire(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.grid.poi(cell) == Some(PoiKind::Victim) {
            let _ = self.grid.take_poi(cell);
            self.lost += 1;
            tracing::info!(?cell, lost = self.lost, "victim lost to fire");
            out_events.push(Event::VictimLost {
                cell,
                cause: LossCause::Fire,
            });
        }
    }

    fn record_wall_hit(&mut self, segment: Segment, hit: WallHit, out_events: &mut Vec<Event>) {
        self.damage += 1;
        match hit {
            WallHit::Damaged(damage) => out_events.push(Event::WallDamaged { segment, damage }),
            WallHit::Destroyed => out_events.push(Event::WallDestroyed { segment }),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// A finished run ignores every command.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        tracing::debug!(?command, "ignoring command on a finished run");
        return;
    }

    let refusal = match command {
        Command::AdvanceTurn => {
            world.turn += 1;
            out_events.push(Event::TurnStarted { turn: world.turn });
            None
        }
        Command::EnterBuilding { firefighter } => {
            enter_building(world, firefighter, out_events).err().map(|r| (firefighter, r))
        }
        Command::MoveFirefighter {
            firefighter,
            direction,
        } => move_firefighter(world, firefighter, direction, out_events)
            .err()
            .map(|r| (firefighter, r)),
        Command::ToggleDoor {
            firefighter,
            direction,
        } => toggle_door(world, firefighter, direction, out_events)
            .err()
            .map(|r| (firefighter, r)),
        Command::CutWall {
            firefighter,
            direction,
        } => cut_wall(world, firefighter, direction, out_events)
            .err()
            .map(|r| (firefighter, r)),
        Command::ExtinguishFire { firefighter, cell } => {
            treat_cell(world, firefighter, cell, Treatment::Extinguish, out_events)
                .err()
                .map(|r| (firefighter, r))
        }
        Command::ReduceFire { firefighter, cell } => {
            treat_cell(world, firefighter, cell, Treatment::Reduce, out_events)
                .err()
                .map(|r| (firefighter, r))
        }
        Command::ClearSmoke { firefighter, cell } => {
            treat_cell(world, firefighter, cell, Treatment::ClearSmoke, out_events)
                .err()
                .map(|r| (firefighter, r))
        }
        Command::PassTurn { firefighter } => {
            if world.crew.get(firefighter).is_some() {
                out_events.push(Event::TurnPassed { firefighter });
                None
            } else {
                Some((firefighter, RejectionReason::UnknownFirefighter))
            }
        }
        Command::PlaceSmoke { cell, cause } => {
            if world.grid.is_interior(cell) && world.grid.place_smoke(cell) {
                out_events.push(Event::SmokePlaced { cell, cause });
            }
            None
        }
        Command::Ignite { cell, cause } => {
            if world.grid.is_interior(cell) {
                match world.grid.ignite(cell) {
                    Some(Ignition::FromSmoke) => {
                        out_events.push(Event::SmokeConverted { cell, cause });
                    }
                    Some(Ignition::FromClear) => {
                        out_events.push(Event::FireIgnited { cell, cause });
                    }
                    Some(Ignition::AlreadyBurning) | None => {}
                }
                world.lose_victim_to_fire(cell, out_events);
            }
            None
        }
        Command::BlastWall { segment } => {
            if let Some(hit) = world.structure.damage_wall(&mut world.grid, segment) {
                world.record_wall_hit(segment, hit, out_events);
            }
            None
        }
        Command::BlastDoor { segment } => {
            if world.structure.destroy_door(segment) {
                out_events.push(Event::DoorDestroyed { segment });
            }
            None
        }
        Command::KnockDown { firefighter } => {
            knock_down(world, firefighter, out_events);
            None
        }
        Command::PlacePoi { cell, kind } => {
            place_poi(world, cell, kind, out_events);
            None
        }
        Command::RecoverActionPoints => {
            let gain = world.rules.action_point_gain;
            let cap = world.rules.max_action_points;
            for member in world.crew.iter_mut() {
                member.action_points = member.action_points.saturating_add(gain).min(cap);
                out_events.push(Event::ActionPointsRecovered {
                    firefighter: member.id,
                    action_points: member.action_points,
                });
            }
            None
        }
        Command::CheckEndConditions => {
            world.outcome =
                GameOutcome::evaluate(world.rescued, world.lost, world.damage, &world.rules);
            if let Some(outcome) = world.outcome {
                tracing::info!(
                    ?outcome,
                    turn = world.turn,
                    rescued = world.rescued,
                    lost = world.lost,
                    damage = world.damage,
                    "run finished"
                );
                out_events.push(Event::SimulationEnded { outcome });
            }
            None
        }
    };

    if let Some((firefighter, reason)) = refusal {
        tracing::debug!(firefighter = firefighter.get(), ?reason, "command rejected");
        out_events.push(Event::ActionRejected {
            firefighter,
            reason,
        });
    }
}

fn enter_building(
    world: &mut World,
    id: FirefighterId,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let member = world
        .crew
        .get_mut(id)
        .ok_or(RejectionReason::UnknownFirefighter)?;
    if member.entered {
        return Err(RejectionReason::AlreadyEntered);
    }
    member.entered = true;
    member.cell = member.entry;
    let cell = member.entry;
    out_events.push(Event::FirefighterEntered {
        firefighter: id,
        cell,
    });
    world.arrive(id, cell, out_events);
    Ok(())
}

fn move_firefighter(
    world: &mut World,
    id: FirefighterId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let member = world.active_member(id)?;
    let (from, action_points, carrying) = (member.cell, member.action_points, member.carrying);
    let to = world
        .grid
        .neighbour(from, direction)
        .ok_or(RejectionReason::Blocked)?;
    if !world.is_walkable_edge(from, to)
        || !world.structure.is_passable(&world.grid, from, direction)
    {
        return Err(RejectionReason::Blocked);
    }

    let burning = world.grid.has_fire(to);
    if carrying && burning {
        return Err(RejectionReason::CarryingIntoFire);
    }
    let cost = if carrying || burning {
        world.rules.heavy_move_cost
    } else {
        world.rules.move_cost
    };
    if action_points < cost {
        return Err(RejectionReason::InsufficientActionPoints);
    }

    world.pay(id, cost, out_events);
    if let Some(member) = world.crew.get_mut(id) {
        member.cell = to;
    }
    out_events.push(Event::FirefighterMoved {
        firefighter: id,
        from,
        to,
    });
    world.arrive(id, to, out_events);
    Ok(())
}

fn toggle_door(
    world: &mut World,
    id: FirefighterId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let member = world.active_member(id)?;
    let action_points = member.action_points;
    let segment = Segment::of(member.cell, direction).ok_or(RejectionReason::NoDoor)?;
    match world.structure.door_state(segment) {
        Some(DoorState::Open | DoorState::Closed) => {}
        _ => return Err(RejectionReason::NoDoor),
    }
    let cost = world.rules.toggle_door_cost;
    if action_points < cost {
        return Err(RejectionReason::InsufficientActionPoints);
    }

    world.pay(id, cost, out_events);
    if let Some(state) = world.structure.toggle_door(segment) {
        tracing::debug!(firefighter = id.get(), ?segment, ?state, "door toggled");
        out_events.push(Event::DoorToggled { segment, state });
    }
    Ok(())
}

fn cut_wall(
    world: &mut World,
    id: FirefighterId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let member = world.active_member(id)?;
    let (cell, action_points) = (member.cell, member.action_points);
    if !StructureState::has_intact_wall(&world.grid, cell, direction) {
        return Err(RejectionReason::NoWall);
    }
    let segment = Segment::of(cell, direction).ok_or(RejectionReason::PerimeterWall)?;
    if StructureState::is_perimeter(&world.grid, segment) {
        return Err(RejectionReason::PerimeterWall);
    }
    let cost = world.rules.cut_wall_cost;
    if action_points < cost {
        return Err(RejectionReason::InsufficientActionPoints);
    }

    world.pay(id, cost, out_events);
    if let Some(hit) = world.structure.damage_wall(&mut world.grid, segment) {
        tracing::debug!(firefighter = id.get(), ?segment, ?hit, "wall cut");
        world.record_wall_hit(segment, hit, out_events);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
enum Treatment {
    Extinguish,
    Reduce,
    ClearSmoke,
}

fn treat_cell(
    world: &mut World,
    id: FirefighterId,
    target: CellCoord,
    treatment: Treatment,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let member = world.active_member(id)?;
    let (cell, action_points) = (member.cell, member.action_points);
    if !world.within_reach(cell, target) {
        return Err(RejectionReason::OutOfReach);
    }
    let (present, cost) = match treatment {
        Treatment::Extinguish => (world.grid.has_fire(target), world.rules.extinguish_cost),
        Treatment::Reduce => (world.grid.has_fire(target), world.rules.reduce_fire_cost),
        Treatment::ClearSmoke => (world.grid.has_smoke(target), world.rules.clear_smoke_cost),
    };
    if !present {
        return Err(RejectionReason::NothingToClear);
    }
    if action_points < cost {
        return Err(RejectionReason::InsufficientActionPoints);
    }

    world.pay(id, cost, out_events);
    tracing::debug!(firefighter = id.get(), ?target, ?treatment, "cell treated");
    match treatment {
        Treatment::Extinguish => {
            let _ = world.grid.extinguish(target);
            out_events.push(Event::FireExtinguished { cell: target });
        }
        Treatment::Reduce => {
            let _ = world.grid.reduce_fire(target);
            out_events.push(Event::FireReduced { cell: target });
        }
        Treatment::ClearSmoke => {
            let _ = world.grid.clear_smoke(target);
            out_events.push(Event::SmokeCleared { cell: target });
        }
    }
    Ok(())
}

fn knock_down(world: &mut World, id: FirefighterId, out_events: &mut Vec<Event>) {
    let ambulance = world.ambulance;
    let Some(member) = world.crew.get_mut(id) else {
        return;
    };
    let from = member.cell;
    if !member.entered || !world.grid.has_fire(from) {
        return;
    }

    member.cell = ambulance;
    member.action_points = 0;
    let dropped = std::mem::take(&mut member.carrying);
    tracing::info!(firefighter = id.get(), ?from, "firefighter knocked down");
    out_events.push(Event::FirefighterKnockedDown {
        firefighter: id,
        from,
        to: ambulance,
    });

    if dropped {
        world.lost += 1;
        tracing::info!(?from, lost = world.lost, "carried victim lost");
        out_events.push(Event::VictimLost {
            cell: from,
            cause: LossCause::Knockdown,
        });
    }
}

fn place_poi(world: &mut World, cell: CellCoord, kind: PoiKind, out_events: &mut Vec<Event>) {
    if !world.grid.is_interior(cell) || world.grid.poi(cell).is_some() {
        tracing::warn!(?cell, ?kind, "refusing point of interest placement");
        return;
    }

    if world.grid.extinguish(cell) {
        out_events.push(Event::FireExtinguished { cell });
    }
    if world.grid.clear_smoke(cell) {
        out_events.push(Event::SmokeCleared { cell });
    }
    world.grid.put_poi(cell, kind);
    out_events.push(Event::PoiPlaced { cell, kind });

    if kind == PoiKind::Victim {
        let carrier = world
            .crew
            .iter()
            .filter(|member| member.entered && member.cell == cell && !member.carrying)
            .map(|member| member.id)
            .min();
        if let Some(id) = carrier {
            world.arrive(id, cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use ember_rescue_core::{
        CellCoord, Direction, DoorState, FirefighterId, GameOutcome, PoiKind, Rules, Segment,
        WallMask,
    };

    use super::{StructureState, World};

    /// Read-only view of a single cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellView {
        /// Wall presence on each side.
        pub walls: WallMask,
        /// Whether the cell is burning.
        pub fire: bool,
        /// Whether the cell is smoky.
        pub smoke: bool,
        /// Point-of-interest token on the cell.
        pub poi: Option<PoiKind>,
    }

    /// Immutable representation of a firefighter's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FirefighterSnapshot {
        /// Identifier assigned to the firefighter.
        pub id: FirefighterId,
        /// Cell currently occupied.
        pub cell: CellCoord,
        /// Entry the firefighter was assigned at setup.
        pub entry: CellCoord,
        /// Action points available.
        pub action_points: u32,
        /// Whether a victim is being carried.
        pub carrying: bool,
        /// Whether the firefighter has entered the building.
        pub entered: bool,
    }

    /// Rules the world was built with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Grid dimensions as `(columns, rows)`, perimeter included.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Reports whether the cell lies inside the building.
    #[must_use]
    pub fn is_interior(world: &World, cell: CellCoord) -> bool {
        world.grid.is_interior(cell)
    }

    /// Reports whether the cell lies on the perimeter ring.
    #[must_use]
    pub fn is_perimeter(world: &World, cell: CellCoord) -> bool {
        world.grid.is_perimeter(cell)
    }

    /// Neighbouring cell inside the grid bounds.
    #[must_use]
    pub fn neighbour(world: &World, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        world.grid.neighbour(cell, direction)
    }

    /// Captures the contents of a cell.
    #[must_use]
    pub fn cell(world: &World, cell: CellCoord) -> Option<CellView> {
        world.grid.cell(cell).map(|state| CellView {
            walls: state.walls,
            fire: state.fire,
            smoke: state.smoke,
            poi: state.poi,
        })
    }

    /// Captures every cell in row-major order.
    #[must_use]
    pub fn cells(world: &World) -> Vec<(CellCoord, CellView)> {
        world
            .grid
            .iter()
            .map(|(cell, state)| {
                (
                    cell,
                    CellView {
                        walls: state.walls,
                        fire: state.fire,
                        smoke: state.smoke,
                        poi: state.poi,
                    },
                )
            })
            .collect()
    }

    /// Reports whether the cell is burning.
    #[must_use]
    pub fn has_fire(world: &World, cell: CellCoord) -> bool {
        world.grid.has_fire(cell)
    }

    /// Reports whether the cell is smoky.
    #[must_use]
    pub fn has_smoke(world: &World, cell: CellCoord) -> bool {
        world.grid.has_smoke(cell)
    }

    /// Point-of-interest token on the cell, if any.
    #[must_use]
    pub fn poi(world: &World, cell: CellCoord) -> Option<PoiKind> {
        world.grid.poi(cell)
    }

    /// Interior cells in row-major order.
    #[must_use]
    pub fn interior_cells(world: &World) -> Vec<CellCoord> {
        world.grid.interior_cells().collect()
    }

    /// Burning cells in row-major order.
    #[must_use]
    pub fn fire_cells(world: &World) -> Vec<CellCoord> {
        world
            .grid
            .iter()
            .filter(|(_, state)| state.fire)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Point-of-interest tokens on the board in row-major order.
    #[must_use]
    pub fn pois(world: &World) -> Vec<(CellCoord, PoiKind)> {
        world
            .grid
            .iter()
            .filter_map(|(cell, state)| state.poi.map(|kind| (cell, kind)))
            .collect()
    }

    /// Number of tokens on the board plus victims being carried.
    #[must_use]
    pub fn active_poi_count(world: &World) -> u32 {
        let on_board = world.grid.iter().filter(|(_, state)| state.poi.is_some()).count();
        let carried = world.crew.iter().filter(|member| member.carrying).count();
        u32::try_from(on_board + carried).unwrap_or(u32::MAX)
    }

    /// Number of victims currently being carried.
    #[must_use]
    pub fn carried_victims(world: &World) -> u32 {
        let carried = world.crew.iter().filter(|member| member.carrying).count();
        u32::try_from(carried).unwrap_or(u32::MAX)
    }

    /// Damage accumulated on a wall segment.
    #[must_use]
    pub fn wall_damage(world: &World, segment: Segment) -> u8 {
        world.structure.damage(segment)
    }

    /// Every segment that has taken damage, with its counter.
    #[must_use]
    pub fn damaged_walls(world: &World) -> Vec<(Segment, u8)> {
        world.structure.damaged_segments().collect()
    }

    /// Reports whether an intact wall stands on the side of a cell.
    #[must_use]
    pub fn has_intact_wall(world: &World, cell: CellCoord, direction: Direction) -> bool {
        StructureState::has_intact_wall(&world.grid, cell, direction)
    }

    /// State of the door on a segment, `None` when the segment never held one.
    #[must_use]
    pub fn door_state(world: &World, segment: Segment) -> Option<DoorState> {
        world.structure.door_state(segment)
    }

    /// Every door segment with its state.
    #[must_use]
    pub fn doors(world: &World) -> Vec<(Segment, DoorState)> {
        world
            .structure
            .door_segments()
            .filter_map(|segment| {
                world
                    .structure
                    .door_state(segment)
                    .map(|state| (segment, state))
            })
            .collect()
    }

    /// Wall-only traversal check used by fire spread.
    #[must_use]
    pub fn can_traverse(world: &World, cell: CellCoord, direction: Direction) -> bool {
        StructureState::can_traverse(&world.grid, cell, direction)
    }

    /// Movement check: no wall and no closed door.
    #[must_use]
    pub fn is_passable(world: &World, cell: CellCoord, direction: Direction) -> bool {
        world.structure.is_passable(&world.grid, cell, direction)
    }

    /// Reports whether the segment is load-bearing.
    #[must_use]
    pub fn is_perimeter_segment(world: &World, segment: Segment) -> bool {
        StructureState::is_perimeter(&world.grid, segment)
    }

    /// Reports whether a firefighter may step directly between two adjacent cells.
    #[must_use]
    pub fn is_walkable_edge(world: &World, from: CellCoord, to: CellCoord) -> bool {
        world.is_walkable_edge(from, to)
    }

    /// Entry cells in scenario order.
    #[must_use]
    pub fn entries(world: &World) -> &[CellCoord] {
        &world.entries
    }

    /// Reports whether the cell is an entry.
    #[must_use]
    pub fn is_entry(world: &World, cell: CellCoord) -> bool {
        world.is_entry(cell)
    }

    /// Safe cell that knocked-down firefighters are taken to.
    #[must_use]
    pub fn ambulance(world: &World) -> CellCoord {
        world.ambulance
    }

    /// Snapshots of every firefighter in identifier order.
    #[must_use]
    pub fn firefighters(world: &World) -> Vec<FirefighterSnapshot> {
        world.crew.iter().map(snapshot).collect()
    }

    /// Snapshot of one firefighter.
    #[must_use]
    pub fn firefighter(world: &World, id: FirefighterId) -> Option<FirefighterSnapshot> {
        world.crew.get(id).map(snapshot)
    }

    /// Identifiers of the entered firefighters standing on a cell.
    #[must_use]
    pub fn firefighters_at(world: &World, cell: CellCoord) -> Vec<FirefighterId> {
        world
            .crew
            .iter()
            .filter(|member| member.entered && member.cell == cell)
            .map(|member| member.id)
            .collect()
    }

    /// Current one-based turn number, `0` before the first turn.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Victims carried out so far.
    #[must_use]
    pub fn rescued(world: &World) -> u32 {
        world.rescued
    }

    /// Victims lost so far.
    #[must_use]
    pub fn lost(world: &World) -> u32 {
        world.lost
    }

    /// Cumulative structural damage.
    #[must_use]
    pub fn damage(world: &World) -> u32 {
        world.damage
    }

    /// Terminal result, once reached.
    #[must_use]
    pub fn outcome(world: &World) -> Option<GameOutcome> {
        world.outcome
    }

    /// Reports whether the run has ended.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.outcome.is_some()
    }

    /// Victims and false alarms pre-placed by the scenario.
    #[must_use]
    pub fn initial_poi_counts(world: &World) -> (u32, u32) {
        (world.initial_victims, world.initial_false_alarms)
    }

    fn snapshot(member: &super::Firefighter) -> FirefighterSnapshot {
        FirefighterSnapshot {
            id: member.id,
            cell: member.cell,
            entry: member.entry,
            action_points: member.action_points,
            carrying: member.carrying,
            entered: member.entered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_rescue_core::{FireCause, WallMask};

    // 5x4 padded grid: interior columns 1..=3, rows 1..=2; entry at (1,1).
    fn scenario() -> Scenario {
        Scenario {
            columns: 5,
            rows: 4,
            walls: vec![WallMask::OPEN; 20],
            doors: Vec::new(),
            pois: Vec::new(),
            fires: Vec::new(),
            entries: vec![CellCoord::new(1, 1)],
            ambulance: None,
        }
    }

    fn rules(firefighters: u32) -> Rules {
        Rules {
            firefighters,
            ..Rules::default()
        }
    }

    fn entered_world(scenario: &Scenario) -> World {
        let mut world = World::new(scenario, rules(1));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EnterBuilding {
                firefighter: FirefighterId::new(0),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn firefighters_start_outside_their_entry() {
        let world = World::new(&scenario(), rules(2));
        let crew = query::firefighters(&world);
        assert_eq!(crew.len(), 2);
        assert!(crew.iter().all(|member| member.cell == CellCoord::new(1, 0)));
        assert_eq!(query::ambulance(&world), CellCoord::new(1, 0));
    }

    #[test]
    fn move_before_entering_is_rejected() {
        let mut world = World::new(&scenario(), rules(1));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: FirefighterId::new(0),
                direction: Direction::South,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                firefighter: FirefighterId::new(0),
                reason: RejectionReason::NotEntered,
            }]
        );
    }

    #[test]
    fn carrying_into_fire_is_refused_and_costs_nothing() {
        let mut scenario = scenario();
        scenario.pois.push((CellCoord::new(2, 1), PoiKind::Victim));
        scenario.fires.push(CellCoord::new(3, 1));
        let mut world = entered_world(&scenario);
        let id = FirefighterId::new(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        assert!(query::firefighter(&world, id).is_some_and(|m| m.carrying));

        events.clear();
        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                firefighter: id,
                reason: RejectionReason::CarryingIntoFire,
            }]
        );
        assert_eq!(query::firefighter(&world, id).map(|m| m.action_points), Some(3));
    }

    #[test]
    fn carrying_back_to_entry_rescues() {
        let mut scenario = scenario();
        scenario.pois.push((CellCoord::new(2, 1), PoiKind::Victim));
        let mut world = entered_world(&scenario);
        let id = FirefighterId::new(0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        assert!(events.contains(&Event::VictimPickedUp {
            firefighter: id,
            cell: CellCoord::new(2, 1),
        }));

        events.clear();
        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::West,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::ActionPointsSpent {
                    firefighter: id,
                    amount: 2,
                    remaining: 1,
                },
                Event::FirefighterMoved {
                    firefighter: id,
                    from: CellCoord::new(2, 1),
                    to: CellCoord::new(1, 1),
                },
                Event::VictimRescued {
                    firefighter: id,
                    cell: CellCoord::new(1, 1),
                },
            ]
        );
        assert_eq!(query::rescued(&world), 1);
    }

    #[test]
    fn closed_door_blocks_until_opened() {
        let mut scenario = scenario();
        scenario.doors.push((CellCoord::new(1, 1), CellCoord::new(2, 1)));
        let mut world = entered_world(&scenario);
        let id = FirefighterId::new(0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::ActionRejected {
                firefighter: id,
                reason: RejectionReason::Blocked,
            })
        );

        apply(
            &mut world,
            Command::ToggleDoor {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        let segment = Segment::between(CellCoord::new(1, 1), CellCoord::new(2, 1)).expect("segment");
        assert_eq!(query::door_state(&world, segment), Some(DoorState::Open));
        assert!(query::is_passable(&world, CellCoord::new(2, 1), Direction::West));
    }

    #[test]
    fn perimeter_walls_cannot_be_cut() {
        let mut scenario = scenario();
        scenario.walls[6] = WallMask::OPEN.with(Direction::West);
        let mut world = entered_world(&scenario);
        let id = FirefighterId::new(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CutWall {
                firefighter: id,
                direction: Direction::West,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                firefighter: id,
                reason: RejectionReason::PerimeterWall,
            }]
        );
        assert_eq!(query::damage(&world), 0);
    }

    #[test]
    fn ignition_claims_victims() {
        let mut scenario = scenario();
        scenario.pois.push((CellCoord::new(3, 2), PoiKind::Victim));
        let mut world = World::new(&scenario, rules(1));
        let mut events = Vec::new();
        let cell = CellCoord::new(3, 2);

        apply(
            &mut world,
            Command::PlaceSmoke {
                cell,
                cause: FireCause::Flashover,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Ignite {
                cell,
                cause: FireCause::Flashover,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::SmokePlaced {
                    cell,
                    cause: FireCause::Flashover,
                },
                Event::SmokeConverted {
                    cell,
                    cause: FireCause::Flashover,
                },
                Event::VictimLost {
                    cell,
                    cause: LossCause::Fire,
                },
            ]
        );
        assert_eq!(query::lost(&world), 1);
        assert_eq!(query::poi(&world, cell), None);
    }

    #[test]
    fn knockdown_drops_carried_victim() {
        let mut scenario = scenario();
        scenario.pois.push((CellCoord::new(2, 1), PoiKind::Victim));
        let mut world = entered_world(&scenario);
        let id = FirefighterId::new(0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Ignite {
                cell: CellCoord::new(2, 1),
                cause: FireCause::Ignition,
            },
            &mut events,
        );
        apply(&mut world, Command::KnockDown { firefighter: id }, &mut events);

        let member = query::firefighter(&world, id).expect("firefighter");
        assert_eq!(member.cell, query::ambulance(&world));
        assert_eq!(member.action_points, 0);
        assert!(!member.carrying);
        assert_eq!(query::lost(&world), 1);
    }

    #[test]
    fn placed_victim_is_picked_up_by_waiting_firefighter() {
        let mut world = entered_world(&scenario());
        let id = FirefighterId::new(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MoveFirefighter {
                firefighter: id,
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlacePoi {
                cell: CellCoord::new(2, 1),
                kind: PoiKind::Victim,
            },
            &mut events,
        );
        assert!(query::firefighter(&world, id).is_some_and(|m| m.carrying));
        assert!(query::pois(&world).is_empty());
        assert_eq!(query::active_poi_count(&world), 1);
    }

    #[test]
    fn victim_found_on_entry_is_rescued_at_once() {
        let mut scenario = scenario();
        scenario.pois.push((CellCoord::new(1, 1), PoiKind::Victim));
        let world = entered_world(&scenario);
        assert_eq!(query::rescued(&world), 1);
        assert_eq!(query::carried_victims(&world), 0);
    }

    #[test]
    fn finished_run_ignores_commands() {
        let mut world = World::new(&scenario(), rules(1));
        world.rescued = world.rules.rescue_goal;
        let mut events = Vec::new();
        apply(&mut world, Command::CheckEndConditions, &mut events);
        assert_eq!(query::outcome(&world), Some(GameOutcome::Victory));

        events.clear();
        apply(&mut world, Command::AdvanceTurn, &mut events);
        apply(&mut world, Command::RecoverActionPoints, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::turn(&world), 0);
    }
}
