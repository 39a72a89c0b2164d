use ember_rescue_core::{
    CellCoord, Command, Direction, FireCause, FirefighterId, PlannerRules, PoiKind, Rules,
    Scenario, WallMask,
};
use ember_rescue_system_pathfinding::{
    clearing_needed, Clearing, GoalKind, PathPlanner, SearchFailure, SearchOptions,
};
use ember_rescue_world::{self as world, query, World};

fn open_scenario(columns: u32, rows: u32) -> Scenario {
    Scenario {
        columns,
        rows,
        walls: vec![WallMask::OPEN; (columns * rows) as usize],
        doors: Vec::new(),
        pois: Vec::new(),
        fires: Vec::new(),
        entries: vec![CellCoord::new(1, 1)],
        ambulance: None,
    }
}

fn wall_column(scenario: &mut Scenario, column: u32) {
    for row in 1..scenario.rows - 1 {
        let index = (row * scenario.columns + column) as usize;
        scenario.walls[index] = scenario.walls[index].with(Direction::East);
    }
}

fn plain() -> SearchOptions {
    SearchOptions {
        avoid_hazards: false,
        carrying: false,
        toward_fire: false,
    }
}

fn planner() -> PathPlanner {
    PathPlanner::new(PlannerRules {
        time_budget_ms: 0,
        ..PlannerRules::default()
    })
}

fn entered(scenario: &Scenario) -> World {
    let mut world = World::new(
        scenario,
        Rules {
            firefighters: 1,
            ..Rules::default()
        },
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::EnterBuilding {
            firefighter: FirefighterId::new(0),
        },
        &mut events,
    );
    world
}

#[test]
fn straight_route_needs_no_clearing() {
    let world = World::new(&open_scenario(7, 5), Rules::default());
    let mut planner = planner();

    let hops = planner
        .find_path(&world, CellCoord::new(1, 2), CellCoord::new(4, 2), plain())
        .expect("route");

    assert_eq!(hops.len(), 3);
    assert_eq!(hops.last().map(|hop| hop.cell), Some(CellCoord::new(4, 2)));
    assert!(hops.iter().all(|hop| hop.clearing == Clearing::None));
}

#[test]
fn wall_is_priced_as_a_cut() {
    let mut scenario = open_scenario(5, 5);
    wall_column(&mut scenario, 1);
    let world = World::new(&scenario, Rules::default());
    let mut planner = planner();

    let hops = planner
        .find_path(&world, CellCoord::new(1, 2), CellCoord::new(2, 2), plain())
        .expect("route");

    assert_eq!(hops.len(), 1);
    assert_eq!(hops[0].clearing, Clearing::CutWall);
    assert_eq!(
        clearing_needed(&world, CellCoord::new(1, 2), Direction::East),
        Some(Clearing::CutWall)
    );
}

#[test]
fn closed_door_is_preferred_over_a_wall() {
    let mut scenario = open_scenario(5, 5);
    wall_column(&mut scenario, 1);
    scenario
        .doors
        .push((CellCoord::new(1, 1), CellCoord::new(2, 1)));
    let world = World::new(&scenario, Rules::default());
    let mut planner = planner();

    let hops = planner
        .find_path(&world, CellCoord::new(1, 1), CellCoord::new(2, 3), plain())
        .expect("route");

    assert_eq!(hops[0].cell, CellCoord::new(2, 1));
    assert_eq!(hops[0].clearing, Clearing::OpenDoor);
    assert!(hops[1..].iter().all(|hop| hop.clearing == Clearing::None));
}

#[test]
fn perimeter_is_closed_except_at_entries() {
    let mut scenario = open_scenario(5, 5);
    scenario.entries = vec![CellCoord::new(1, 1)];
    let world = World::new(&scenario, Rules::default());
    let mut planner = planner();

    let outside = CellCoord::new(1, 0);
    let hops = planner
        .find_path(&world, outside, CellCoord::new(3, 3), plain())
        .expect("route");
    assert_eq!(hops[0].cell, CellCoord::new(1, 1));

    assert_eq!(
        planner.find_path(&world, CellCoord::new(3, 0), CellCoord::new(3, 3), plain()),
        Err(SearchFailure::Unreachable)
    );
}

#[test]
fn carrying_refuses_fire_cells() {
    let mut scenario = open_scenario(5, 3);
    scenario.fires.push(CellCoord::new(2, 1));
    let world = World::new(&scenario, Rules::default());
    let mut planner = planner();
    let options = SearchOptions {
        avoid_hazards: true,
        carrying: true,
        toward_fire: false,
    };

    assert_eq!(
        planner.find_path(&world, CellCoord::new(1, 1), CellCoord::new(3, 1), options),
        Err(SearchFailure::Unreachable)
    );
    assert!(planner
        .find_path(&world, CellCoord::new(1, 1), CellCoord::new(3, 1), plain())
        .is_ok());
}

#[test]
fn hazards_are_detoured_when_avoided() {
    let mut scenario = open_scenario(6, 4);
    scenario.fires.push(CellCoord::new(2, 1));
    let world = World::new(&scenario, Rules::default());
    let mut planner = planner();
    let options = SearchOptions {
        avoid_hazards: true,
        carrying: false,
        toward_fire: false,
    };

    let hops = planner
        .find_path(&world, CellCoord::new(1, 1), CellCoord::new(3, 1), options)
        .expect("route");
    assert!(hops.iter().all(|hop| hop.cell != CellCoord::new(2, 1)));
}

#[test]
fn distant_goals_are_not_searched() {
    let world = World::new(&open_scenario(20, 20), Rules::default());
    let mut planner = planner();
    assert_eq!(
        planner.find_path(&world, CellCoord::new(1, 1), CellCoord::new(18, 18), plain()),
        Err(SearchFailure::TooFar)
    );
}

#[test]
fn node_budget_degrades_to_no_route() {
    let world = World::new(&open_scenario(12, 12), Rules::default());
    let mut planner = PathPlanner::new(PlannerRules {
        max_nodes: 2,
        time_budget_ms: 0,
        ..PlannerRules::default()
    });
    assert_eq!(
        planner.find_path(&world, CellCoord::new(1, 1), CellCoord::new(8, 8), plain()),
        Err(SearchFailure::NodeLimit)
    );
}

#[test]
fn cached_route_is_dropped_once_it_burns() {
    let mut world = World::new(&open_scenario(7, 3), Rules::default());
    let mut planner = planner();
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(5, 1);

    assert!(planner.find_path(&world, start, goal, plain()).is_ok());
    assert_eq!(planner.cached_routes(), 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Ignite {
            cell: CellCoord::new(3, 1),
            cause: FireCause::Ignition,
        },
        &mut events,
    );
    let carrying = SearchOptions {
        avoid_hazards: true,
        carrying: true,
        toward_fire: false,
    };
    assert!(planner.find_path(&world, start, goal, carrying).is_err());

    let replanned = planner.find_path(&world, start, goal, plain()).expect("route");
    assert_eq!(replanned.len(), 4);
}

#[test]
fn carrier_heads_for_nearest_exit() {
    let mut scenario = open_scenario(7, 5);
    scenario.entries = vec![CellCoord::new(1, 1), CellCoord::new(5, 3)];
    scenario.pois.push((CellCoord::new(2, 1), PoiKind::Victim));
    let mut world = entered(&scenario);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveFirefighter {
            firefighter: FirefighterId::new(0),
            direction: Direction::East,
        },
        &mut events,
    );
    let snapshot = query::firefighter(&world, FirefighterId::new(0)).expect("firefighter");
    assert!(snapshot.carrying);

    let mut planner = planner();
    let plan = planner.plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.kind(), GoalKind::Exit);
    assert_eq!(plan.target(), CellCoord::new(1, 1));
    assert_eq!(plan.remaining().len(), 1);
}

#[test]
fn empty_handed_firefighter_targets_victims_then_fire() {
    let mut scenario = open_scenario(7, 5);
    scenario.pois.push((CellCoord::new(4, 3), PoiKind::Victim));
    scenario.fires.push(CellCoord::new(2, 1));
    let world = entered(&scenario);
    let snapshot = query::firefighter(&world, FirefighterId::new(0)).expect("firefighter");
    let mut planner = planner();

    let plan = planner.plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.kind(), GoalKind::Victim);
    assert_eq!(plan.target(), CellCoord::new(4, 3));

    let scenario = {
        let mut scenario = open_scenario(7, 5);
        scenario.fires.push(CellCoord::new(2, 1));
        scenario
    };
    let world = entered(&scenario);
    let snapshot = query::firefighter(&world, FirefighterId::new(0)).expect("firefighter");
    let plan = planner.plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.kind(), GoalKind::Fire);
    assert_eq!(plan.target(), CellCoord::new(2, 1));
    assert_eq!(plan.remaining().len(), 1);
}

#[test]
fn burning_exit_invalidates_a_cached_carrying_route() {
    let mut world = World::new(&open_scenario(7, 4), Rules::default());
    let mut planner = planner();
    let carrying = SearchOptions {
        avoid_hazards: true,
        carrying: true,
        toward_fire: false,
    };
    let start = CellCoord::new(4, 2);
    let exit = CellCoord::new(1, 1);

    assert!(planner.find_path(&world, start, exit, carrying).is_ok());
    assert_eq!(planner.cached_routes(), 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Ignite {
            cell: exit,
            cause: FireCause::Ignition,
        },
        &mut events,
    );

    assert_eq!(
        planner.find_path(&world, start, exit, carrying),
        Err(SearchFailure::Unreachable)
    );
    assert_eq!(planner.cached_routes(), 0);
}

#[test]
fn carrier_skips_a_burning_exit_for_the_next_nearest() {
    let mut scenario = open_scenario(7, 5);
    scenario.entries = vec![CellCoord::new(1, 1), CellCoord::new(5, 3)];
    scenario.pois.push((CellCoord::new(2, 1), PoiKind::Victim));
    let mut world = entered(&scenario);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveFirefighter {
            firefighter: FirefighterId::new(0),
            direction: Direction::East,
        },
        &mut events,
    );
    let snapshot = query::firefighter(&world, FirefighterId::new(0)).expect("firefighter");
    let mut planner = planner();
    let plan = planner.plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.target(), CellCoord::new(1, 1));

    world::apply(
        &mut world,
        Command::Ignite {
            cell: CellCoord::new(1, 1),
            cause: FireCause::Ignition,
        },
        &mut events,
    );

    let plan = planner.plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.kind(), GoalKind::Exit);
    assert_eq!(plan.target(), CellCoord::new(5, 3));
}

#[test]
fn fire_behind_a_closed_door_counts_as_adjacent() {
    let mut scenario = open_scenario(7, 5);
    wall_column(&mut scenario, 1);
    scenario
        .doors
        .push((CellCoord::new(1, 1), CellCoord::new(2, 1)));
    scenario.fires.push(CellCoord::new(2, 1));
    let world = entered(&scenario);
    let snapshot = query::firefighter(&world, FirefighterId::new(0)).expect("firefighter");
    assert_eq!(snapshot.cell, CellCoord::new(1, 1));

    let plan = planner().plan_for(&world, &snapshot).expect("plan");
    assert_eq!(plan.kind(), GoalKind::Fire);
    assert_eq!(plan.target(), CellCoord::new(2, 1));
    assert_eq!(plan.remaining().len(), 1);
    assert_eq!(plan.remaining()[0].clearing, Clearing::OpenDoor);
}
