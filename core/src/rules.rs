//! Tunable rule set shared by the world and every system.

use serde::{Deserialize, Serialize};

/// Rule constants that govern a run.
///
/// Every field has a default matching the reference game, so a partial TOML
/// document only needs to name the values it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Number of firefighters created at setup.
    pub firefighters: u32,
    /// Action points each firefighter starts with.
    pub initial_action_points: u32,
    /// Cap on banked action points.
    pub max_action_points: u32,
    /// Action points granted at the end of every turn.
    pub action_point_gain: u32,
    /// Cost of an ordinary move.
    pub move_cost: u32,
    /// Cost of moving while carrying or into fire.
    pub heavy_move_cost: u32,
    /// Cost of removing fire outright.
    pub extinguish_cost: u32,
    /// Cost of reducing fire to smoke.
    pub reduce_fire_cost: u32,
    /// Cost of removing smoke.
    pub clear_smoke_cost: u32,
    /// Cost of opening or closing a door.
    pub toggle_door_cost: u32,
    /// Cost of one axe hit on a wall.
    pub cut_wall_cost: u32,
    /// Number of point-of-interest tokens kept on the board.
    pub active_poi_target: u32,
    /// Victim tokens in the whole scenario, pre-placed ones included.
    pub victim_supply: u32,
    /// False-alarm tokens in the whole scenario, pre-placed ones included.
    pub false_alarm_supply: u32,
    /// Rescues needed for victory.
    pub rescue_goal: u32,
    /// Losses that end the run in defeat.
    pub victim_loss_limit: u32,
    /// Structural damage that collapses the building.
    pub damage_limit: u32,
    /// Search budgets and edge prices for the path planner.
    pub planner: PlannerRules,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            firefighters: 6,
            initial_action_points: 4,
            max_action_points: 8,
            action_point_gain: 4,
            move_cost: 1,
            heavy_move_cost: 2,
            extinguish_cost: 2,
            reduce_fire_cost: 1,
            clear_smoke_cost: 1,
            toggle_door_cost: 1,
            cut_wall_cost: 2,
            active_poi_target: 3,
            victim_supply: 10,
            false_alarm_supply: 5,
            rescue_goal: 7,
            victim_loss_limit: 4,
            damage_limit: 24,
            planner: PlannerRules::default(),
        }
    }
}

/// Search budgets and edge prices for the bounded A* planner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerRules {
    /// Nodes popped before the search gives up.
    pub max_nodes: u32,
    /// Wall-clock budget per search in milliseconds; `0` disables the clock.
    pub time_budget_ms: u64,
    /// Straight-line distance beyond which no search is attempted.
    pub max_distance: u32,
    /// Victims farther than this are not considered as goals.
    pub victim_search_radius: u32,
    /// Nearest exits tried while carrying.
    pub exit_candidates: usize,
    /// Nearest victims tried while empty-handed.
    pub victim_candidates: usize,
    /// Extra edge cost for opening a closed door.
    pub door_surcharge: u32,
    /// Extra edge cost for cutting an intact wall.
    pub wall_surcharge: u32,
    /// Extra cost for landing on fire while avoiding hazards.
    pub fire_penalty: u32,
    /// Extra cost for landing on smoke while avoiding hazards.
    pub smoke_penalty: u32,
}

impl Default for PlannerRules {
    fn default() -> Self {
        Self {
            max_nodes: 1_000,
            time_budget_ms: 500,
            max_distance: 15,
            victim_search_radius: 8,
            exit_candidates: 2,
            victim_candidates: 2,
            door_surcharge: 1,
            wall_surcharge: 2,
            fire_penalty: 10,
            smoke_penalty: 3,
        }
    }
}
