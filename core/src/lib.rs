#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ember Rescue engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then appends [`Event`] values to the caller's
//! collector so renderers and exporters can reconstruct every turn without
//! re-deriving it. Systems query immutable views and respond exclusively with
//! new commands.

mod rules;

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub use rules::{PlannerRules, Rules};

/// Random stream shared by every system of a run.
///
/// Ignition rolls, deck shuffles, agent ordering and fallback decisions all
/// draw from one stream so a seed reproduces the whole run.
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Creates the shared random stream for a run from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant. Upper
    /// bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Direction leading from `self` to an orthogonally adjacent `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Cardinal directions, in the NESW order used by wall bitmasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in NESW order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the other way across the same boundary.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::North => 0b1000,
            Self::East => 0b0100,
            Self::South => 0b0010,
            Self::West => 0b0001,
        }
    }
}

/// Per-cell wall presence for the four sides of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallMask(u8);

impl WallMask {
    /// Mask without any walls.
    pub const OPEN: WallMask = WallMask(0);

    /// Builds a mask from NESW flags.
    #[must_use]
    pub const fn from_nesw(north: bool, east: bool, south: bool, west: bool) -> Self {
        let mut bits = 0;
        if north {
            bits |= Direction::North.bit();
        }
        if east {
            bits |= Direction::East.bit();
        }
        if south {
            bits |= Direction::South.bit();
        }
        if west {
            bits |= Direction::West.bit();
        }
        Self(bits)
    }

    /// Reports whether a wall stands on the provided side.
    #[must_use]
    pub const fn has(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Returns a copy with the side walled.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Returns a copy with the side open.
    #[must_use]
    pub const fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }

    /// Reports whether all four sides are walled.
    #[must_use]
    pub const fn is_sealed(self) -> bool {
        self.0 & 0b1111 == 0b1111
    }
}

/// Canonical identifier of the boundary between two orthogonal neighbours.
///
/// A boundary can be named from either side; `Segment` normalises North and
/// West references onto the neighbouring cell so both names map to one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    cell: CellCoord,
    direction: Direction,
}

impl Segment {
    /// Canonical segment on the `direction` side of `cell`.
    ///
    /// Returns `None` for the outer edge of the coordinate space.
    #[must_use]
    pub fn of(cell: CellCoord, direction: Direction) -> Option<Self> {
        match direction {
            Direction::East | Direction::South => Some(Self { cell, direction }),
            Direction::North | Direction::West => {
                let neighbour = cell.step(direction)?;
                Some(Self {
                    cell: neighbour,
                    direction: direction.opposite(),
                })
            }
        }
    }

    /// Canonical segment separating two adjacent cells.
    #[must_use]
    pub fn between(first: CellCoord, second: CellCoord) -> Option<Self> {
        let direction = first.direction_to(second)?;
        Self::of(first, direction)
    }

    /// Cell that anchors the canonical form (west or north side).
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Canonical direction, always `East` or `South`.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// The two cells the segment separates, anchor first.
    #[must_use]
    pub fn sides(&self) -> (CellCoord, CellCoord) {
        let far = match self.direction {
            Direction::East => CellCoord::new(self.cell.column() + 1, self.cell.row()),
            _ => CellCoord::new(self.cell.column(), self.cell.row() + 1),
        };
        (self.cell, far)
    }
}

/// Hidden type of a point-of-interest token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoiKind {
    /// A person who must be carried out of the building.
    Victim,
    /// Nothing to rescue; cleared on discovery.
    FalseAlarm,
}

/// Observable state of a door segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorState {
    /// Blocks movement until opened.
    Closed,
    /// Passable.
    Open,
    /// Blown away by an explosion; behaves as an empty boundary.
    Destroyed,
}

/// Unique identifier assigned to a firefighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FirefighterId(u32);

impl FirefighterId {
    /// Creates a new firefighter identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// What caused fire or smoke to appear on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireCause {
    /// The random ignition roll at the start of the fire phase.
    Ignition,
    /// One-hop spread from an existing fire.
    Flashover,
    /// The primary ray of an explosion.
    Explosion,
    /// A secondary ray carried through burning cells.
    Shockwave,
}

/// Why a victim was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossCause {
    /// The victim's cell caught fire.
    Fire,
    /// The firefighter carrying the victim was knocked down.
    Knockdown,
}

/// Reasons a firefighter command may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No firefighter with the provided identifier exists.
    UnknownFirefighter,
    /// The firefighter lacks the action points the command costs.
    InsufficientActionPoints,
    /// The firefighter already entered the building.
    AlreadyEntered,
    /// The firefighter has not entered the building yet.
    NotEntered,
    /// A wall or closed door blocks the move.
    Blocked,
    /// Victims may not be carried into fire.
    CarryingIntoFire,
    /// The segment has no live door.
    NoDoor,
    /// The segment has no intact wall.
    NoWall,
    /// Perimeter walls are load-bearing and cannot be cut.
    PerimeterWall,
    /// The target cell is neither the firefighter's cell nor reachable from it.
    OutOfReach,
    /// The target cell holds no fire or smoke to act on.
    NothingToClear,
}

/// Terminal result of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Enough victims were carried out.
    Victory,
    /// Too many victims were lost.
    DefeatVictimsLost,
    /// The building took too much structural damage.
    DefeatStructuralCollapse,
}

impl GameOutcome {
    /// Evaluates the end thresholds in priority order rescued, lost, damage.
    #[must_use]
    pub fn evaluate(rescued: u32, lost: u32, damage: u32, rules: &Rules) -> Option<Self> {
        if rescued >= rules.rescue_goal {
            Some(Self::Victory)
        } else if lost >= rules.victim_loss_limit {
            Some(Self::DefeatVictimsLost)
        } else if damage >= rules.damage_limit {
            Some(Self::DefeatStructuralCollapse)
        } else {
            None
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts a new global turn.
    AdvanceTurn,
    /// Teleports a firefighter from outside onto its assigned entry.
    EnterBuilding {
        /// Firefighter entering the building.
        firefighter: FirefighterId,
    },
    /// Moves a firefighter one cell.
    MoveFirefighter {
        /// Firefighter attempting to move.
        firefighter: FirefighterId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Opens or closes the door on one side of the firefighter's cell.
    ToggleDoor {
        /// Firefighter operating the door.
        firefighter: FirefighterId,
        /// Side of the firefighter's cell holding the door.
        direction: Direction,
    },
    /// Chops the wall on one side of the firefighter's cell.
    CutWall {
        /// Firefighter swinging the axe.
        firefighter: FirefighterId,
        /// Side of the firefighter's cell holding the wall.
        direction: Direction,
    },
    /// Removes fire from a cell entirely.
    ExtinguishFire {
        /// Firefighter spending the action points.
        firefighter: FirefighterId,
        /// Burning cell, either the firefighter's own or an adjacent one.
        cell: CellCoord,
    },
    /// Knocks fire back down to smoke.
    ReduceFire {
        /// Firefighter spending the action points.
        firefighter: FirefighterId,
        /// Burning cell, either the firefighter's own or an adjacent one.
        cell: CellCoord,
    },
    /// Removes smoke from a cell.
    ClearSmoke {
        /// Firefighter spending the action points.
        firefighter: FirefighterId,
        /// Smoky cell, either the firefighter's own or an adjacent one.
        cell: CellCoord,
    },
    /// Ends the firefighter's activation for this turn.
    PassTurn {
        /// Firefighter passing.
        firefighter: FirefighterId,
    },
    /// Places smoke on a clear cell; a no-op on smoke or fire.
    PlaceSmoke {
        /// Target cell.
        cell: CellCoord,
        /// What produced the smoke.
        cause: FireCause,
    },
    /// Sets a cell on fire, converting smoke and losing any victim present.
    Ignite {
        /// Target cell.
        cell: CellCoord,
        /// What produced the fire.
        cause: FireCause,
    },
    /// Adds one blast damage point to a non-perimeter wall.
    BlastWall {
        /// Canonical segment of the wall.
        segment: Segment,
    },
    /// Destroys a live door.
    BlastDoor {
        /// Canonical segment of the door.
        segment: Segment,
    },
    /// Sends a firefighter standing in fire to the safe cell.
    KnockDown {
        /// Firefighter caught in fire.
        firefighter: FirefighterId,
    },
    /// Places a point-of-interest token on a cell, clearing fire and smoke.
    PlacePoi {
        /// Target cell.
        cell: CellCoord,
        /// Token type.
        kind: PoiKind,
    },
    /// Grants every firefighter the per-turn action-point gain.
    RecoverActionPoints,
    /// Evaluates the end thresholds and marks the run terminal if one is met.
    CheckEndConditions,
}

/// Events appended by the world and systems while processing a turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// A new global turn began.
    TurnStarted {
        /// One-based turn number.
        turn: u32,
    },
    /// A firefighter stepped onto its entry cell.
    FirefighterEntered {
        /// Firefighter that entered.
        firefighter: FirefighterId,
        /// Entry cell now occupied.
        cell: CellCoord,
    },
    /// A firefighter moved one cell.
    FirefighterMoved {
        /// Firefighter that moved.
        firefighter: FirefighterId,
        /// Cell occupied before moving.
        from: CellCoord,
        /// Cell occupied after moving.
        to: CellCoord,
    },
    /// A firefighter paid action points.
    ActionPointsSpent {
        /// Firefighter that paid.
        firefighter: FirefighterId,
        /// Points paid.
        amount: u32,
        /// Points left afterwards.
        remaining: u32,
    },
    /// A firefighter ended its activation.
    TurnPassed {
        /// Firefighter that passed.
        firefighter: FirefighterId,
    },
    /// A command was refused; nothing changed.
    ActionRejected {
        /// Firefighter whose command was refused.
        firefighter: FirefighterId,
        /// Why it was refused.
        reason: RejectionReason,
    },
    /// A door was opened or closed.
    DoorToggled {
        /// Door segment.
        segment: Segment,
        /// State after toggling.
        state: DoorState,
    },
    /// A door was destroyed by a blast.
    DoorDestroyed {
        /// Door segment.
        segment: Segment,
    },
    /// A wall took a damage point and still stands.
    WallDamaged {
        /// Wall segment.
        segment: Segment,
        /// Damage accumulated on the segment.
        damage: u8,
    },
    /// A wall took its second damage point and was removed from both sides.
    WallDestroyed {
        /// Wall segment.
        segment: Segment,
    },
    /// Smoke appeared on a clear cell.
    SmokePlaced {
        /// Cell now smoky.
        cell: CellCoord,
        /// What produced it.
        cause: FireCause,
    },
    /// A clear cell caught fire.
    FireIgnited {
        /// Cell now burning.
        cell: CellCoord,
        /// What produced it.
        cause: FireCause,
    },
    /// Smoke on a cell turned into fire.
    SmokeConverted {
        /// Cell now burning.
        cell: CellCoord,
        /// What produced it.
        cause: FireCause,
    },
    /// An ignition roll hit a burning cell.
    ExplosionTriggered {
        /// Origin of the explosion.
        cell: CellCoord,
    },
    /// An explosion ray entered a burning cell and carried on as a shockwave.
    ShockwaveTriggered {
        /// Burning cell the shockwave starts from.
        cell: CellCoord,
        /// Direction of travel.
        direction: Direction,
    },
    /// Fire was removed from a cell.
    FireExtinguished {
        /// Cell now clear.
        cell: CellCoord,
    },
    /// Fire on a cell was reduced to smoke.
    FireReduced {
        /// Cell now smoky.
        cell: CellCoord,
    },
    /// Smoke was removed from a cell.
    SmokeCleared {
        /// Cell now clear.
        cell: CellCoord,
    },
    /// A victim died.
    VictimLost {
        /// Where it happened.
        cell: CellCoord,
        /// What killed the victim.
        cause: LossCause,
    },
    /// A firefighter standing in fire was carried to the safe cell.
    FirefighterKnockedDown {
        /// Firefighter knocked down.
        firefighter: FirefighterId,
        /// Burning cell it stood on.
        from: CellCoord,
        /// Safe cell it now occupies.
        to: CellCoord,
    },
    /// A firefighter picked up a victim.
    VictimPickedUp {
        /// Firefighter now carrying.
        firefighter: FirefighterId,
        /// Cell the victim lay on.
        cell: CellCoord,
    },
    /// A firefighter carried a victim out through an entry.
    VictimRescued {
        /// Firefighter that completed the rescue.
        firefighter: FirefighterId,
        /// Entry cell reached.
        cell: CellCoord,
    },
    /// A false alarm was revealed and removed.
    FalseAlarmCleared {
        /// Firefighter that revealed it.
        firefighter: FirefighterId,
        /// Cell the token lay on.
        cell: CellCoord,
    },
    /// The deck was built from the remaining token supply.
    DeckInitialised {
        /// Victim tokens in the deck.
        victims: u32,
        /// False-alarm tokens in the deck.
        false_alarms: u32,
    },
    /// A token was drawn from the deck.
    PoiDrawn {
        /// Token drawn.
        kind: PoiKind,
    },
    /// A token could not be placed and went back into the deck.
    PoiReturned {
        /// Token returned.
        kind: PoiKind,
    },
    /// A token was placed on the board.
    PoiPlaced {
        /// Cell holding the token.
        cell: CellCoord,
        /// Token type.
        kind: PoiKind,
    },
    /// A firefighter received its per-turn action points.
    ActionPointsRecovered {
        /// Firefighter recovering.
        firefighter: FirefighterId,
        /// Points available afterwards.
        action_points: u32,
    },
    /// The run reached a terminal state.
    SimulationEnded {
        /// Terminal result.
        outcome: GameOutcome,
    },
}

/// Pre-parsed, perimeter-padded scenario consumed by the world at setup.
///
/// Row 0, column 0, the last row and the last column are perimeter cells that
/// surround the building. Every other cell is interior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Number of columns including the perimeter.
    pub columns: u32,
    /// Number of rows including the perimeter.
    pub rows: u32,
    /// Row-major wall masks, `columns * rows` entries.
    pub walls: Vec<WallMask>,
    /// Unordered pairs of adjacent cells separated by a closed door.
    pub doors: Vec<(CellCoord, CellCoord)>,
    /// Pre-placed point-of-interest tokens.
    pub pois: Vec<(CellCoord, PoiKind)>,
    /// Cells burning at the start.
    pub fires: Vec<CellCoord>,
    /// Interior edge cells through which firefighters enter and victims leave.
    pub entries: Vec<CellCoord>,
    /// Cell knocked-down firefighters are taken to; defaults to outside the first entry.
    pub ambulance: Option<CellCoord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn segment_names_agree_from_both_sides() {
        let west = CellCoord::new(2, 3);
        let east = CellCoord::new(3, 3);
        assert_eq!(
            Segment::of(west, Direction::East),
            Segment::of(east, Direction::West)
        );
        assert_eq!(Segment::between(west, east), Segment::between(east, west));

        let north = CellCoord::new(4, 1);
        let south = CellCoord::new(4, 2);
        let segment = Segment::of(south, Direction::North).expect("segment");
        assert_eq!(segment.cell(), north);
        assert_eq!(segment.direction(), Direction::South);
        assert_eq!(segment.sides(), (north, south));
    }

    #[test]
    fn segment_absent_beyond_origin() {
        assert!(Segment::of(CellCoord::new(0, 0), Direction::North).is_none());
        assert!(Segment::of(CellCoord::new(0, 0), Direction::West).is_none());
        assert!(Segment::between(CellCoord::new(0, 0), CellCoord::new(2, 0)).is_none());
    }

    #[test]
    fn wall_mask_tracks_each_side() {
        let mask = WallMask::from_nesw(true, false, true, false);
        assert!(mask.has(Direction::North));
        assert!(!mask.has(Direction::East));
        assert!(mask.has(Direction::South));
        assert!(!mask.without(Direction::South).has(Direction::South));
        assert!(mask.with(Direction::East).with(Direction::West).is_sealed());
    }

    #[test]
    fn outcome_priority_prefers_victory() {
        let rules = Rules::default();
        assert_eq!(
            GameOutcome::evaluate(7, 4, 24, &rules),
            Some(GameOutcome::Victory)
        );
        assert_eq!(
            GameOutcome::evaluate(0, 4, 30, &rules),
            Some(GameOutcome::DefeatVictimsLost)
        );
        assert_eq!(
            GameOutcome::evaluate(6, 3, 24, &rules),
            Some(GameOutcome::DefeatStructuralCollapse)
        );
        assert_eq!(GameOutcome::evaluate(6, 3, 23, &rules), None);
    }

    #[test]
    fn event_round_trips_through_bincode() {
        let event = Event::WallDamaged {
            segment: Segment::of(CellCoord::new(2, 2), Direction::West).expect("segment"),
            damage: 1,
        };
        let bytes = bincode::serialize(&event).expect("serialize");
        let restored: Event = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, event);
    }
}
