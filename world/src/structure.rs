//! Wall damage counters and door states keyed by canonical segment.

use std::collections::{BTreeMap, BTreeSet};

use ember_rescue_core::{CellCoord, Direction, DoorState, Segment};

use crate::grid::GridModel;

/// Damage at which a wall is removed from both sides.
pub(crate) const WALL_BREAK_DAMAGE: u8 = 2;

/// Outcome of a single damage point landing on a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WallHit {
    Damaged(u8),
    Destroyed,
}

/// Mirrored boundary state between adjacent cells.
///
/// Wall bits live in the grid so spatial queries stay cheap, but only this
/// type writes them and it always writes both sides of a segment.
#[derive(Clone, Debug, Default)]
pub(crate) struct StructureState {
    damage: BTreeMap<Segment, u8>,
    doors: BTreeMap<Segment, DoorState>,
    door_segments: BTreeSet<Segment>,
}

impl StructureState {
    /// Normalises the grid's wall bits and registers the provided doors.
    pub(crate) fn new(grid: &mut GridModel, doors: &[(CellCoord, CellCoord)]) -> Self {
        let (columns, rows) = grid.dimensions();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                for direction in [Direction::East, Direction::South] {
                    let Some(neighbour) = grid.neighbour(cell, direction) else {
                        continue;
                    };
                    let near = grid.cell(cell).is_some_and(|state| state.walls.has(direction));
                    let far = grid
                        .cell(neighbour)
                        .is_some_and(|state| state.walls.has(direction.opposite()));
                    let present = near || far;
                    grid.set_wall(cell, direction, present);
                    grid.set_wall(neighbour, direction.opposite(), present);
                }
            }
        }

        let mut structure = Self::default();
        for &(first, second) in doors {
            let segment = match Segment::between(first, second) {
                Some(segment) if grid.contains(first) && grid.contains(second) => segment,
                _ => {
                    tracing::warn!(?first, ?second, "skipping door between non-adjacent cells");
                    continue;
                }
            };
            let (anchor, far) = segment.sides();
            grid.set_wall(anchor, segment.direction(), false);
            grid.set_wall(far, segment.direction().opposite(), false);
            let _ = structure.door_segments.insert(segment);
            let _ = structure.doors.insert(segment, DoorState::Closed);
        }
        structure
    }

    /// A segment is load-bearing when either side lies on the perimeter ring.
    pub(crate) fn is_perimeter(grid: &GridModel, segment: Segment) -> bool {
        let (anchor, far) = segment.sides();
        !grid.is_interior(anchor) || !grid.is_interior(far)
    }

    pub(crate) fn has_intact_wall(grid: &GridModel, cell: CellCoord, direction: Direction) -> bool {
        grid.cell(cell).is_some_and(|state| state.walls.has(direction))
    }

    pub(crate) fn damage(&self, segment: Segment) -> u8 {
        self.damage.get(&segment).copied().unwrap_or(0)
    }

    pub(crate) fn damaged_segments(&self) -> impl Iterator<Item = (Segment, u8)> + '_ {
        self.damage.iter().map(|(segment, damage)| (*segment, *damage))
    }

    /// Lands one damage point on an intact, non-perimeter wall.
    ///
    /// Returns `None` when the segment is load-bearing or holds no wall.
    pub(crate) fn damage_wall(&mut self, grid: &mut GridModel, segment: Segment) -> Option<WallHit> {
        if Self::is_perimeter(grid, segment) {
            return None;
        }
        let (anchor, far) = segment.sides();
        if !Self::has_intact_wall(grid, anchor, segment.direction()) {
            return None;
        }

        let counter = self.damage.entry(segment).or_insert(0);
        *counter = counter.saturating_add(1).min(WALL_BREAK_DAMAGE);
        if *counter >= WALL_BREAK_DAMAGE {
            grid.set_wall(anchor, segment.direction(), false);
            grid.set_wall(far, segment.direction().opposite(), false);
            Some(WallHit::Destroyed)
        } else {
            Some(WallHit::Damaged(*counter))
        }
    }

    pub(crate) fn door_state(&self, segment: Segment) -> Option<DoorState> {
        match self.doors.get(&segment) {
            Some(state) => Some(*state),
            None if self.door_segments.contains(&segment) => Some(DoorState::Destroyed),
            None => None,
        }
    }

    pub(crate) fn door_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.door_segments.iter().copied()
    }

    /// Flips a live door, returning its new state.
    pub(crate) fn toggle_door(&mut self, segment: Segment) -> Option<DoorState> {
        let state = self.doors.get_mut(&segment)?;
        *state = match *state {
            DoorState::Closed => DoorState::Open,
            _ => DoorState::Closed,
        };
        Some(*state)
    }

    /// Removes a live door from the table. Destroyed doors stay destroyed.
    pub(crate) fn destroy_door(&mut self, segment: Segment) -> bool {
        self.doors.remove(&segment).is_some()
    }

    /// Wall-only traversal check; doors are ignored.
    pub(crate) fn can_traverse(grid: &GridModel, cell: CellCoord, direction: Direction) -> bool {
        grid.neighbour(cell, direction).is_some()
            && !Self::has_intact_wall(grid, cell, direction)
    }

    /// Traversal check for movement: no wall and no closed door.
    pub(crate) fn is_passable(&self, grid: &GridModel, cell: CellCoord, direction: Direction) -> bool {
        if !Self::can_traverse(grid, cell, direction) {
            return false;
        }
        Segment::of(cell, direction)
            .map_or(true, |segment| self.door_state(segment) != Some(DoorState::Closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_rescue_core::WallMask;

    fn walled_pair() -> GridModel {
        // 4x3 grid: interior cells (1,1) and (2,1) share a wall declared on one side only.
        let mut walls = vec![WallMask::OPEN; 12];
        walls[5] = WallMask::OPEN.with(Direction::East);
        GridModel::new(4, 3, &walls)
    }

    #[test]
    fn setup_mirrors_single_sided_walls() {
        let mut grid = walled_pair();
        let _ = StructureState::new(&mut grid, &[]);
        let west = CellCoord::new(1, 1);
        let east = CellCoord::new(2, 1);
        assert!(StructureState::has_intact_wall(&grid, west, Direction::East));
        assert!(StructureState::has_intact_wall(&grid, east, Direction::West));
    }

    #[test]
    fn second_hit_clears_both_sides() {
        let mut grid = walled_pair();
        let mut structure = StructureState::new(&mut grid, &[]);
        let west = CellCoord::new(1, 1);
        let east = CellCoord::new(2, 1);
        let segment = Segment::of(east, Direction::West).expect("segment");

        assert_eq!(
            structure.damage_wall(&mut grid, segment),
            Some(WallHit::Damaged(1))
        );
        assert!(StructureState::has_intact_wall(&grid, west, Direction::East));
        assert_eq!(
            structure.damage_wall(&mut grid, segment),
            Some(WallHit::Destroyed)
        );
        assert!(!StructureState::has_intact_wall(&grid, west, Direction::East));
        assert!(!StructureState::has_intact_wall(&grid, east, Direction::West));
        assert_eq!(structure.damage(segment), 2);
        assert_eq!(structure.damage_wall(&mut grid, segment), None);
        assert_eq!(structure.damage(segment), 2);
    }

    #[test]
    fn perimeter_walls_refuse_damage() {
        let mut walls = vec![WallMask::OPEN; 12];
        walls[5] = WallMask::OPEN.with(Direction::North);
        let mut grid = GridModel::new(4, 3, &walls);
        let mut structure = StructureState::new(&mut grid, &[]);
        let segment = Segment::of(CellCoord::new(1, 1), Direction::North).expect("segment");
        assert!(StructureState::is_perimeter(&grid, segment));
        assert_eq!(structure.damage_wall(&mut grid, segment), None);
        assert_eq!(structure.damage(segment), 0);
    }

    #[test]
    fn doors_agree_from_both_sides() {
        let mut grid = walled_pair();
        let west = CellCoord::new(1, 1);
        let east = CellCoord::new(2, 1);
        let mut structure = StructureState::new(&mut grid, &[(east, west)]);
        let from_west = Segment::of(west, Direction::East).expect("segment");
        let from_east = Segment::of(east, Direction::West).expect("segment");

        assert!(!StructureState::has_intact_wall(&grid, west, Direction::East));
        assert_eq!(structure.door_state(from_west), Some(DoorState::Closed));
        assert!(!structure.is_passable(&grid, west, Direction::East));
        assert!(StructureState::can_traverse(&grid, west, Direction::East));

        assert_eq!(structure.toggle_door(from_east), Some(DoorState::Open));
        assert_eq!(structure.door_state(from_west), Some(DoorState::Open));
        assert!(structure.is_passable(&grid, east, Direction::West));

        assert!(structure.destroy_door(from_west));
        assert!(!structure.destroy_door(from_east));
        assert_eq!(structure.door_state(from_east), Some(DoorState::Destroyed));
        assert_eq!(structure.toggle_door(from_east), None);
        assert!(structure.is_passable(&grid, west, Direction::East));
    }
}
