//! Dense per-cell storage for walls, fire, smoke and point-of-interest tokens.

use ember_rescue_core::{CellCoord, Direction, PoiKind, WallMask};

/// Mutable contents of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct CellState {
    pub(crate) walls: WallMask,
    pub(crate) fire: bool,
    pub(crate) smoke: bool,
    pub(crate) poi: Option<PoiKind>,
}

/// Result of setting a cell alight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ignition {
    AlreadyBurning,
    FromSmoke,
    FromClear,
}

/// Row-major grid including the perimeter ring.
#[derive(Clone, Debug)]
pub(crate) struct GridModel {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
}

impl GridModel {
    pub(crate) fn new(columns: u32, rows: u32, walls: &[WallMask]) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let cells = (0..capacity)
            .map(|index| CellState {
                walls: walls.get(index).copied().unwrap_or_default(),
                ..CellState::default()
            })
            .collect();
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Cells on the outer ring that pads the building.
    pub(crate) fn is_perimeter(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.columns
                || cell.row() + 1 == self.rows)
    }

    pub(crate) fn is_interior(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.is_perimeter(cell)
    }

    pub(crate) fn neighbour(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.contains(*next))
    }

    pub(crate) fn cell(&self, cell: CellCoord) -> Option<&CellState> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut CellState> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    pub(crate) fn interior_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| self.is_interior(*cell))
    }

    pub(crate) fn set_wall(&mut self, cell: CellCoord, direction: Direction, present: bool) {
        if let Some(state) = self.cell_mut(cell) {
            state.walls = if present {
                state.walls.with(direction)
            } else {
                state.walls.without(direction)
            };
        }
    }

    pub(crate) fn has_fire(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(|state| state.fire)
    }

    pub(crate) fn has_smoke(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(|state| state.smoke)
    }

    pub(crate) fn ignite(&mut self, cell: CellCoord) -> Option<Ignition> {
        let state = self.cell_mut(cell)?;
        if state.fire {
            return Some(Ignition::AlreadyBurning);
        }
        let was_smoky = state.smoke;
        state.fire = true;
        state.smoke = false;
        Some(if was_smoky {
            Ignition::FromSmoke
        } else {
            Ignition::FromClear
        })
    }

    /// Places smoke on a clear cell. Smoke never lands on fire.
    pub(crate) fn place_smoke(&mut self, cell: CellCoord) -> bool {
        match self.cell_mut(cell) {
            Some(state) if !state.fire && !state.smoke => {
                state.smoke = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn extinguish(&mut self, cell: CellCoord) -> bool {
        match self.cell_mut(cell) {
            Some(state) if state.fire => {
                state.fire = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn reduce_fire(&mut self, cell: CellCoord) -> bool {
        match self.cell_mut(cell) {
            Some(state) if state.fire => {
                state.fire = false;
                state.smoke = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_smoke(&mut self, cell: CellCoord) -> bool {
        match self.cell_mut(cell) {
            Some(state) if state.smoke => {
                state.smoke = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn poi(&self, cell: CellCoord) -> Option<PoiKind> {
        self.cell(cell).and_then(|state| state.poi)
    }

    pub(crate) fn take_poi(&mut self, cell: CellCoord) -> Option<PoiKind> {
        self.cell_mut(cell).and_then(|state| state.poi.take())
    }

    pub(crate) fn put_poi(&mut self, cell: CellCoord, kind: PoiKind) {
        if let Some(state) = self.cell_mut(cell) {
            state.poi = Some(kind);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellState)> + '_ {
        let width = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, state)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % width, index / width), state)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perimeter_ring_surrounds_interior() {
        let grid = GridModel::new(4, 3, &[]);
        assert!(grid.is_perimeter(CellCoord::new(0, 1)));
        assert!(grid.is_perimeter(CellCoord::new(3, 1)));
        assert!(grid.is_perimeter(CellCoord::new(1, 2)));
        assert!(grid.is_interior(CellCoord::new(1, 1)));
        assert!(grid.is_interior(CellCoord::new(2, 1)));
        assert!(!grid.is_interior(CellCoord::new(4, 1)));
        assert_eq!(grid.interior_cells().count(), 2);
    }

    #[test]
    fn smoke_and_fire_stay_exclusive() {
        let mut grid = GridModel::new(3, 3, &[]);
        let cell = CellCoord::new(1, 1);

        assert!(grid.place_smoke(cell));
        assert_eq!(grid.ignite(cell), Some(Ignition::FromSmoke));
        assert!(grid.has_fire(cell));
        assert!(!grid.has_smoke(cell));
        assert!(!grid.place_smoke(cell));
        assert_eq!(grid.ignite(cell), Some(Ignition::AlreadyBurning));

        assert!(grid.reduce_fire(cell));
        assert!(!grid.has_fire(cell));
        assert!(grid.has_smoke(cell));
    }

    #[test]
    fn iteration_reports_row_major_coordinates() {
        let grid = GridModel::new(3, 2, &[]);
        let coords: Vec<CellCoord> = grid.iter().map(|(cell, _)| cell).collect();
        assert_eq!(coords[0], CellCoord::new(0, 0));
        assert_eq!(coords[2], CellCoord::new(2, 0));
        assert_eq!(coords[3], CellCoord::new(0, 1));
        assert_eq!(coords.len(), 6);
    }
}
