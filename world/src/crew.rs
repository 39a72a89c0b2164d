//! Firefighter roster owned by the world.

use ember_rescue_core::{CellCoord, Direction, FirefighterId};

use crate::grid::GridModel;

#[derive(Clone, Debug)]
pub(crate) struct Firefighter {
    pub(crate) id: FirefighterId,
    pub(crate) cell: CellCoord,
    pub(crate) entry: CellCoord,
    pub(crate) action_points: u32,
    pub(crate) carrying: bool,
    pub(crate) entered: bool,
}

impl Firefighter {
    pub(crate) fn spend(&mut self, amount: u32) -> Option<u32> {
        let remaining = self.action_points.checked_sub(amount)?;
        self.action_points = remaining;
        Some(remaining)
    }
}

/// Firefighters in identifier order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Crew {
    members: Vec<Firefighter>,
}

impl Crew {
    /// Creates `count` firefighters, assigning entries round-robin.
    pub(crate) fn assemble(
        grid: &GridModel,
        entries: &[CellCoord],
        count: u32,
        action_points: u32,
    ) -> Self {
        if entries.is_empty() {
            if count > 0 {
                tracing::warn!(count, "scenario has no entries, crew left empty");
            }
            return Self::default();
        }

        let members = (0..count)
            .zip(entries.iter().cycle())
            .map(|(index, entry)| Firefighter {
                id: FirefighterId::new(index),
                cell: outside_of(grid, *entry),
                entry: *entry,
                action_points,
                carrying: false,
                entered: false,
            })
            .collect();
        Self { members }
    }

    pub(crate) fn get(&self, id: FirefighterId) -> Option<&Firefighter> {
        self.members.iter().find(|member| member.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: FirefighterId) -> Option<&mut Firefighter> {
        self.members.iter_mut().find(|member| member.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Firefighter> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Firefighter> {
        self.members.iter_mut()
    }
}

/// Perimeter cell just outside an entry, preferring north, south, west, east.
pub(crate) fn outside_of(grid: &GridModel, entry: CellCoord) -> CellCoord {
    [Direction::North, Direction::South, Direction::West, Direction::East]
        .into_iter()
        .filter_map(|direction| grid.neighbour(entry, direction))
        .find(|cell| grid.is_perimeter(*cell))
        .unwrap_or(entry)
}
