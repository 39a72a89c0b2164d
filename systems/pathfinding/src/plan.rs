use ember_rescue_core::CellCoord;
use ember_rescue_world::{query, World};

/// Obstacle a hop must clear before the step is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clearing {
    /// Nothing in the way.
    None,
    /// A closed door must be opened.
    OpenDoor,
    /// An intact wall must be cut down.
    CutWall,
}

impl Clearing {
    /// Relative clearing cost, `0`, `1` or `2`.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::None => 0,
            Self::OpenDoor => 1,
            Self::CutWall => 2,
        }
    }
}

/// What the plan leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoalKind {
    /// An entry, to carry a victim out.
    Exit,
    /// A victim token.
    Victim,
    /// A burning cell, fought from the cell before it.
    Fire,
}

/// One step of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hop {
    /// Cell entered by the step.
    pub cell: CellCoord,
    /// Obstacle on the boundary crossed by the step.
    pub clearing: Clearing,
}

/// Route toward a goal, consumed hop by hop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    kind: GoalKind,
    target: CellCoord,
    hops: Vec<Hop>,
    cursor: usize,
}

impl Plan {
    /// Creates a plan over the provided hops.
    #[must_use]
    pub fn new(kind: GoalKind, target: CellCoord, hops: Vec<Hop>) -> Self {
        Self {
            kind,
            target,
            hops,
            cursor: 0,
        }
    }

    /// Goal category.
    #[must_use]
    pub fn kind(&self) -> GoalKind {
        self.kind
    }

    /// Goal cell.
    #[must_use]
    pub fn target(&self) -> CellCoord {
        self.target
    }

    /// Next step, if any remain.
    #[must_use]
    pub fn next_hop(&self) -> Option<Hop> {
        self.hops.get(self.cursor).copied()
    }

    /// Steps not yet taken.
    #[must_use]
    pub fn remaining(&self) -> &[Hop] {
        self.hops.get(self.cursor..).unwrap_or(&[])
    }

    /// Marks the next step as taken.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.hops.len());
    }

    /// Reports whether every step has been taken.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.hops.len()
    }

    /// Sum of the clearing weights still ahead.
    #[must_use]
    pub fn clearing_weight(&self) -> u32 {
        self.remaining().iter().map(|hop| hop.clearing.weight()).sum()
    }

    /// A plan goes stale once a cell ahead of the firefighter catches fire.
    ///
    /// A fire goal's own target is expected to burn and does not count.
    #[must_use]
    pub fn is_scorched(&self, world: &World) -> bool {
        self.remaining().iter().any(|hop| {
            let exempt = self.kind == GoalKind::Fire && hop.cell == self.target;
            !exempt && query::has_fire(world, hop.cell)
        })
    }
}
