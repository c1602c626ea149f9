//! Laser entity logic.

use crate::game::types::{Cell, CellKind, Coord, Orientation, Owner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Laser {
    pub coord: Coord,
    pub owner: Owner,
    pub orientation: Orientation,
    /// Ticks left before the laser fizzles out.
    pub lifetime: u32,
}

impl Laser {
    pub fn to_cell(&self) -> Cell {
        Cell {
            kind: CellKind::Laser,
            orientation: self.orientation,
            owner: self.owner,
            exploding: false,
        }
    }
}
