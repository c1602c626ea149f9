//! Random placement of new entities.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::game::entities::{Battery, Laser, Player};
use crate::game::grid::Grid;
use crate::game::types::{CellKind, Coord};

/// Pick a uniformly random empty cell not holding a living player, a laser or a battery.
/// Returns `None` when the grid has no such cell.
pub fn random_empty_cell<R: Rng + ?Sized>(
    grid: &Grid,
    players: &[Player],
    lasers: &[Laser],
    batteries: &[Battery],
    rng: &mut R,
) -> Option<Coord> {
    let occupied: HashSet<Coord> = players
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| p.coord)
        .chain(lasers.iter().map(|l| l.coord))
        .chain(batteries.iter().map(|b| b.coord))
        .collect();

    let candidates: Vec<Coord> = grid
        .cells()
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                (cell.kind == CellKind::Empty).then_some(Coord::new(x, y))
            })
        })
        .filter(|coord| !occupied.contains(coord))
        .collect();

    candidates.choose(rng).copied()
}
