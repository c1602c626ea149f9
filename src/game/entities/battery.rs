//! Battery entity logic.
//!
//! This module handles spawning batteries on the grid.

use log::debug;

use crate::game::entities::random_empty_cell;
use crate::game::state::GameState;
use crate::game::types::{Cell, CellKind, Coord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battery {
    pub coord: Coord,
}

impl Battery {
    pub fn to_cell(&self) -> Cell {
        Cell {
            kind: CellKind::Battery,
            ..Cell::EMPTY
        }
    }
}

/// Spawn a battery if this turn is a spawn turn and the grid is below its battery limit.
/// Silently skipped when no free cell exists.
pub fn spawn_battery(game_state: &mut GameState) {
    let ticks = game_state.config.battery_ticks;
    if ticks == 0 || game_state.turn % ticks != 0 {
        return;
    }
    let max = game_state.config.max_batteries;
    if max >= 0 && game_state.batteries.len() >= max as usize {
        return;
    }

    let free = random_empty_cell(
        &game_state.grid,
        &game_state.players,
        &game_state.lasers,
        &game_state.batteries,
        &mut game_state.rng,
    );
    match free {
        Some(coord) => {
            debug!("[turn {}] battery spawned at {}", game_state.turn, coord);
            game_state.batteries.push(Battery { coord });
        }
        None => debug!("[turn {}] no free cell for a battery", game_state.turn),
    }
}
