//! Player command system.
//!
//! This module applies the commands of a turn and reconciles the moves they
//! request. Moves are collected first and applied together so that the order
//! in which players are processed never decides who gets a cell.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use rand::Rng;

use crate::game::entities::Laser;
use crate::game::state::GameState;
use crate::game::types::{Action, Command, Coord};

/// Requested destinations, each with the indices of the players heading there.
pub type DesiredMoves = BTreeMap<Coord, Vec<usize>>;

/// Apply the turn's actions in player order, skipping dead players.
/// Rotations, lasers and self-destructs take effect at once; moves are returned
/// for [`reconcile_moves`].
pub fn apply_commands(game_state: &mut GameState, actions: &[(usize, Action)]) -> DesiredMoves {
    let mut ordered = actions.to_vec();
    ordered.sort_by_key(|(index, _)| *index);

    let mut desired = DesiredMoves::new();
    for (index, action) in ordered {
        let Some(player) = game_state.players.get(index) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }
        debug!("executing {} for {}", action, player);
        let (coord, orientation) = (player.coord, player.orientation);

        match action {
            Action::Join | Action::Player(Command::Noop) => {}
            Action::SelfDestruct => {
                game_state.players[index].health = 0;
                game_state.explode(coord);
            }
            Action::Player(Command::MoveForward) => {
                let (cell, target) = game_state.grid.cell_relative_to(coord, orientation);
                if !cell.is_wall() {
                    desired.entry(target).or_default().push(index);
                }
            }
            Action::Player(Command::RotateLeft) => {
                game_state.players[index].orientation = orientation.left();
            }
            Action::Player(Command::RotateRight) => {
                game_state.players[index].orientation = orientation.right();
            }
            Action::Player(Command::FireLaser) => fire_laser(game_state, index),
        }
    }
    desired
}

/// Spawn a laser on the firer's cell if it can pay for it. The extra tick of
/// lifetime is spent by the propagation step of the same tick.
fn fire_laser(game_state: &mut GameState, index: usize) {
    let cost = game_state.config.laser_energy;
    let lifetime = game_state.config.laser_distance.saturating_add(1);
    let player = &mut game_state.players[index];
    if player.energy < cost {
        debug!("{} lacks energy to fire", player);
        return;
    }
    player.energy -= cost;
    let laser = Laser {
        coord: player.coord,
        owner: player.owner,
        orientation: player.orientation,
        lifetime,
    };
    game_state.lasers.push(laser);
}

/// Resolve the requested moves against each other and the players that stay.
///
/// One mover per destination is drawn at random. A destination held by a
/// living player who is not leaving it is refused; this is repeated until
/// stable so chains into a blocked cell are refused too while swaps and
/// rotations go through.
pub fn reconcile_moves(game_state: &mut GameState, desired: DesiredMoves) {
    let mut winners: BTreeMap<Coord, usize> = BTreeMap::new();
    for (dest, movers) in desired {
        let chosen = if movers.len() == 1 {
            movers[0]
        } else {
            let pick = movers[game_state.rng.random_range(0..movers.len())];
            debug!("{} players contend for {}; player {} wins", movers.len(), dest, pick);
            pick
        };
        winners.insert(dest, chosen);
    }

    loop {
        let leaving: HashSet<usize> = winners.values().copied().collect();
        let blocked: Vec<Coord> = winners
            .keys()
            .copied()
            .filter(|dest| {
                game_state
                    .players
                    .iter()
                    .enumerate()
                    .any(|(i, p)| p.is_alive() && p.coord == *dest && !leaving.contains(&i))
            })
            .collect();
        if blocked.is_empty() {
            break;
        }
        for dest in blocked {
            winners.remove(&dest);
        }
    }

    for (dest, index) in winners {
        enter_cell(game_state, index, dest);
    }
}

/// Move a player into `dest`, running into an oncoming laser and picking up a battery there.
fn enter_cell(game_state: &mut GameState, index: usize, dest: Coord) {
    let facing = game_state.players[index].orientation;
    let oncoming = game_state
        .lasers
        .iter()
        .position(|l| l.coord == dest && l.orientation == facing.opposite());
    if let Some(pos) = oncoming {
        game_state.lasers.remove(pos);
        let damage = game_state.config.laser_damage;
        game_state.players[index].hit(damage);
        game_state.explode(dest);
    }

    // The battery is used up even by a mover the laser just killed; a dead
    // player is not revived by it.
    if let Some(pos) = game_state.batteries.iter().position(|b| b.coord == dest) {
        game_state.batteries.remove(pos);
        let config = game_state.config.clone();
        let player = &mut game_state.players[index];
        if player.is_alive() {
            player.energy = (player.energy + config.battery_power).min(config.max_player_energy);
            player.health += config.battery_health;
        }
        debug!("{} picked up a battery at {}", player, dest);
    }

    game_state.players[index].coord = dest;
}
