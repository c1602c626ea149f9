//! Laser flight.
//!
//! Every laser ages by one tick and advances one cell. Lasers are grouped by
//! the cell they move into and each group is resolved once, in row-major order.

use std::collections::BTreeMap;

use log::debug;

use crate::game::entities::Laser;
use crate::game::state::GameState;
use crate::game::types::Coord;

/// Age, move and collide all lasers.
pub fn propagate_lasers(game_state: &mut GameState) {
    let mut lasers = std::mem::take(&mut game_state.lasers);
    let mut moves: BTreeMap<Coord, Vec<usize>> = BTreeMap::new();

    for (i, laser) in lasers.iter_mut().enumerate() {
        laser.lifetime = laser.lifetime.saturating_sub(1);
        if laser.lifetime < 1 {
            continue;
        }
        let (cell, target) = game_state.grid.cell_relative_to(laser.coord, laser.orientation);
        if cell.is_wall() {
            debug!("laser from {} hit the wall at {}", laser.owner, target);
            game_state.explode(target);
        } else {
            moves.entry(target).or_default().push(i);
        }
    }

    let destinations: Vec<Coord> = moves.keys().copied().collect();
    let mut survivors = Vec::with_capacity(lasers.len());
    for dest in destinations {
        let Some(group) = moves.remove(&dest) else {
            continue;
        };
        // Several lasers meeting, or a group emptied by a head-on pass below.
        if group.len() != 1 {
            game_state.explode(dest);
            continue;
        }
        let laser = &lasers[group[0]];

        // A laser leaving `dest` towards us: the two pass through each other
        // and both die. The other one is dropped from the group it was heading to.
        if let Some(oncoming) = moves.get_mut(&laser.coord) {
            let head_on = oncoming.iter().position(|&j| {
                lasers[j].coord == dest && lasers[j].orientation == laser.orientation.opposite()
            });
            if let Some(pos) = head_on {
                oncoming.remove(pos);
                continue;
            }
        }

        let damage = game_state.config.laser_damage;
        if let Some(player) = game_state
            .players
            .iter_mut()
            .find(|p| p.is_alive() && p.coord == dest)
        {
            player.hit(damage);
            debug!("laser from {} hit {}", laser.owner, player);
            game_state.explode(dest);
            continue;
        }

        if let Some(pos) = game_state.batteries.iter().position(|b| b.coord == dest) {
            game_state.batteries.remove(pos);
            game_state.explode(dest);
            continue;
        }

        survivors.push(Laser {
            coord: dest,
            ..laser.clone()
        });
    }

    game_state.lasers = survivors;
}
