//! Match-wide rules: per-turn attrition and win detection.

use log::debug;

use crate::game::state::GameState;
use crate::game::types::GameStatus;

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Index of the sole survivor.
    Winner(usize),
    Draw,
}

/// Every living player loses the configured health; those reaching zero explode.
pub fn apply_attrition(game_state: &mut GameState) {
    let loss = game_state.config.health_loss;
    let mut dead = Vec::new();
    for player in game_state.players.iter_mut().filter(|p| p.is_alive()) {
        if !player.hit(loss) {
            debug!("{} wore out at {}", player, player.coord);
            dead.push(player.coord);
        }
    }
    for coord in dead {
        game_state.explode(coord);
    }
}

/// `None` while at least two players are alive.
pub fn outcome(game_state: &GameState) -> Option<Outcome> {
    let mut alive = game_state
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alive())
        .map(|(i, _)| i);
    match (alive.next(), alive.next()) {
        (None, _) => Some(Outcome::Draw),
        (Some(winner), None) => Some(Outcome::Winner(winner)),
        _ => None,
    }
}

/// Status of the match from the point of view of the player at `index`.
pub fn status_for(game_state: &GameState, index: usize) -> GameStatus {
    match game_state.alive_count() {
        0 => GameStatus::Draw,
        n if n > 1 => GameStatus::Running,
        _ if game_state.players[index].is_alive() => GameStatus::Won,
        _ => GameStatus::Lost,
    }
}
