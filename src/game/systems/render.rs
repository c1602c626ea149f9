use crate::game::state::GameState;
use crate::render::PlayerStatus;

/// Place all tracked objects on the grid in rendering priority: batteries, then
/// lasers, then living players, then explosion flags.
pub fn place_objects(game_state: &mut GameState) {
    let GameState {
        grid,
        players,
        lasers,
        batteries,
        explosions,
        ..
    } = game_state;

    for battery in batteries.iter() {
        grid.set_cell(battery.coord, battery.to_cell());
    }
    for laser in lasers.iter() {
        grid.set_cell(laser.coord, laser.to_cell());
    }
    for player in players.iter().filter(|p| p.is_alive()) {
        grid.set_cell(player.coord, player.to_cell());
    }
    for coord in explosions.iter() {
        grid.set_exploding(*coord, true);
    }
}

/// Health and energy ratios of the first two players, for a status bar.
pub fn player_statuses(game_state: &GameState) -> Vec<PlayerStatus> {
    let config = &game_state.config;
    game_state
        .players
        .iter()
        .take(2)
        .map(|p| PlayerStatus {
            moniker: p.moniker.clone(),
            health: ratio(p.health, config.max_player_health),
            energy: ratio(p.energy, config.max_player_energy),
        })
        .collect()
}

fn ratio(value: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (f64::from(value) / f64::from(max)).clamp(0.0, 1.0)
}
