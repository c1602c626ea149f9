//! Main entry point for the arena server.
//!
//! Loads the game configuration, starts the match registry actor and launches
//! the HTTP server.

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::{error, info};

use laser_arena::config::GameConfig;
use laser_arena::config::server::{GAME_CONFIG_ENV, bind_addr};
use laser_arena::error::ArenaError;
use laser_arena::game::grid::Grid;
use laser_arena::render::screen_renderers;
use laser_arena::server::game_session::GameSessionManager;
use laser_arena::server::state::AppState;

/// Read the configuration named by the environment, or the defaults.
/// A configured grid file is loaded once here so a bad layout fails at startup.
fn load_config() -> Result<GameConfig, ArenaError> {
    let config = match std::env::var(GAME_CONFIG_ENV) {
        Ok(path) => GameConfig::from_json_file(Path::new(&path))?,
        Err(_) => GameConfig::default(),
    };
    config.validate()?;
    if let Some(path) = &config.grid_file {
        Grid::load_from_file(path)?;
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger from environment variable.
    env_logger::init();

    let config = load_config().map_err(|e| {
        error!("cannot start: {}", e);
        io::Error::other(e.to_string())
    })?;

    // Start the GameSessionManager actor (match registry).
    let game_session_manager =
        GameSessionManager::new(Arc::new(config), screen_renderers()).start();
    let state = web::Data::new(AppState::new(game_session_manager));

    let addr = bind_addr();
    info!("listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(laser_arena::server::router::config)
    })
    .bind(addr)?
    .run()
    .await
}
