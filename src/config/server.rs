/// Server configuration constants.
///
/// This module defines where the HTTP transport listens and where an optional
/// game configuration file is read from.
use std::env;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

/// Default port the HTTP server binds to.
pub const DEFAULT_BIND_PORT: u16 = 8080;

/// Environment variable overriding the bind address (`host:port`).
pub const BIND_ADDR_ENV: &str = "ARENA_BIND_ADDR";

/// Environment variable naming a JSON file with a [`GameConfig`](super::GameConfig).
pub const GAME_CONFIG_ENV: &str = "ARENA_CONFIG";

/// Header carrying the player id on every request and response.
pub const PLAYER_ID_HEADER: &str = "X-SM-PlayerId";

/// Header carrying the player's display name on join.
pub const PLAYER_MONIKER_HEADER: &str = "X-SM-PlayerMoniker";

/// Resolve the bind address, preferring the environment override.
pub fn bind_addr() -> String {
    env::var(BIND_ADDR_ENV)
        .ok()
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| format!("{DEFAULT_BIND_HOST}:{DEFAULT_BIND_PORT}"))
}
