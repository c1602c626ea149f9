/// Game configuration constants and the per-match configuration value.
///
/// This module defines the main gameplay parameters such as turn timeouts,
/// grid dimensions, combat and battery balance. A [`GameConfig`] is built once,
/// validated, and shared read-only by every match created from it.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

/// Number of columns in a generated grid.
pub const GRID_WIDTH: usize = 24;

/// Number of rows in a generated grid.
pub const GRID_HEIGHT: usize = 16;

/// Number of random wall segments in a generated grid.
pub const GRID_WALLS: usize = 8;

/// Whether generated grids get a solid border.
pub const GRID_ENCLOSED: bool = false;

/// Time before a late action is downgraded to noop, in milliseconds.
pub const TURN_TIMEOUT_MS: u64 = 500;

/// Time before a silent player is self-destructed, in milliseconds.
pub const CONNECT_BACK_TIMEOUT_MS: u64 = 10_000;

/// How often the collection deadlines are checked, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 50;

/// Number of players in a match.
pub const NUM_PLAYERS: usize = 2;

/// Simulation ticks per player action.
pub const TURN_TICKS: u32 = 2;

pub const PLAYER_HEALTH: i32 = 300;
pub const MAX_PLAYER_HEALTH: i32 = 300;
pub const PLAYER_ENERGY: i32 = 5;
pub const MAX_PLAYER_ENERGY: i32 = 10;

/// Health lost by every living player each turn.
pub const HEALTH_LOSS: i32 = 1;

pub const LASER_DAMAGE: i32 = 50;

/// How many cells a laser travels.
pub const LASER_DISTANCE: u32 = 32;

/// Energy needed to fire a laser.
pub const LASER_ENERGY: i32 = 1;

pub const BATTERY_POWER: i32 = 5;
pub const BATTERY_HEALTH: i32 = 20;

/// Turns between battery spawns.
pub const BATTERY_TICKS: u32 = 15;

/// Maximum number of batteries on the grid. Negative means unlimited.
pub const MAX_BATTERIES: i32 = 5;

/// Immutable configuration of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub walls: usize,
    pub enclosed: bool,
    #[serde(rename = "turn_timeout_ms", with = "millis")]
    pub turn_timeout: Duration,
    /// Zero disables forced self-destruct; collection then ends at the turn timeout.
    #[serde(rename = "connect_back_timeout_ms", with = "millis")]
    pub connect_back_timeout: Duration,
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
    pub turn_ticks: u32,
    pub num_players: usize,
    pub player_health: i32,
    pub max_player_health: i32,
    pub player_energy: i32,
    pub max_player_energy: i32,
    pub health_loss: i32,
    pub laser_damage: i32,
    pub laser_distance: u32,
    pub laser_energy: i32,
    pub battery_power: i32,
    pub battery_health: i32,
    pub battery_ticks: u32,
    pub max_batteries: i32,
    /// Fixed layout to load instead of generating a random grid.
    pub grid_file: Option<PathBuf>,
    /// Seed for the match RNG. Unseeded matches draw from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            walls: GRID_WALLS,
            enclosed: GRID_ENCLOSED,
            turn_timeout: Duration::from_millis(TURN_TIMEOUT_MS),
            connect_back_timeout: Duration::from_millis(CONNECT_BACK_TIMEOUT_MS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            turn_ticks: TURN_TICKS,
            num_players: NUM_PLAYERS,
            player_health: PLAYER_HEALTH,
            max_player_health: MAX_PLAYER_HEALTH,
            player_energy: PLAYER_ENERGY,
            max_player_energy: MAX_PLAYER_ENERGY,
            health_loss: HEALTH_LOSS,
            laser_damage: LASER_DAMAGE,
            laser_distance: LASER_DISTANCE,
            laser_energy: LASER_ENERGY,
            battery_power: BATTERY_POWER,
            battery_health: BATTERY_HEALTH,
            battery_ticks: BATTERY_TICKS,
            max_batteries: MAX_BATTERIES,
            grid_file: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ArenaError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArenaError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: GameConfig = serde_json::from_str(&text).map_err(|e| {
            ArenaError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges a match relies on.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let fail = |msg: String| Err(ArenaError::InvalidConfig(msg));
        if self.num_players < 2 {
            return fail(format!("at least 2 players required, got {}", self.num_players));
        }
        if self.num_players > usize::from(u8::MAX) {
            return fail(format!("at most {} players supported, got {}", u8::MAX, self.num_players));
        }
        if self.laser_distance == u32::MAX {
            return fail(format!("laser distance must be below {}", u32::MAX));
        }
        if self.grid_file.is_none() && (self.width == 0 || self.height == 0) {
            return fail(format!("grid must not be empty, got {}x{}", self.width, self.height));
        }
        if self.player_health <= 0 || self.max_player_health < self.player_health {
            return fail(format!(
                "player health {} must be positive and at most max health {}",
                self.player_health, self.max_player_health
            ));
        }
        if self.player_energy < 0 || self.max_player_energy < self.player_energy {
            return fail(format!(
                "player energy {} must be non-negative and at most max energy {}",
                self.player_energy, self.max_player_energy
            ));
        }
        if self.health_loss < 0 || self.laser_damage < 0 || self.laser_energy < 0 {
            return fail("health loss, laser damage and laser energy must be non-negative".into());
        }
        if self.battery_power < 0 || self.battery_health < 0 {
            return fail("battery power and battery health must be non-negative".into());
        }
        if self.poll_interval.is_zero() {
            return fail("poll interval must be positive".into());
        }
        Ok(())
    }

    /// Sub-ticks per turn. Zero behaves as one.
    pub fn ticks_per_turn(&self) -> u32 {
        self.turn_ticks.max(1)
    }
}

/// Durations as integer milliseconds in config files.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
