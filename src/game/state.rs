use std::sync::Arc;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::error::ArenaError;
use crate::game::entities::{Battery, Laser, Player, random_empty_cell, spawn_battery};
use crate::game::grid::Grid;
use crate::game::systems::{
    Outcome, apply_attrition, apply_commands, outcome, place_objects, propagate_lasers,
    reconcile_moves, status_for,
};
use crate::game::types::{Action, ConfigEcho, Coord, Owner, TurnState};

/// All mutable state of one match.
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: Arc<GameConfig>,
    pub grid: Grid,
    pub players: Vec<Player>,
    pub lasers: Vec<Laser>,
    pub batteries: Vec<Battery>,
    /// Explosions recorded during the last tick.
    pub explosions: Vec<Coord>,
    pub turn: u32,
    pub(crate) rng: ChaCha8Rng,
}

impl GameState {
    /// Build a match from its configuration: load the fixed layout if one is
    /// configured, otherwise generate a random grid from the match RNG.
    pub fn new(config: Arc<GameConfig>) -> Result<Self, ArenaError> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let grid = match &config.grid_file {
            Some(path) => Grid::load_from_file(path)?,
            None => Grid::random(config.width, config.height, config.walls, config.enclosed, &mut rng),
        };
        debug!("grid {}x{}:\n{}", grid.width(), grid.height(), grid.layout());
        Ok(Self::with_grid(config, grid, rng))
    }

    pub fn with_grid(config: Arc<GameConfig>, grid: Grid, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            grid,
            players: Vec::new(),
            lasers: Vec::new(),
            batteries: Vec::new(),
            explosions: Vec::new(),
            turn: 0,
            rng,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.num_players
    }

    /// Seat a new player in the next owner slot at a random free cell.
    /// Returns the player's index.
    pub fn add_player(&mut self, moniker: String) -> Result<usize, ArenaError> {
        if self.is_full() {
            return Err(ArenaError::MatchFull {
                limit: self.config.num_players,
            });
        }
        let coord = random_empty_cell(
            &self.grid,
            &self.players,
            &self.lasers,
            &self.batteries,
            &mut self.rng,
        )
        .ok_or(ArenaError::NoRoomForPlayer)?;

        let slot = self.players.len() + 1;
        let owner = u8::try_from(slot)
            .map(Owner)
            .map_err(|_| ArenaError::InvalidConfig(format!("no owner slot left for player {slot}")))?;
        let player = Player::new(moniker, owner, coord, &self.config);
        info!("{} joined at {}", player, coord);
        self.players.push(player);
        Ok(self.players.len() - 1)
    }

    pub fn player_index(&self, id: Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    /// Fewer than two players alive.
    pub fn is_done(&self) -> bool {
        self.alive_count() < 2
    }

    pub fn outcome(&self) -> Option<Outcome> {
        outcome(self)
    }

    pub fn explode(&mut self, coord: Coord) {
        self.explosions.push(coord);
    }

    /// Run one simulation step. Only the first step of a turn applies `actions`.
    pub fn tick(&mut self, first: bool, actions: &[(usize, Action)]) {
        self.grid.clear_objects();
        self.explosions.clear();
        debug!("[turn {}] tick first={}", self.turn, first);

        if first {
            apply_attrition(self);
            let desired = apply_commands(self, actions);
            reconcile_moves(self, desired);
        }

        propagate_lasers(self);

        if first {
            spawn_battery(self);
        }

        place_objects(self);
    }

    /// Resolve a whole turn: run its sub-ticks, stopping early once the match is
    /// decided, then advance the turn counter. `after_tick` observes the state
    /// after every sub-tick. Returns whether the match is over.
    pub fn resolve_turn(
        &mut self,
        actions: &[(usize, Action)],
        mut after_tick: impl FnMut(&GameState),
    ) -> bool {
        for i in 0..self.config.ticks_per_turn() {
            if self.is_done() {
                break;
            }
            self.tick(i == 0, actions);
            after_tick(self);
        }
        self.turn += 1;
        self.is_done()
    }

    /// Snapshot of the match for the player at `index`.
    pub fn turn_state(&self, index: usize) -> TurnState {
        let player = &self.players[index];
        TurnState {
            status: status_for(self, index),
            health: player.health,
            energy: player.energy,
            orientation: player.orientation,
            grid: self.grid.serialize_for(player.owner),
            config: None,
        }
    }

    pub fn config_echo(&self) -> ConfigEcho {
        ConfigEcho::from(self.config.as_ref())
    }
}
