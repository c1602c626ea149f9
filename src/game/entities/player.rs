//! Player entity logic.

use std::fmt;

use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::types::{Cell, CellKind, Coord, Orientation, Owner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub moniker: String,
    pub owner: Owner,
    pub orientation: Orientation,
    pub health: i32,
    pub energy: i32,
    pub coord: Coord,
}

impl Player {
    /// A fresh player facing north with the configured starting health and energy.
    pub fn new(moniker: String, owner: Owner, coord: Coord, config: &GameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            moniker,
            owner,
            orientation: Orientation::North,
            health: config.player_health,
            energy: config.player_energy,
            coord,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, clamping health at zero. Returns whether the player survived.
    pub fn hit(&mut self, damage: i32) -> bool {
        self.health = (self.health - damage).max(0);
        self.is_alive()
    }

    pub fn to_cell(&self) -> Cell {
        Cell {
            kind: CellKind::Player,
            orientation: self.orientation,
            owner: self.owner,
            exploding: false,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.owner, self.moniker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_clamps_at_zero() {
        let config = GameConfig::default();
        let mut player = Player::new("ada".into(), Owner(1), Coord::new(0, 0), &config);
        assert!(player.hit(config.player_health - 1));
        assert!(!player.hit(1000));
        assert_eq!(player.health, 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn displays_owner_and_moniker() {
        let player = Player::new("ada".into(), Owner(2), Coord::new(0, 0), &GameConfig::default());
        assert_eq!(player.to_string(), "Player2 (ada)");
    }
}
