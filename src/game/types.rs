use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::ArenaError;

/// A cell coordinate. Ordered row-major so grouped resolution is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub fn opposite(self) -> Self {
        match self {
            Orientation::North => Orientation::South,
            Orientation::East => Orientation::West,
            Orientation::South => Orientation::North,
            Orientation::West => Orientation::East,
        }
    }

    pub fn left(self) -> Self {
        match self {
            Orientation::North => Orientation::West,
            Orientation::East => Orientation::North,
            Orientation::South => Orientation::East,
            Orientation::West => Orientation::South,
        }
    }

    pub fn right(self) -> Self {
        match self {
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
        }
    }

    /// Unit step as (dx, dy); y grows southwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Orientation::North => (0, -1),
            Orientation::East => (1, 0),
            Orientation::South => (0, 1),
            Orientation::West => (-1, 0),
        }
    }
}

/// 1-based player slot. `Owner::NONE` marks unowned cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Owner(pub u8);

impl Owner {
    pub const NONE: Owner = Owner(0);
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Owner::NONE {
            write!(f, "None")
        } else {
            write!(f, "Player{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Player,
    Battery,
    Laser,
}

/// What a single grid square shows. Compared by full equality so an unchanged
/// cell needs no redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub orientation: Orientation,
    pub owner: Owner,
    pub exploding: bool,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        kind: CellKind::Empty,
        orientation: Orientation::North,
        owner: Owner::NONE,
        exploding: false,
    };

    pub const WALL: Cell = Cell {
        kind: CellKind::Wall,
        ..Cell::EMPTY
    };

    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }
}

/// Commands a remote player may submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename = "noop")]
    Noop,
    #[serde(rename = "left")]
    RotateLeft,
    #[serde(rename = "right")]
    RotateRight,
    #[serde(rename = "move")]
    MoveForward,
    #[serde(rename = "fire")]
    FireLaser,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Noop => "noop",
            Command::RotateLeft => "left",
            Command::RotateRight => "right",
            Command::MoveForward => "move",
            Command::FireLaser => "fire",
        }
    }
}

impl FromStr for Command {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "noop" => Ok(Command::Noop),
            "left" => Ok(Command::RotateLeft),
            "right" => Ok(Command::RotateRight),
            "move" => Ok(Command::MoveForward),
            "fire" => Ok(Command::FireLaser),
            _ => Err(ArenaError::InvalidCommand(s.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a player does in a turn. `Join` and `SelfDestruct` only originate
/// inside the orchestrator; remote callers can only produce `Player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Join,
    SelfDestruct,
    Player(Command),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Join => f.write_str("join"),
            Action::SelfDestruct => f.write_str("kaboom"),
            Action::Player(command) => command.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Running,
    Won,
    Lost,
    Draw,
}

/// Fixed match constants echoed once in the join response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEcho {
    /// Nanoseconds.
    pub turn_timeout: i64,
    /// Nanoseconds.
    pub connect_back_timeout: i64,
    pub max_health: i32,
    pub max_energy: i32,
    pub health_loss: i32,
    pub laser_damage: i32,
    pub laser_distance: u32,
    pub laser_energy: i32,
    pub battery_power: i32,
    pub battery_health: i32,
}

impl From<&GameConfig> for ConfigEcho {
    fn from(config: &GameConfig) -> Self {
        Self {
            turn_timeout: config.turn_timeout.as_nanos() as i64,
            connect_back_timeout: config.connect_back_timeout.as_nanos() as i64,
            max_health: config.max_player_health,
            max_energy: config.max_player_energy,
            health_loss: config.health_loss,
            laser_damage: config.laser_damage,
            laser_distance: config.laser_distance,
            laser_energy: config.laser_energy,
            battery_power: config.battery_power,
            battery_health: config.battery_health,
        }
    }
}

/// Point-in-time snapshot of a match from one player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub status: GameStatus,
    pub health: i32,
    pub energy: i32,
    pub orientation: Orientation,
    pub grid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigEcho>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_are_inverse() {
        for o in [Orientation::North, Orientation::East, Orientation::South, Orientation::West] {
            assert_eq!(o.left().right(), o);
            assert_eq!(o.opposite().opposite(), o);
            assert_eq!(o.right().right(), o.opposite());
        }
    }

    #[test]
    fn parses_remote_commands_only() {
        assert_eq!("MOVE".parse::<Command>().unwrap(), Command::MoveForward);
        assert_eq!("left".parse::<Command>().unwrap(), Command::RotateLeft);
        assert!(matches!("join".parse::<Command>(), Err(ArenaError::InvalidCommand(_))));
        assert!("kaboom".parse::<Command>().is_err());
    }

    #[test]
    fn coord_orders_row_major() {
        assert!(Coord::new(5, 0) < Coord::new(0, 1));
        assert!(Coord::new(0, 1) < Coord::new(1, 1));
    }

    #[test]
    fn turn_state_wire_format() {
        let state = TurnState {
            status: GameStatus::Running,
            health: 10,
            energy: 3,
            orientation: Orientation::West,
            grid: "_X\n".into(),
            config: None,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["orientation"], "west");
        assert!(json.get("config").is_none());
    }
}
