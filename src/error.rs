//! Error types for the grid and the match surface.

use std::io;

use thiserror::Error;
use uuid::Uuid;

use crate::game::types::Coord;

/// Failures while building or reading a grid.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("no cell at {0}")]
    OutOfBounds(Coord),

    #[error("expected width {expected} on line {line}, got {found}")]
    RaggedRow { line: usize, expected: usize, found: usize },

    #[error("unexpected character {ch:?} on line {line}")]
    UnexpectedChar { ch: char, line: usize },

    #[error("empty grid layout")]
    EmptyLayout,

    #[error("cannot read grid file: {0}")]
    Io(#[from] io::Error),
}

/// Failures surfaced to Join/Act callers.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("only {limit} players allowed")]
    MatchFull { limit: usize },

    /// The configured player count does not fit on the grid.
    #[error("grid does not have enough empty cells to place a player")]
    NoRoomForPlayer,

    #[error("no such player {0}")]
    UnknownPlayer(Uuid),

    #[error("match {0} does not exist")]
    UnknownMatch(String),

    #[error("{0} is not a valid command")]
    InvalidCommand(String),

    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("{0} is not a valid player id")]
    InvalidPlayerId(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The match actor went away before answering.
    #[error("match is no longer reachable")]
    MatchUnavailable,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("cannot encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ArenaError {
    /// Stable code used in transport error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ArenaError::MatchFull { .. } => "MATCH_FULL",
            ArenaError::NoRoomForPlayer => "NO_ROOM_FOR_PLAYER",
            ArenaError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            ArenaError::UnknownMatch(_) => "UNKNOWN_MATCH",
            ArenaError::InvalidCommand(_) => "INVALID_COMMAND",
            ArenaError::MissingHeader(_) => "MISSING_HEADER",
            ArenaError::InvalidPlayerId(_) => "INVALID_PLAYER_ID",
            ArenaError::InvalidConfig(_) => "INVALID_CONFIG",
            ArenaError::MatchUnavailable => "MATCH_UNAVAILABLE",
            ArenaError::Grid(_) => "GRID_ERROR",
            ArenaError::Encode(_) => "ENCODE_ERROR",
        }
    }

    /// Whether the caller caused the failure and may retry with a corrected request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ArenaError::MatchFull { .. }
                | ArenaError::UnknownPlayer(_)
                | ArenaError::UnknownMatch(_)
                | ArenaError::InvalidCommand(_)
                | ArenaError::MissingHeader(_)
                | ArenaError::InvalidPlayerId(_)
        )
    }
}

impl From<actix::MailboxError> for ArenaError {
    fn from(_: actix::MailboxError) -> Self {
        ArenaError::MatchUnavailable
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ArenaError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        ArenaError::MatchUnavailable
    }
}
