use actix::prelude::*;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::server::GameSession;
use crate::error::ArenaError;
use crate::game::types::{Command, TurnState};

/// Pending reply to a Join or Act, answered once the turn resolves.
pub type TurnReply = oneshot::Receiver<TurnState>;

/// Seat a player. The reply arrives when the match starts.
#[derive(Message)]
#[rtype(result = "Result<(Uuid, TurnReply), ArenaError>")]
pub struct Join {
    pub moniker: String,
}

/// Submit one command for the current turn.
#[derive(Message)]
#[rtype(result = "Result<TurnReply, ArenaError>")]
pub struct Act {
    pub player_id: Uuid,
    pub command: Command,
}

/// Sent by a session to the registry once its match is over.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MatchFinished {
    pub name: String,
    pub session: Addr<GameSession>,
}

/// Find a match by name, creating it when absent.
#[derive(Message)]
#[rtype(result = "Result<Addr<GameSession>, ArenaError>")]
pub struct LookupOrCreate {
    pub name: String,
}

#[derive(Message)]
#[rtype(result = "Option<Addr<GameSession>>")]
pub struct Lookup {
    pub name: String,
}
