// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the registry address and offers the two remote operations, `join`
//! and `act`, on top of the actor messages. Every call blocks until the turn it
//! takes part in has been resolved.

use actix::Addr;
use uuid::Uuid;

use crate::error::ArenaError;
use crate::game::types::{Command, TurnState};
use crate::server::game_session::messages::{Act, Join, Lookup, LookupOrCreate};
use crate::server::game_session::server::GameSessionManager;

/// Shared application state, injected into HTTP handlers.
pub struct AppState {
    /// Address of the game session manager actor (match registry).
    pub game_session_manager: Addr<GameSessionManager>,
}

impl AppState {
    pub fn new(game_session_manager: Addr<GameSessionManager>) -> Self {
        AppState { game_session_manager }
    }

    /// Join `name`, creating the match on first reference. Resolves once the
    /// match starts.
    pub async fn join(&self, name: &str, moniker: String) -> Result<(Uuid, TurnState), ArenaError> {
        let session = self
            .game_session_manager
            .send(LookupOrCreate { name: name.to_string() })
            .await??;
        let (player_id, reply) = session.send(Join { moniker }).await??;
        Ok((player_id, reply.await?))
    }

    /// Submit a command and wait for the snapshot following its turn.
    pub async fn act(&self, name: &str, player_id: Uuid, command: Command) -> Result<TurnState, ArenaError> {
        let session = self
            .game_session_manager
            .send(Lookup { name: name.to_string() })
            .await?
            .ok_or_else(|| ArenaError::UnknownMatch(name.to_string()))?;
        let reply = session.send(Act { player_id, command }).await??;
        Ok(reply.await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix::Actor;

    use super::*;
    use crate::config::GameConfig;
    use crate::game::types::GameStatus;
    use crate::render::no_renderers;

    fn app() -> AppState {
        let config = GameConfig {
            width: 6,
            height: 6,
            walls: 0,
            turn_timeout: Duration::from_millis(200),
            connect_back_timeout: Duration::from_millis(400),
            poll_interval: Duration::from_millis(10),
            seed: Some(11),
            ..GameConfig::default()
        };
        AppState::new(GameSessionManager::new(Arc::new(config), no_renderers()).start())
    }

    #[actix::test]
    async fn join_and_act_through_the_facade() {
        let app = app();
        let ((a, a_start), (b, _)) = tokio::join!(
            async { app.join("duel", "ada".into()).await.unwrap() },
            async { app.join("duel", "bob".into()).await.unwrap() },
        );
        assert_ne!(a, b);
        assert_eq!(a_start.status, GameStatus::Running);
        assert!(a_start.config.is_some());

        let (a_turn, b_turn) = tokio::join!(
            app.act("duel", a, Command::Noop),
            app.act("duel", b, Command::RotateLeft),
        );
        assert_eq!(a_turn.unwrap().health, a_start.health - 1);
        assert_eq!(b_turn.unwrap().status, GameStatus::Running);
    }

    #[actix::test]
    async fn act_on_unknown_match_fails() {
        let app = app();
        let result = app.act("nowhere", Uuid::new_v4(), Command::Noop).await;
        assert!(matches!(result, Err(ArenaError::UnknownMatch(name)) if name == "nowhere"));
    }

    #[actix::test]
    async fn third_join_is_refused() {
        let app = app();
        let (first, second) = tokio::join!(app.join("full", "a".into()), app.join("full", "b".into()));
        first.unwrap();
        second.unwrap();
        let third = app.join("full", "c".into()).await;
        assert!(matches!(third, Err(ArenaError::MatchFull { limit: 2 })));
    }
}
