//! Match actors.
//!
//! [`GameSession`] owns one match and runs its lifecycle; [`GameSessionManager`]
//! maps match names to sessions. All match state is mutated inside the
//! session's handlers, so concurrent callers never race on it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use log::{debug, error, info, warn};
use tokio::sync::oneshot;

use super::messages::{Act, Join, Lookup, LookupOrCreate, MatchFinished, TurnReply};
use super::turn_resolution::{all_actions_in, resolve_turn, start_collection};
use crate::config::GameConfig;
use crate::error::ArenaError;
use crate::game::state::GameState;
use crate::game::systems::{place_objects, player_statuses};
use crate::game::types::{Action, Command, TurnState};
use crate::render::{MessageKind, Renderer, RendererFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPlayers,
    Active,
    Finished,
}

/// A caller waiting for the snapshot that follows the current turn.
pub(crate) struct Reply {
    pub tx: oneshot::Sender<TurnState>,
    /// Join replies also carry the configuration echo.
    pub with_config: bool,
}

pub(crate) struct PendingAction {
    pub action: Action,
    pub replies: Vec<Reply>,
}

pub struct GameSession {
    pub name: String,
    pub game_state: GameState,
    pub phase: Phase,

    /// Actions collected this turn, keyed by player index.
    pub(crate) pending_actions: HashMap<usize, PendingAction>,
    pub(crate) collection_start: Option<Instant>,
    pub(crate) soft_deadline_passed: bool,
    pub(crate) turn_timer: Option<SpawnHandle>,

    pub(crate) renderer: Option<Box<dyn Renderer>>,
    on_finished: Option<Recipient<MatchFinished>>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[GameSession {}] waiting for {} players", self.name, self.game_state.config.num_players);
    }
}

impl GameSession {
    pub fn new(
        name: String,
        game_state: GameState,
        renderer: Option<Box<dyn Renderer>>,
        on_finished: Option<Recipient<MatchFinished>>,
    ) -> Self {
        Self {
            name,
            game_state,
            phase: Phase::AwaitingPlayers,
            pending_actions: HashMap::new(),
            collection_start: None,
            soft_deadline_passed: false,
            turn_timer: None,
            renderer,
            on_finished,
        }
    }

    pub(crate) fn render_message(&mut self, text: &str, kind: MessageKind) {
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.message(text, kind) {
                error!("[GameSession {}] renderer failed: {}", self.name, e);
            }
        }
    }

    /// Hand the renderer a copy of the current statuses and cells.
    pub(crate) fn render_grid(&mut self) {
        render_tick(&self.name, &mut self.renderer, &self.game_state);
    }

    /// Snapshot for the player at `index`, with the config echo when asked.
    pub(crate) fn snapshot(&self, index: usize, with_config: bool) -> TurnState {
        let mut state = self.game_state.turn_state(index);
        if with_config {
            state.config = Some(self.game_state.config_echo());
        }
        state
    }

    pub(crate) fn send_replies(&self, pending: HashMap<usize, PendingAction>) {
        for (index, entry) in pending {
            for reply in entry.replies {
                // The caller may have given up; nothing to do then.
                let _ = reply.tx.send(self.snapshot(index, reply.with_config));
            }
        }
    }

    /// Every player has joined: place them, answer the joins and open turn 1.
    fn start_match(&mut self, ctx: &mut Context<Self>) {
        info!("[GameSession {}] starting with {} players", self.name, self.game_state.players.len());
        self.phase = Phase::Active;
        self.render_message("Ready? Fight!", MessageKind::GameStart);

        self.game_state.grid.clear_objects();
        place_objects(&mut self.game_state);
        self.render_grid();

        let joins = std::mem::take(&mut self.pending_actions);
        self.send_replies(joins);
        self.game_state.turn = 1;
        start_collection(self, ctx);
    }

    /// Tell the registry this match is over so the name can be reused.
    pub(crate) fn finish(&mut self, ctx: &mut Context<Self>) {
        self.phase = Phase::Finished;
        info!("[GameSession {}] finished after turn {}", self.name, self.game_state.turn);
        if let Some(recipient) = self.on_finished.take() {
            recipient.do_send(MatchFinished {
                name: self.name.clone(),
                session: ctx.address(),
            });
        }
    }
}

pub(crate) fn render_tick(name: &str, renderer: &mut Option<Box<dyn Renderer>>, game_state: &GameState) {
    let Some(renderer) = renderer.as_mut() else {
        return;
    };
    let result = renderer
        .set_status(&player_statuses(game_state))
        .and_then(|_| renderer.update(game_state.grid.cells()));
    if let Err(e) = result {
        error!("[GameSession {}] renderer failed: {}", name, e);
    }
}

impl Handler<Join> for GameSession {
    type Result = Result<(uuid::Uuid, TurnReply), ArenaError>;

    fn handle(&mut self, msg: Join, ctx: &mut Context<Self>) -> Self::Result {
        let index = self.game_state.add_player(msg.moniker)?;
        let id = self.game_state.players[index].id;
        let (tx, rx) = oneshot::channel();
        self.pending_actions.insert(
            index,
            PendingAction {
                action: Action::Join,
                replies: vec![Reply { tx, with_config: true }],
            },
        );
        if self.game_state.is_full() {
            self.start_match(ctx);
        }
        Ok((id, rx))
    }
}

impl Handler<Act> for GameSession {
    type Result = Result<TurnReply, ArenaError>;

    fn handle(&mut self, msg: Act, ctx: &mut Context<Self>) -> Self::Result {
        let index = self
            .game_state
            .player_index(msg.player_id)
            .ok_or(ArenaError::UnknownPlayer(msg.player_id))?;
        let (tx, rx) = oneshot::channel();
        let reply = Reply { tx, with_config: false };

        match self.phase {
            Phase::AwaitingPlayers => {
                debug!(
                    "[GameSession {}] {} acted before the start, {} discarded",
                    self.name, self.game_state.players[index], msg.command
                );
                if let Some(entry) = self.pending_actions.get_mut(&index) {
                    entry.replies.push(reply);
                }
            }
            Phase::Finished => {
                let _ = reply.tx.send(self.snapshot(index, false));
            }
            Phase::Active if !self.game_state.players[index].is_alive() => {
                let _ = reply.tx.send(self.snapshot(index, false));
            }
            Phase::Active => {
                if let Some(entry) = self.pending_actions.get_mut(&index) {
                    warn!(
                        "[GameSession {}] second action from {} this turn, self-destructing",
                        self.name, self.game_state.players[index]
                    );
                    entry.action = Action::SelfDestruct;
                    entry.replies.push(reply);
                } else {
                    let action = if self.soft_deadline_passed {
                        debug!(
                            "[GameSession {}] {} was late, {} becomes noop",
                            self.name, self.game_state.players[index], msg.command
                        );
                        Action::Player(Command::Noop)
                    } else {
                        Action::Player(msg.command)
                    };
                    self.pending_actions.insert(
                        index,
                        PendingAction {
                            action,
                            replies: vec![reply],
                        },
                    );
                }
                if all_actions_in(self) {
                    resolve_turn(self, ctx);
                }
            }
        }
        Ok(rx)
    }
}

/// Registry of live matches by name.
pub struct GameSessionManager {
    config: Arc<GameConfig>,
    renderers: RendererFactory,
    sessions: HashMap<String, Addr<GameSession>>,
}

impl GameSessionManager {
    pub fn new(config: Arc<GameConfig>, renderers: RendererFactory) -> Self {
        Self {
            config,
            renderers,
            sessions: HashMap::new(),
        }
    }

    fn create_session(
        &mut self,
        name: &str,
        ctx: &mut Context<Self>,
    ) -> Result<Addr<GameSession>, ArenaError> {
        let game_state = GameState::new(self.config.clone())?;
        let renderer = (self.renderers)(name);
        let session = GameSession::new(
            name.to_string(),
            game_state,
            renderer,
            Some(ctx.address().recipient()),
        )
        .start();
        info!("[GameSessionManager] created match {}", name);
        self.sessions.insert(name.to_string(), session.clone());
        Ok(session)
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl Handler<LookupOrCreate> for GameSessionManager {
    type Result = Result<Addr<GameSession>, ArenaError>;

    fn handle(&mut self, msg: LookupOrCreate, ctx: &mut Context<Self>) -> Self::Result {
        match self.sessions.get(&msg.name) {
            Some(session) => Ok(session.clone()),
            None => self.create_session(&msg.name, ctx),
        }
    }
}

impl Handler<Lookup> for GameSessionManager {
    type Result = Option<Addr<GameSession>>;

    fn handle(&mut self, msg: Lookup, _: &mut Context<Self>) -> Self::Result {
        self.sessions.get(&msg.name).cloned()
    }
}

impl Handler<MatchFinished> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: MatchFinished, _: &mut Context<Self>) -> Self::Result {
        // A newer match may already own the name.
        if self.sessions.get(&msg.name) == Some(&msg.session) {
            self.sessions.remove(&msg.name);
            info!("[GameSessionManager] removed match {}", msg.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::game::types::{Cell, GameStatus};
    use crate::render::{PlayerStatus, RenderError, no_renderers};

    /// Renderer keeping the messages it was given.
    struct Recording(Arc<Mutex<Vec<(MessageKind, String)>>>);

    impl Renderer for Recording {
        fn message(&mut self, text: &str, kind: MessageKind) -> Result<(), RenderError> {
            self.0.lock().unwrap().push((kind, text.to_string()));
            Ok(())
        }

        fn set_status(&mut self, _: &[PlayerStatus]) -> Result<(), RenderError> {
            Ok(())
        }

        fn update(&mut self, _: &[Vec<Cell>]) -> Result<(), RenderError> {
            Err(RenderError::Closed)
        }
    }

    fn quick_config() -> GameConfig {
        GameConfig {
            width: 8,
            height: 6,
            walls: 0,
            turn_timeout: Duration::from_millis(100),
            connect_back_timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(10),
            battery_ticks: 0,
            seed: Some(3),
            ..GameConfig::default()
        }
    }

    fn session(config: GameConfig, renderer: Option<Box<dyn Renderer>>) -> Addr<GameSession> {
        let state = GameState::new(Arc::new(config)).unwrap();
        GameSession::new("test".into(), state, renderer, None).start()
    }

    #[actix::test]
    async fn joins_are_answered_when_the_match_starts() {
        let addr = session(quick_config(), None);
        let (first, mut first_reply) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        assert!(first_reply.try_recv().is_err());

        let (second, second_reply) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        assert_ne!(first, second);

        let a = first_reply.await.unwrap();
        let b = second_reply.await.unwrap();
        assert_eq!(a.status, GameStatus::Running);
        assert!(a.config.is_some());
        assert!(b.config.is_some());
        assert!(a.grid.contains('X') && a.grid.contains('O'));

        let full = addr.send(Join { moniker: "c".into() }).await.unwrap();
        assert!(matches!(full, Err(ArenaError::MatchFull { limit: 2 })));
    }

    #[actix::test]
    async fn turn_resolves_once_everyone_acted() {
        let addr = session(quick_config(), None);
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        let start = ra.await.unwrap();
        rb.await.unwrap();

        let ra = addr.send(Act { player_id: a, command: Command::RotateRight }).await.unwrap().unwrap();
        let rb = addr.send(Act { player_id: b, command: Command::Noop }).await.unwrap().unwrap();
        let after = ra.await.unwrap();
        rb.await.unwrap();

        assert_eq!(after.orientation, start.orientation.right());
        assert_eq!(after.health, start.health - 1);
        assert!(after.config.is_none());
    }

    #[actix::test]
    async fn second_action_in_a_turn_self_destructs() {
        let addr = session(quick_config(), None);
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        ra.await.unwrap();
        rb.await.unwrap();

        let first = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let second = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let other = addr.send(Act { player_id: b, command: Command::Noop }).await.unwrap().unwrap();

        assert_eq!(first.await.unwrap().status, GameStatus::Lost);
        assert_eq!(second.await.unwrap().status, GameStatus::Lost);
        assert_eq!(other.await.unwrap().status, GameStatus::Won);

        let late = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        assert_eq!(late.await.unwrap().status, GameStatus::Lost);
    }

    #[actix::test]
    async fn silent_player_is_self_destructed_at_the_hard_deadline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let renderer: Box<dyn Renderer> = Box::new(Recording(log.clone()));
        let addr = session(quick_config(), Some(renderer));
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (_b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        ra.await.unwrap();
        rb.await.unwrap();

        let reply = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let state = reply.await.unwrap();
        assert_eq!(state.status, GameStatus::Won);

        let messages = log.lock().unwrap().clone();
        let kinds: Vec<MessageKind> = messages.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, vec![MessageKind::GameStart, MessageKind::Generic, MessageKind::GameOver]);
        assert_eq!(messages[0].1, "Ready? Fight!");
        assert_eq!(messages[2].1, "a wins!");
    }

    #[actix::test]
    async fn late_action_is_downgraded_to_noop() {
        let addr = session(quick_config(), None);
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        let start = ra.await.unwrap();
        rb.await.unwrap();

        let ra = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        actix::clock::sleep(Duration::from_millis(180)).await;
        let rb = addr.send(Act { player_id: b, command: Command::RotateLeft }).await.unwrap().unwrap();

        ra.await.unwrap();
        let b_state = rb.await.unwrap();
        assert_eq!(b_state.status, GameStatus::Running);
        assert_eq!(b_state.orientation, start.orientation);
    }

    #[actix::test]
    async fn unknown_player_is_rejected() {
        let addr = session(quick_config(), None);
        let stranger = uuid::Uuid::new_v4();
        let result = addr.send(Act { player_id: stranger, command: Command::Noop }).await.unwrap();
        assert!(matches!(result, Err(ArenaError::UnknownPlayer(id)) if id == stranger));
    }

    #[actix::test]
    async fn registry_reuses_name_after_match_finishes() {
        let manager = GameSessionManager::new(Arc::new(quick_config()), no_renderers()).start();
        let first = manager.send(LookupOrCreate { name: "m".into() }).await.unwrap().unwrap();
        let again = manager.send(LookupOrCreate { name: "m".into() }).await.unwrap().unwrap();
        assert!(first == again);
        assert!(manager.send(Lookup { name: "other".into() }).await.unwrap().is_none());

        let (a, ra) = first.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (b, rb) = first.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        ra.await.unwrap();
        rb.await.unwrap();
        let ra = first.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let r2 = first.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let rb = first.send(Act { player_id: b, command: Command::Noop }).await.unwrap().unwrap();
        ra.await.unwrap();
        r2.await.unwrap();
        rb.await.unwrap();

        // MatchFinished travels through the registry's mailbox.
        actix::clock::sleep(Duration::from_millis(20)).await;
        assert!(manager.send(Lookup { name: "m".into() }).await.unwrap().is_none());
        let fresh = manager.send(LookupOrCreate { name: "m".into() }).await.unwrap().unwrap();
        assert!(fresh != first);
    }

    #[actix::test]
    async fn missing_grid_file_fails_creation() {
        let config = GameConfig {
            grid_file: Some("/nonexistent/arena.txt".into()),
            ..quick_config()
        };
        let manager = GameSessionManager::new(Arc::new(config), no_renderers()).start();
        let result = manager.send(LookupOrCreate { name: "m".into() }).await.unwrap();
        assert!(matches!(result, Err(ArenaError::Grid(_))));
        assert!(manager.send(Lookup { name: "m".into() }).await.unwrap().is_none());
    }

    #[actix::test]
    async fn without_hard_deadline_turn_resolves_at_soft_deadline() {
        let config = GameConfig {
            connect_back_timeout: Duration::ZERO,
            ..quick_config()
        };
        let addr = session(config, None);
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let (_b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();
        let start = ra.await.unwrap();
        rb.await.unwrap();

        let reply = addr.send(Act { player_id: a, command: Command::Noop }).await.unwrap().unwrap();
        let state = reply.await.unwrap();

        // The silent player was not self-destructed.
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.health, start.health - 1);
    }

    #[actix::test]
    async fn command_before_the_start_is_discarded() {
        let addr = session(quick_config(), None);
        let (a, ra) = addr.send(Join { moniker: "a".into() }).await.unwrap().unwrap();
        let early = addr.send(Act { player_id: a, command: Command::FireLaser }).await.unwrap().unwrap();
        let (_b, rb) = addr.send(Join { moniker: "b".into() }).await.unwrap().unwrap();

        let joined = ra.await.unwrap();
        let early = early.await.unwrap();
        rb.await.unwrap();

        assert!(joined.config.is_some());
        assert!(early.config.is_none());
        assert_eq!(early.status, GameStatus::Running);
        assert_eq!(early.energy, joined.energy);
        assert_eq!(early.grid, joined.grid);
        assert!(!early.grid.contains('L'));
    }

    #[actix::test]
    async fn dead_player_is_answered_at_once() {
        let config = GameConfig { num_players: 3, ..quick_config() };
        let addr = session(config, None);
        let mut ids = Vec::new();
        let mut joins = Vec::new();
        for name in ["a", "b", "c"] {
            let (id, reply) = addr.send(Join { moniker: name.into() }).await.unwrap().unwrap();
            ids.push(id);
            joins.push(reply);
        }
        for reply in joins {
            reply.await.unwrap();
        }

        // Two commands in one turn kill the first player.
        let mut replies = Vec::new();
        for id in [ids[0], ids[0], ids[1], ids[2]] {
            replies.push(addr.send(Act { player_id: id, command: Command::Noop }).await.unwrap().unwrap());
        }
        let mut states = Vec::new();
        for reply in replies {
            states.push(reply.await.unwrap());
        }
        assert_eq!(states[0].health, 0);
        assert_eq!(states[2].status, GameStatus::Running);

        let mut dead = addr.send(Act { player_id: ids[0], command: Command::MoveForward }).await.unwrap().unwrap();
        let now = dead.try_recv().unwrap();
        assert_eq!(now.health, 0);

        let mut rb = addr.send(Act { player_id: ids[1], command: Command::Noop }).await.unwrap().unwrap();
        assert!(rb.try_recv().is_err());
        let rc = addr.send(Act { player_id: ids[2], command: Command::Noop }).await.unwrap().unwrap();
        let b_state = rb.await.unwrap();
        let c_state = rc.await.unwrap();
        assert_eq!(b_state.health, states[2].health - 1);
        assert_eq!(c_state.status, GameStatus::Running);
    }
}
