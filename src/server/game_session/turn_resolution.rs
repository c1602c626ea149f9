/// Action collection and turn resolution for GameSession.
/// Deadlines are measured from the start of collection and checked on an interval.

use std::time::Instant;

use actix::prelude::*;
use log::{debug, info, warn};

use crate::game::systems::Outcome;
use crate::game::types::Action;
use crate::render::MessageKind;
use crate::server::game_session::server::{GameSession, PendingAction, render_tick};

/// Open a new collection window and start polling its deadlines.
pub fn start_collection(this: &mut GameSession, ctx: &mut Context<GameSession>) {
    this.collection_start = Some(Instant::now());
    this.soft_deadline_passed = false;
    debug!("[GameSession {}] collecting turn {}", this.name, this.game_state.turn);

    let poll = this.game_state.config.poll_interval;
    let handle = ctx.run_interval(poll, |act, ctx| check_deadlines(act, ctx));
    this.turn_timer = Some(handle);
}

/// Whether every living player has an action for this turn.
pub fn all_actions_in(this: &GameSession) -> bool {
    this.game_state
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alive())
        .all(|(i, _)| this.pending_actions.contains_key(&i))
}

/// Soft deadline: later actions become noops. Hard deadline: silent players
/// self-destruct and the turn resolves. Without a hard deadline the turn
/// resolves as soon as the soft one passes.
pub fn check_deadlines(this: &mut GameSession, ctx: &mut Context<GameSession>) {
    let Some(start) = this.collection_start else {
        return;
    };
    let elapsed = start.elapsed();
    let soft = this.game_state.config.turn_timeout;
    let hard = this.game_state.config.connect_back_timeout;

    if !this.soft_deadline_passed && !soft.is_zero() && elapsed >= soft {
        this.soft_deadline_passed = true;
        warn!("[GameSession {}] turn {} timed out", this.name, this.game_state.turn);
        this.render_message("someone's not responding...", MessageKind::Generic);
        if hard.is_zero() {
            resolve_turn(this, ctx);
            return;
        }
    }

    if !hard.is_zero() && elapsed >= hard {
        for (i, player) in this.game_state.players.iter().enumerate() {
            if player.is_alive() && !this.pending_actions.contains_key(&i) {
                warn!("[GameSession {}] {} did not answer, self-destructing", this.name, player);
                this.pending_actions.insert(
                    i,
                    PendingAction {
                        action: Action::SelfDestruct,
                        replies: Vec::new(),
                    },
                );
            }
        }
        resolve_turn(this, ctx);
    }
}

/// Run the collected actions through the simulation and answer every caller.
pub fn resolve_turn(this: &mut GameSession, ctx: &mut Context<GameSession>) {
    if let Some(handle) = this.turn_timer.take() {
        ctx.cancel_future(handle);
    }
    this.collection_start = None;

    let pending = std::mem::take(&mut this.pending_actions);
    let mut actions: Vec<(usize, Action)> = pending.iter().map(|(i, p)| (*i, p.action)).collect();
    actions.sort_by_key(|(i, _)| *i);
    debug!("[GameSession {}] resolving turn {}: {:?}", this.name, this.game_state.turn, actions);

    let name = &this.name;
    let renderer = &mut this.renderer;
    let done = this
        .game_state
        .resolve_turn(&actions, |state| render_tick(name, renderer, state));

    if done {
        let text = match this.game_state.outcome() {
            Some(Outcome::Winner(i)) => format!("{} wins!", this.game_state.players[i].moniker),
            _ => "It's a draw :(".to_string(),
        };
        info!("[GameSession {}] {}", this.name, text);
        this.render_message(&text, MessageKind::GameOver);
        this.finish(ctx);
        this.send_replies(pending);
    } else {
        this.send_replies(pending);
        start_collection(this, ctx);
    }
}
