//! Presentation collaborators.
//!
//! A renderer receives point-in-time copies of a match at tick boundaries and
//! lifecycle transitions. It is best-effort: the orchestrator logs its errors
//! and carries on.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::game::types::Cell;

pub mod console;

pub use console::ConsoleRenderer;

/// Suffix of match names that get a console renderer.
pub const SCREEN_SUFFIX: &str = ":screen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Generic,
    GameStart,
    GameOver,
}

/// Health and energy of one player as ratios in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub moniker: String,
    pub health: f64,
    pub energy: f64,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait Renderer {
    fn message(&mut self, text: &str, kind: MessageKind) -> Result<(), RenderError>;

    /// At most two entries.
    fn set_status(&mut self, statuses: &[PlayerStatus]) -> Result<(), RenderError>;

    fn update(&mut self, cells: &[Vec<Cell>]) -> Result<(), RenderError>;
}

/// Builds the renderer, if any, for a newly created match.
pub type RendererFactory = Arc<dyn Fn(&str) -> Option<Box<dyn Renderer>> + Send + Sync>;

/// Console renderer for matches named `<name>:screen`, none otherwise.
pub fn screen_renderers() -> RendererFactory {
    Arc::new(|name: &str| {
        name.strip_suffix(SCREEN_SUFFIX)
            .map(|title| Box::new(ConsoleRenderer::stdout(title)) as Box<dyn Renderer>)
    })
}

/// No presentation at all.
pub fn no_renderers() -> RendererFactory {
    Arc::new(|_: &str| None)
}
