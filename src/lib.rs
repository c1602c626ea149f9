//! Turn-based laser arena: grid simulation, per-match turn orchestration and
//! the HTTP surface around them.

pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod server;
