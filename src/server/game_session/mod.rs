pub mod server;
pub mod messages;
pub mod turn_resolution;

pub use server::{GameSession, GameSessionManager};
