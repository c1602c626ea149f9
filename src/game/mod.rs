//! Grid simulation: the world, its entities, and the tick that advances them.

pub mod types;
pub mod state;

pub mod entities;
pub mod grid;
pub mod systems;


pub use grid::Grid;
pub use state::GameState;
