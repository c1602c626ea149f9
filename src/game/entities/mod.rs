//! Game entities module.
//!
//! This module organizes player, laser and battery entity logic.

pub mod player;
pub mod laser;
pub mod battery;
pub mod placement;

pub use player::*;
pub use laser::*;
pub use battery::*;
pub use placement::*;
