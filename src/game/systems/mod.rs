pub mod movement;
pub mod lasers;
pub mod rules;
pub mod render;

pub use movement::*;
pub use lasers::*;
pub use rules::*;
pub use render::*;
