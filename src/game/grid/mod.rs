//! Toroidal grid module.
//!
//! This module owns the cell array, wraparound arithmetic, wall layouts and
//! the per-player text serialization.

pub mod grid;

pub use grid::*;
