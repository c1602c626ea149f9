// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the components around the simulation core:
//! - Application state, the `join` / `act` facade
//! - HTTP routing
//! - Game session orchestration (match lifecycle, turn collection, registry)
//! - HTTP error bodies

pub mod state;
pub mod router;
pub mod game_session;
pub mod http_error;
