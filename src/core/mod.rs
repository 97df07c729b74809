//! Core engine types: players, moves, state, context, RNG, configuration.
//!
//! This module contains the game-agnostic building blocks. Games describe
//! themselves through `GameMetadata` and `TurnConfig` rather than changing
//! anything here.

pub mod player;
pub mod rng;
pub mod config;
pub mod moves;
pub mod state;
pub mod context;

pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use rng::{GameRng, GameRngState};
pub use config::{GameMetadata, TurnConfig};
pub use moves::{Move, MoveArgs, MoveRecord};
pub use state::GameState;
pub use context::{Context, SetupContext};
