//! # bgf
//!
//! A pluggable, deterministic engine for turn-based multiplayer games.
//!
//! ## Design Principles
//!
//! 1. **Games Are Data**: a game is a `GameDefinition` (setup, moves, turn
//!    bounds, optional end condition and validation hook) checked once when
//!    it is built. The engine never interprets game rules.
//!
//! 2. **Deterministic Replicas**: every chance outcome comes from the
//!    per-match `GameRng` carried by the `Context`. The same seed and inputs
//!    reproduce the same state on every replica.
//!
//! 3. **Rejections Leave No Trace**: moves run against a working copy of the
//!    state (and of the RNG) that is committed only when the handler succeeds.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` makes the
//!   working copy cheap.
//!
//! - **Two-Phase Plugins**: `build.rs` compiles in-tree games into an
//!   aggregate registrant; at startup the `PluginLoader` runs it and then
//!   imports external bundles into an explicit `Registry`.
//!
//! ## Modules
//!
//! - `core`: players, moves, state, context, RNG, configuration
//! - `primitives`: boards, resource pools, tracks, bounded slots
//! - `validation`: turn ownership and argument checks run before a handler
//! - `definition`: `GameDefinition`, the `Registry` and the host adapter
//! - `rules`: move application, turn tracking and the match state machine
//! - `plugin`: build-time discovery and run-time loading
//! - `games`: in-tree games

pub mod core;
pub mod error;
pub mod primitives;
pub mod validation;
pub mod definition;
pub mod rules;
pub mod plugin;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, PlayerMap, MAX_PLAYERS,
    GameRng, GameRngState,
    GameMetadata, TurnConfig,
    Move, MoveArgs, MoveRecord,
    GameState, Context, SetupContext,
};

pub use crate::error::{DefinitionError, EngineError, MoveError, PluginLoadError, PrimitiveError};

pub use crate::primitives::{Board, Cell, GamePiece, ResourcePool, Slot, SquareBoard, Track};

pub use crate::validation::{validate_move, ArgKind, ValidationRequest, Verdict};

pub use crate::definition::{
    prepare_game, DynGame, Game, GameDefinition, MoveSpec, Payload, PreparedGame, Registry,
};

pub use crate::rules::{
    apply_move, evaluate_end, setup_state,
    GameResult, Match, MatchPhase, MoveOutcome, MoveRequest, Transition,
};

pub use crate::plugin::{BundleExports, BundleImporter, LoadReport, LoaderConfig, PluginLoader};
