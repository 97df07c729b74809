//! Game definitions and the registry.
//!
//! - `game`: `GameDefinition<S>`, its builder and the handler types
//! - `host`: the type-erased `Game` trait, `prepare_game` and `HostMatch`
//! - `registry`: the process-wide catalog, first registration wins

pub mod game;
pub mod host;
pub mod registry;

pub use game::{
    EndIfFn, GameDefinition, GameDefinitionBuilder, MoveFn, MoveSpec, Payload, SetupFn, ValidateFn,
};
pub use host::{downcast_game, prepare_game, DynGame, Game, GameSummary, HostMatch, PreparedGame};
pub use registry::Registry;
