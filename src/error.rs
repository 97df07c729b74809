//! Error types shared across the engine.
//!
//! Rejections are not errors: an illegal move is reported as
//! `Transition::Rejected` / `MoveOutcome::Rejected` with a reason. The types
//! here cover genuinely broken inputs, handler bugs and plugin failures.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a generic primitive operation. State is unchanged whenever one
/// of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("not enough {kind}: requested {requested}, available {available}")]
    InsufficientResource {
        kind: String,
        requested: u32,
        available: u32,
    },

    #[error("slot '{label}' is full (capacity {capacity})")]
    SlotFull { label: String, capacity: usize },

    /// Stored data that breaks a primitive's own invariant, rejected while
    /// deserializing.
    #[error("inconsistent {kind}: {reason}")]
    Inconsistent { kind: &'static str, reason: String },
}

/// What a move handler reports when it does not apply.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The move is illegal in the current state. The engine discards the
    /// working copy and reports a rejection.
    #[error("{}", .0.as_deref().unwrap_or("invalid move"))]
    Invalid(Option<String>),

    /// The handler hit a condition that indicates a bug rather than an
    /// illegal move. Surfaced as `EngineError::HandlerFault`.
    #[error("internal fault: {0}")]
    Fault(String),
}

impl MoveError {
    /// A bare rejection with no explanation.
    pub const INVALID: MoveError = MoveError::Invalid(None);

    /// A rejection carrying a human-readable reason.
    pub fn because(reason: impl Into<String>) -> Self {
        MoveError::Invalid(Some(reason.into()))
    }

    /// A handler-internal fault.
    pub fn fault(message: impl Into<String>) -> Self {
        MoveError::Fault(message.into())
    }
}

impl From<PrimitiveError> for MoveError {
    fn from(err: PrimitiveError) -> Self {
        MoveError::because(err.to_string())
    }
}

/// A game definition failed its one-time structural check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("game id must be non-empty and use only [a-z0-9_-], got '{0}'")]
    InvalidId(String),

    #[error("game '{id}': min_players must be at least 1")]
    NoPlayers { id: String },

    #[error("game '{id}': min_players {min} exceeds max_players {max}")]
    PlayerBounds { id: String, min: usize, max: usize },

    #[error("game '{id}' defines no moves")]
    NoMoves { id: String },

    #[error("game '{id}' has a move with an empty name")]
    EmptyMoveName { id: String },

    #[error("game '{id}': invalid turn bounds (min {min}, max {max})")]
    TurnBounds { id: String, min: u32, max: u32 },
}

/// Failure while driving a match.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("match has not started")]
    NotStarted,

    #[error("match has already started")]
    AlreadyStarted,

    #[error("game '{game}' supports {min}-{max} players, requested {requested}")]
    PlayerCount {
        game: String,
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("move '{move_name}' in game '{game}' faulted: {message}")]
    HandlerFault {
        game: String,
        move_name: String,
        message: String,
    },

    #[error("game state does not match the payload of game '{game}': {source}")]
    State {
        game: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("game '{0}' is not backed by the requested state type")]
    WrongGameType(String),

    #[error("snapshot of game '{game}' is inconsistent: {reason}")]
    Snapshot { game: String, reason: String },
}

/// Failure importing a single plugin bundle. The loader logs it and moves on.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    #[error("failed to open bundle {path}: {source}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("bundle {0} does not declare a game plugin")]
    MissingDeclaration(PathBuf),

    #[error("bundle {path} was built for {found}, host expects {expected}")]
    AbiMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bundle {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Importing the bundle panicked. The panic is contained to this bundle.
    #[error("bundle {path} panicked while loading: {message}")]
    Panicked { path: PathBuf, message: String },
}
