//! Game state: per-game payload plus an append-only move history.
//!
//! A `GameState` is created exactly once per match by the game's setup
//! function. After that it is only ever replaced, never mutated in place:
//! the rules engine applies each move against a working copy and hands the
//! copy back as the new state. History uses an `im` persistent vector so the
//! working copy costs O(1) to make.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::moves::MoveRecord;

/// The state of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: serde::de::DeserializeOwned"
))]
pub struct GameState<S> {
    /// Game-specific payload (board, pools, players...).
    pub payload: S,

    /// Accepted moves, oldest first.
    history: Vector<MoveRecord>,
}

impl<S> GameState<S> {
    /// Wrap a freshly set-up payload with an empty history.
    #[must_use]
    pub fn new(payload: S) -> Self {
        Self {
            payload,
            history: Vector::new(),
        }
    }

    /// Rebuild a state from a payload and a previously recorded history.
    ///
    /// Used at the host boundary where payloads travel as JSON.
    #[must_use]
    pub fn from_parts(payload: S, history: Vector<MoveRecord>) -> Self {
        Self { payload, history }
    }

    /// Accepted moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<MoveRecord> {
        &self.history
    }

    /// Number of accepted moves.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Append a record. Only the rules engine calls this, on its working copy.
    pub(crate) fn record(&mut self, record: MoveRecord) {
        self.history.push_back(record);
    }

    /// Swap the payload type, keeping the history.
    pub fn map_payload<T>(self, f: impl FnOnce(S) -> T) -> GameState<T> {
        GameState {
            payload: f(self.payload),
            history: self.history,
        }
    }

    /// Fallible [`GameState::map_payload`].
    pub fn try_map_payload<T, E>(self, f: impl FnOnce(S) -> Result<T, E>) -> Result<GameState<T>, E> {
        Ok(GameState {
            payload: f(self.payload)?,
            history: self.history,
        })
    }
}
