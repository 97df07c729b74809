//! Results of applying moves and of finished matches.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, PlayerId};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (team games, shared victory).
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// What one move application produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition<S> {
    /// The handler accepted the move; this is the new state.
    Applied(GameState<S>),
    /// The move was illegal; the old state stands.
    Rejected(String),
}

impl<S> Transition<S> {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }

    /// The new state, if the move was applied.
    pub fn into_state(self) -> Option<GameState<S>> {
        match self {
            Transition::Applied(state) => Some(state),
            Transition::Rejected(_) => None,
        }
    }
}

/// Outcome of a move submitted to a running match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    Accepted {
        /// Player holding the turn after this move.
        next_player: PlayerId,
        /// Set when this move ended the match.
        result: Option<GameResult>,
    },
    Rejected {
        reason: String,
    },
}

impl MoveOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        MoveOutcome::Rejected {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Accepted { .. })
    }

    /// Rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            MoveOutcome::Rejected { reason } => Some(reason),
            MoveOutcome::Accepted { .. } => None,
        }
    }
}
