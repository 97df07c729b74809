//! Move validation layer.
//!
//! Runs before any move handler, independently of the handler's own legality
//! checks. A `Verdict::Reject` means the handler is never invoked and the
//! state is never touched; the reason is surfaced to the caller as-is.
//!
//! Checks, in order:
//! 1. the requesting player holds a seat in the match
//! 2. the move exists in the game definition
//! 3. the requester holds the turn (unless the move is turn-exempt)
//! 4. the arguments match the move's declared signature, if any
//! 5. the definition's own `validate_move` hook, if any

mod validator;

pub use validator::{check_args, validate_move};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Move, PlayerId};

/// Outcome of validating a move request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Allow,
    Reject(String),
}

impl Verdict {
    /// Reject with a reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Verdict::Reject(reason.into())
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allow => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Allow,
            Err(reason) => Verdict::Reject(reason),
        }
    }
}

/// Expected shape of one positional argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// Any JSON string.
    Str,
    /// Any integer.
    Int,
    /// A non-negative integer (board coordinates, list positions).
    Index,
    /// An integer of at least 1 (quantities).
    PositiveInt,
    Bool,
    /// A string from a fixed set.
    OneOf(&'static [&'static str]),
    /// Anything; the handler checks it.
    Any,
}

impl ArgKind {
    /// Whether `value` has this shape.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ArgKind::Str => value.is_string(),
            ArgKind::Int => value.as_i64().is_some(),
            ArgKind::Index => value.as_u64().is_some(),
            ArgKind::PositiveInt => value.as_u64().is_some_and(|n| n >= 1),
            ArgKind::Bool => value.is_boolean(),
            ArgKind::OneOf(options) => value.as_str().is_some_and(|s| options.contains(&s)),
            ArgKind::Any => true,
        }
    }

    /// Short description used in rejection reasons.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ArgKind::Str => "a string".to_string(),
            ArgKind::Int => "an integer".to_string(),
            ArgKind::Index => "a non-negative integer".to_string(),
            ArgKind::PositiveInt => "a positive integer".to_string(),
            ArgKind::Bool => "a boolean".to_string(),
            ArgKind::OneOf(options) => format!("one of {}", options.join(", ")),
            ArgKind::Any => "any value".to_string(),
        }
    }
}

/// Everything the validation layer sees about a request.
#[derive(Clone, Copy, Debug)]
pub struct ValidationRequest<'a> {
    /// Player submitting the move.
    pub player: PlayerId,

    /// Player holding the turn.
    pub current_player: PlayerId,

    /// Seated players.
    pub num_players: usize,

    /// The requested move.
    pub mv: &'a Move,
}

impl<'a> ValidationRequest<'a> {
    /// Whether the requester holds the turn.
    #[must_use]
    pub fn is_own_turn(&self) -> bool {
        self.player == self.current_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_kind_accepts() {
        assert!(ArgKind::Str.accepts(&json!("0,0")));
        assert!(!ArgKind::Str.accepts(&json!(3)));

        assert!(ArgKind::Int.accepts(&json!(-2)));
        assert!(!ArgKind::Int.accepts(&json!(1.5)));

        assert!(ArgKind::Index.accepts(&json!(0)));
        assert!(!ArgKind::Index.accepts(&json!(-1)));

        assert!(ArgKind::PositiveInt.accepts(&json!(1)));
        assert!(!ArgKind::PositiveInt.accepts(&json!(0)));

        assert!(ArgKind::Bool.accepts(&json!(true)));
        assert!(ArgKind::Any.accepts(&json!(null)));
    }

    #[test]
    fn test_one_of() {
        let colors = ArgKind::OneOf(&["red", "blue"]);
        assert!(colors.accepts(&json!("red")));
        assert!(!colors.accepts(&json!("purple")));
        assert!(!colors.accepts(&json!(1)));
        assert_eq!(colors.describe(), "one of red, blue");
    }

    #[test]
    fn test_verdict_from_result() {
        assert_eq!(Verdict::from(Ok(())), Verdict::Allow);
        let verdict = Verdict::from(Err("Not your turn".to_string()));
        assert_eq!(verdict.reason(), Some("Not your turn"));
        assert!(!verdict.is_allowed());
    }
}
