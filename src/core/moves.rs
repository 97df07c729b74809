//! Move representation: a name plus positional arguments.
//!
//! Moves arrive from the transport with arguments of unspecified shape, so
//! arguments are kept as JSON values. `MoveArgs` gives handlers typed
//! accessors that turn a shape mismatch into a rejection instead
//! of a panic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use super::player::PlayerId;
use crate::error::MoveError;

/// Positional move arguments.
///
/// SmallVec keeps the common 0-3 argument case off the heap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveArgs(pub SmallVec<[Value; 3]>);

impl MoveArgs {
    /// No arguments.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw access to one argument.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Iterate over the raw arguments.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    /// Argument `index` as a string, or a rejection.
    pub fn str(&self, index: usize) -> Result<&str, MoveError> {
        self.get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| MoveError::because(format!("argument {index} must be a string")))
    }

    /// Argument `index` as a signed integer, or a rejection.
    pub fn int(&self, index: usize) -> Result<i64, MoveError> {
        self.get(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| MoveError::because(format!("argument {index} must be an integer")))
    }

    /// Argument `index` as a non-negative index (board coordinate, count).
    pub fn index(&self, index: usize) -> Result<usize, MoveError> {
        self.get(index)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| {
                MoveError::because(format!("argument {index} must be a non-negative integer"))
            })
    }

    /// Argument `index` as a strictly positive quantity.
    pub fn quantity(&self, index: usize) -> Result<u32, MoveError> {
        match self.get(index).and_then(Value::as_u64) {
            Some(v) if v >= 1 && v <= u64::from(u32::MAX) => Ok(v as u32),
            _ => Err(MoveError::because(format!(
                "argument {index} must be a positive integer"
            ))),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for MoveArgs {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A named state-transition request.
///
/// ## Example
///
/// ```
/// use bgf::core::Move;
/// use serde_json::json;
///
/// let pass = Move::new("pass");
/// assert!(pass.args.is_empty());
///
/// let buy = Move::with_args("buyGoods", [json!("1,0"), json!("ore"), json!(2)]);
/// assert_eq!(buy.args.str(1).unwrap(), "ore");
/// assert_eq!(buy.args.quantity(2).unwrap(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Handler name in the game definition.
    pub name: String,

    /// Positional arguments.
    #[serde(default)]
    pub args: MoveArgs,
}

impl Move {
    /// Create a move with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: MoveArgs::none(),
        }
    }

    /// Create a move with the given arguments.
    pub fn with_args<V: Into<Value>>(name: impl Into<String>, args: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// An accepted move, as recorded in the state's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The player whose turn the move was applied on.
    pub player: PlayerId,

    /// The move taken.
    #[serde(rename = "move")]
    pub mv: Move,

    /// Turn number when the move was applied.
    pub turn: u32,

    /// Position of this record in the history (0-based).
    pub sequence: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_no_args() {
        let mv = Move::new("pass");

        assert_eq!(mv.name, "pass");
        assert!(mv.args.is_empty());
    }

    #[test]
    fn test_typed_accessors() {
        let mv = Move::with_args("buyGoods", [json!("0,0"), json!(-3), json!(2)]);

        assert_eq!(mv.args.str(0).unwrap(), "0,0");
        assert_eq!(mv.args.int(1).unwrap(), -3);
        assert_eq!(mv.args.index(2).unwrap(), 2);
        assert!(mv.args.index(1).is_err());
        assert!(mv.args.quantity(1).is_err());
        assert!(mv.args.str(1).is_err());
        assert!(mv.args.str(7).is_err());
    }

    #[test]
    fn test_quantity_rejects_zero() {
        let mv = Move::with_args("sellGoods", [json!(0)]);
        assert_eq!(
            mv.args.quantity(0),
            Err(MoveError::because("argument 0 must be a positive integer"))
        );
    }

    #[test]
    fn test_move_wire_format() {
        let mv: Move = serde_json::from_value(json!({ "name": "revealTile", "args": [0, 2] })).unwrap();
        assert_eq!(mv, Move::with_args("revealTile", [0, 2]));

        let bare: Move = serde_json::from_value(json!({ "name": "pass" })).unwrap();
        assert_eq!(bare, Move::new("pass"));
    }

    #[test]
    fn test_move_record_serialization() {
        let record = MoveRecord {
            player: PlayerId::new(1),
            mv: Move::with_args("explore", ["1,-1"]),
            turn: 2,
            sequence: 5,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["move"]["name"], "explore");

        let back: MoveRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record, back);
    }
}
