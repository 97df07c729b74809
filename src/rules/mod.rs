//! Rules engine: the match state machine.
//!
//! - `engine`: pure setup, move application and end-condition evaluation
//! - `turns`: round-robin turn order with min/max moves per turn
//! - `session`: `Match`, which drives one match through
//!   NotStarted -> InProgress -> Ended
//! - `outcome`: transition, outcome and result types
//!
//! The engine never interprets game rules. It trusts the context it builds
//! and leaves turn ownership to the validation layer.

pub mod engine;
pub mod turns;
pub mod session;
pub mod outcome;

pub use engine::{apply_move, evaluate_end, setup_state};
pub use turns::TurnTracker;
pub use session::{Match, MatchInput, MatchPhase, MatchSnapshot, MoveRequest};
pub use outcome::{GameResult, MoveOutcome, Transition};
