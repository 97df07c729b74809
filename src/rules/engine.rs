//! Move application and end-condition evaluation.
//!
//! These are pure functions over an immutable `GameState`. A move runs
//! against a working copy of the state and of the RNG; the copies are
//! returned on success and dropped on rejection, so a handler that bails out
//! halfway leaves nothing behind, including any dice it rolled.

use serde_json::Value;
use tracing::{debug, error};

use crate::core::{Context, GameRng, GameState, Move, MoveRecord, SetupContext};
use crate::definition::{GameDefinition, Payload};
use crate::error::{EngineError, MoveError};

use super::outcome::{GameResult, Transition};

/// Build the initial state for `num_players`.
///
/// Fails if the game does not accept that many players.
pub fn setup_state<S: Payload>(
    def: &GameDefinition<S>,
    num_players: usize,
    random: &mut GameRng,
    setup_data: Option<&Value>,
) -> Result<GameState<S>, EngineError> {
    let meta = def.metadata();
    if !meta.accepts_players(num_players) {
        return Err(EngineError::PlayerCount {
            game: meta.id.clone(),
            requested: num_players,
            min: meta.min_players,
            max: meta.max_players,
        });
    }

    let mut ctx = SetupContext::new(num_players, random);
    let payload = (def.setup_fn())(&mut ctx, setup_data);
    debug!(game = def.id(), num_players, "match set up");
    Ok(GameState::new(payload))
}

/// Apply `mv` to `state`.
///
/// `ctx.random` is advanced only when the move is applied. Unknown moves are
/// rejections. A handler fault is an error and is logged.
pub fn apply_move<S: Payload>(
    def: &GameDefinition<S>,
    state: &GameState<S>,
    ctx: &mut Context<'_>,
    mv: &Move,
) -> Result<Transition<S>, EngineError> {
    let Some(spec) = def.move_spec(&mv.name) else {
        debug!(game = def.id(), move_name = %mv.name, "unknown move");
        return Ok(Transition::Rejected(format!("Unknown move: {}", mv.name)));
    };

    let mut working = state.clone();
    let mut rng = ctx.random.clone();
    let mut working_ctx =
        Context::new(ctx.current_player, ctx.num_players, ctx.turn, &mut rng).submitted_by(ctx.player);

    match (spec.handler)(&mut working.payload, &mut working_ctx, &mv.args) {
        Ok(()) => {
            *ctx.random = rng;
            working.record(MoveRecord {
                player: ctx.player,
                mv: mv.clone(),
                turn: ctx.turn,
                sequence: state.move_count(),
            });
            debug!(game = def.id(), player = %ctx.player, move_name = %mv.name, "move applied");
            Ok(Transition::Applied(working))
        }
        Err(MoveError::Invalid(reason)) => {
            let reason = reason.unwrap_or_else(|| "Invalid move".to_string());
            debug!(game = def.id(), player = %ctx.player, move_name = %mv.name, %reason, "move rejected");
            Ok(Transition::Rejected(reason))
        }
        Err(MoveError::Fault(message)) => {
            error!(game = def.id(), move_name = %mv.name, %message, "move handler faulted");
            Err(EngineError::HandlerFault {
                game: def.id().to_string(),
                move_name: mv.name.clone(),
                message,
            })
        }
    }
}

/// Evaluate the definition's end condition, if it has one.
pub fn evaluate_end<S: Payload>(def: &GameDefinition<S>, state: &GameState<S>) -> Option<GameResult> {
    def.end_if_fn().and_then(|end_if| end_if(&state.payload))
}
