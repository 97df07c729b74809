use tracing::debug;

use super::{ArgKind, ValidationRequest, Verdict};
use crate::core::{GameState, MoveArgs};
use crate::definition::{GameDefinition, Payload};

/// Validate a move request against a definition and the current state.
///
/// Never calls a move handler and never mutates anything.
pub fn validate_move<S: Payload>(
    def: &GameDefinition<S>,
    state: &GameState<S>,
    request: &ValidationRequest<'_>,
) -> Verdict {
    let verdict = run_checks(def, state, request);
    if let Verdict::Reject(reason) = &verdict {
        debug!(
            game = def.id(),
            player = %request.player,
            move_name = %request.mv.name,
            reason = %reason,
            "move failed validation"
        );
    }
    verdict
}

fn run_checks<S: Payload>(
    def: &GameDefinition<S>,
    state: &GameState<S>,
    request: &ValidationRequest<'_>,
) -> Verdict {
    if !request.player.is_seated(request.num_players) {
        return Verdict::reject(format!("Unknown player {}", request.player));
    }

    let Some(spec) = def.move_spec(&request.mv.name) else {
        return Verdict::reject(format!("Unknown move: {}", request.mv.name));
    };

    if !spec.turn_exempt && !request.is_own_turn() {
        return Verdict::reject("Not your turn");
    }

    if let Some(signature) = spec.args {
        if let Err(reason) = check_args(signature, &request.mv.args) {
            return Verdict::Reject(reason);
        }
    }

    match def.validate_hook() {
        Some(hook) => hook(&state.payload, request),
        None => Verdict::Allow,
    }
}

/// Check positional arguments against a signature.
///
/// Arity must match exactly.
pub fn check_args(signature: &[ArgKind], args: &MoveArgs) -> Result<(), String> {
    if args.len() != signature.len() {
        return Err(format!(
            "Expected {} argument(s), got {}",
            signature.len(),
            args.len()
        ));
    }

    for (position, (kind, value)) in signature.iter().zip(args.iter()).enumerate() {
        if !kind.accepts(value) {
            return Err(format!(
                "Argument {} must be {}",
                position + 1,
                kind.describe()
            ));
        }
    }

    Ok(())
}
