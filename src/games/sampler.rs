//! Feature sampler: a small game exercising every generic primitive.
//!
//! Players reveal face-down tiles for gold and spend gold to claim revealed
//! tiles. Each claim advances the player's score track; filling it wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Context, MoveArgs, PlayerMap, SetupContext, TurnConfig};
use crate::definition::{GameDefinition, MoveSpec};
use crate::error::{DefinitionError, MoveError};
use crate::primitives::{Board, Cell, GamePiece, ResourcePool, Slot, SquareBoard, Track};
use crate::rules::GameResult;
use crate::validation::ArgKind;

pub const GOLD: &str = "gold";

/// Gold spent per claim.
pub const CLAIM_COST: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerPlayer {
    pub resources: ResourcePool,
    pub score: Track,
    pub claimed: Slot<GamePiece>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerState {
    pub board: SquareBoard<GamePiece>,
    pub players: PlayerMap<SamplerPlayer>,
    /// Next piece number, so ids are stable across replicas.
    pub next_piece: u32,
}

/// `(rows, cols)` for a player count.
#[must_use]
pub fn board_size(num_players: usize) -> (usize, usize) {
    match num_players {
        3 => (4, 3),
        4 => (4, 4),
        _ => (3, 3),
    }
}

fn setup(ctx: &mut SetupContext<'_>, _data: Option<&Value>) -> SamplerState {
    let (rows, cols) = board_size(ctx.num_players);
    let goal = rows * cols / ctx.num_players.max(1);

    SamplerState {
        board: Board::new(rows, cols, |_, _| Cell::face_down()),
        players: PlayerMap::new(ctx.num_players, |_| SamplerPlayer {
            resources: ResourcePool::new().with(GOLD, 0),
            score: Track::new(0, goal as i32, 0, "Score"),
            claimed: Slot::new(goal, "Claimed"),
        }),
        next_piece: 0,
    }
}

fn reveal_tile(state: &mut SamplerState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let (row, col) = (args.index(0)?, args.index(1)?);

    let cell = state.board.get(row, col)?;
    if !cell.face_down {
        return Err(MoveError::because("Tile is already revealed"));
    }

    state.board.flip(row, col, false)?;
    let player = state
        .players
        .get_mut(ctx.current_player)
        .ok_or_else(|| MoveError::fault("current player has no seat"))?;
    player.resources.add(GOLD, 1);
    Ok(())
}

fn claim_tile(state: &mut SamplerState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let (row, col) = (args.index(0)?, args.index(1)?);

    let cell = state.board.get(row, col)?;
    if cell.face_down {
        return Err(MoveError::because("Tile must be revealed first"));
    }
    if cell.is_occupied() {
        return Err(MoveError::because("Tile is already claimed"));
    }

    let player = state
        .players
        .get_mut(ctx.current_player)
        .ok_or_else(|| MoveError::fault("current player has no seat"))?;
    player.resources.remove(GOLD, CLAIM_COST)?;

    let piece = GamePiece {
        id: format!("p{}", state.next_piece),
        kind: "claim".to_string(),
        owner: Some(ctx.current_player),
    };
    state.next_piece += 1;

    player.claimed.add(piece.clone())?;
    player.score.advance(1);
    state.board.place_piece(row, col, piece)?;
    Ok(())
}

fn end_if(state: &SamplerState) -> Option<GameResult> {
    state
        .players
        .iter()
        .find(|(_, p)| p.score.is_at_max())
        .map(|(pid, _)| GameResult::Winner(pid))
}

const COORDS: &[ArgKind] = &[ArgKind::Index, ArgKind::Index];

/// The sampler definition.
pub fn game_def() -> Result<GameDefinition<SamplerState>, DefinitionError> {
    GameDefinition::builder("sampler", setup)
        .display_name("Feature Sampler")
        .description("A feature sampler showcasing boards, resources, tracks, and slots.")
        .players(2, 4)
        .move_spec("revealTile", MoveSpec::new(reveal_tile).args(COORDS))
        .move_spec("claimTile", MoveSpec::new(claim_tile).args(COORDS))
        .turn(TurnConfig::single_move())
        .end_if(end_if)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameRng, Move, PlayerId};

    fn fresh(num_players: usize) -> SamplerState {
        let mut rng = GameRng::new(0);
        setup(&mut SetupContext::new(num_players, &mut rng), None)
    }

    #[test]
    fn test_board_sizes_and_goal() {
        let two = fresh(2);
        assert_eq!((two.board.rows(), two.board.cols()), (3, 3));
        assert_eq!(two.players[PlayerId::new(0)].score.max(), 4);

        let three = fresh(3);
        assert_eq!((three.board.rows(), three.board.cols()), (4, 3));
        assert_eq!(three.players[PlayerId::new(2)].claimed.capacity(), 4);

        let four = fresh(4);
        assert_eq!(four.board.len(), 16);
        assert_eq!(four.players[PlayerId::new(3)].score.max(), 4);
    }

    #[test]
    fn test_reveal_then_claim() {
        let mut state = fresh(2);
        let mut rng = GameRng::new(0);
        let mut ctx = Context::new(PlayerId::new(0), 2, 1, &mut rng);
        let at = |r: usize, c: usize| Move::with_args("x", [r, c]).args;

        reveal_tile(&mut state, &mut ctx, &at(1, 1)).unwrap();
        assert!(reveal_tile(&mut state, &mut ctx, &at(1, 1)).is_err());

        state.players[PlayerId::new(0)].resources.add(GOLD, 1);
        claim_tile(&mut state, &mut ctx, &at(1, 1)).unwrap();

        let me = &state.players[PlayerId::new(0)];
        assert_eq!(me.resources.get(GOLD), 0);
        assert_eq!(me.score.position(), 1);
        assert_eq!(me.claimed.items()[0].id, "p0");
        assert_eq!(state.board.get(1, 1).unwrap().pieces.len(), 1);
        assert_eq!(state.next_piece, 1);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut state = fresh(2);
        let mut rng = GameRng::new(0);
        let mut ctx = Context::new(PlayerId::new(0), 2, 1, &mut rng);

        let err = reveal_tile(&mut state, &mut ctx, &Move::with_args("x", [3, 0]).args).unwrap_err();
        assert!(matches!(err, MoveError::Invalid(Some(_))));
    }

    #[test]
    fn test_end_if_on_full_track() {
        let mut state = fresh(2);
        assert_eq!(end_if(&state), None);

        state.players[PlayerId::new(1)].score.advance(10);
        assert_eq!(end_if(&state), Some(GameResult::Winner(PlayerId::new(1))));
    }
}
