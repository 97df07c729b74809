//! Sampler game played through a full match.

use std::sync::Arc;

use bgf::games::sampler::{self, SamplerState, GOLD};
use bgf::rules::{Match, MatchPhase, MoveOutcome, MoveRequest};
use bgf::{GameResult, Move, PlayerId};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn new_match(num_players: usize) -> Match<SamplerState> {
    let def = Arc::new(sampler::game_def().unwrap());
    let mut game = Match::new(def, 7);
    game.start(num_players, None).unwrap();
    game
}

fn play(game: &mut Match<SamplerState>, player: PlayerId, name: &str, row: usize, col: usize) -> MoveOutcome {
    let request = MoveRequest::new(player, Move::with_args(name, [row, col]));
    game.submit(&request).unwrap()
}

fn payload(game: &Match<SamplerState>) -> &SamplerState {
    &game.state().unwrap().payload
}

#[test]
fn test_reveal_grants_gold_and_claim_needs_reveal() {
    let mut game = new_match(2);
    assert_eq!(payload(&game).board.len(), 9);

    let outcome = play(&mut game, P0, "revealTile", 0, 0);
    assert!(outcome.is_accepted());

    let state = payload(&game);
    assert!(!state.board.get(0, 0).unwrap().face_down);
    assert_eq!(state.players[P0].resources.get(GOLD), 1);

    // Claiming a cell that was never revealed.
    let outcome = play(&mut game, P1, "claimTile", 1, 1);
    assert_eq!(outcome.reason(), Some("Tile must be revealed first"));
    assert_eq!(game.current_player(), Some(P1));
}

#[test]
fn test_rejected_claim_leaves_state_unchanged() {
    let mut game = new_match(2);
    play(&mut game, P0, "revealTile", 0, 0);
    play(&mut game, P1, "revealTile", 0, 1);

    // P0 has 1 gold, a claim costs 2.
    let before = game.state().unwrap().clone();
    let outcome = play(&mut game, P0, "claimTile", 0, 0);

    assert!(!outcome.is_accepted());
    assert_eq!(game.state().unwrap(), &before);
    assert_eq!(game.current_player(), Some(P0));
}

#[test]
fn test_out_of_turn_and_malformed_moves_rejected() {
    let mut game = new_match(2);

    assert_eq!(play(&mut game, P1, "revealTile", 0, 0).reason(), Some("Not your turn"));

    let bad_args = MoveRequest::new(P0, Move::with_args("revealTile", ["a", "b"]));
    assert!(!game.submit(&bad_args).unwrap().is_accepted());

    let unknown = MoveRequest::new(P0, Move::new("flipTable"));
    assert_eq!(game.submit(&unknown).unwrap().reason(), Some("Unknown move: flipTable"));

    assert_eq!(game.state().unwrap().move_count(), 0);
}

#[test]
fn test_turns_rotate_and_history_records_players() {
    let mut game = new_match(3);
    assert_eq!(payload(&game).board.rows(), 4);

    for (player, col) in [(P0, 0), (P1, 1), (PlayerId::new(2), 2)] {
        assert!(play(&mut game, player, "revealTile", 0, col).is_accepted());
    }

    assert_eq!(game.current_player(), Some(P0));
    let players: Vec<_> = game.state().unwrap().history().iter().map(|r| r.player).collect();
    assert_eq!(players, vec![P0, P1, PlayerId::new(2)]);
    assert_eq!(game.result(), None::<&GameResult>);
    assert_eq!(game.phase(), MatchPhase::InProgress);
}
