//! A single match: the NotStarted -> InProgress -> Ended state machine.
//!
//! `Match` owns the state, the seeded RNG and the turn tracker of one match
//! and is the single writer for all three. Every submitted move goes through
//! validation, then `apply_move`, then the end condition. Distinct matches
//! share nothing and may run on different threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::{Context, GameRng, GameRngState, GameState, Move, PlayerId};
use crate::definition::{GameDefinition, Payload};
use crate::error::EngineError;
use crate::validation::{validate_move, ValidationRequest, Verdict};

use super::engine::{apply_move, evaluate_end, setup_state};
use super::outcome::{GameResult, MoveOutcome, Transition};
use super::turns::TurnTracker;

/// Lifecycle phase of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    NotStarted,
    InProgress,
    Ended,
}

/// A move as it arrives from the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Requesting player.
    pub player: PlayerId,

    #[serde(rename = "move")]
    pub mv: Move,
}

impl MoveRequest {
    pub fn new(player: PlayerId, mv: Move) -> Self {
        Self { player, mv }
    }
}

/// One input to a match, in the order it was received. Replaying the same
/// inputs from the same seed reproduces the match exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchInput {
    Move(MoveRequest),
    EndTurn { player: PlayerId },
}

/// Serializable image of an in-progress or ended match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: serde::de::DeserializeOwned"
))]
pub struct MatchSnapshot<S> {
    pub game_id: String,
    pub num_players: usize,
    pub phase: MatchPhase,
    pub state: GameState<S>,
    pub turns: TurnTracker,
    pub rng: GameRngState,
    pub result: Option<GameResult>,
}

#[derive(Debug)]
struct Running<S> {
    state: GameState<S>,
    turns: TurnTracker,
    num_players: usize,
}

/// A match of one game.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use bgf::core::{Move, PlayerId};
/// use bgf::rules::{Match, MatchPhase, MoveRequest};
///
/// let def = Arc::new(bgf::games::sampler::game_def().unwrap());
/// let mut game = Match::new(def, 42);
/// game.start(2, None).unwrap();
///
/// let reveal = Move::with_args("revealTile", [0, 0]);
/// let outcome = game.submit(&MoveRequest::new(PlayerId::new(0), reveal)).unwrap();
/// assert!(outcome.is_accepted());
/// assert_eq!(game.phase(), MatchPhase::InProgress);
/// ```
#[derive(Debug)]
pub struct Match<S> {
    def: Arc<GameDefinition<S>>,
    rng: GameRng,
    running: Option<Running<S>>,
    result: Option<GameResult>,
}

impl<S: Payload> Match<S> {
    /// A not-yet-started match with its RNG seeded from `seed`.
    pub fn new(def: Arc<GameDefinition<S>>, seed: u64) -> Self {
        Self {
            def,
            rng: GameRng::new(seed),
            running: None,
            result: None,
        }
    }

    /// Run setup and begin play. Can only be called once.
    pub fn start(&mut self, num_players: usize, setup_data: Option<&Value>) -> Result<(), EngineError> {
        if self.running.is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        let state = setup_state(&*self.def, num_players, &mut self.rng, setup_data)?;
        self.running = Some(Running {
            state,
            turns: TurnTracker::new(self.def.turn(), num_players),
            num_players,
        });
        info!(game = self.def.id(), num_players, seed = self.rng.seed(), "match started");
        Ok(())
    }

    /// Validate and apply one move.
    ///
    /// Rejections (illegal, out of turn, after the end) are `Ok`. Errors are
    /// reserved for a match that was never started and for handler faults.
    pub fn submit(&mut self, request: &MoveRequest) -> Result<MoveOutcome, EngineError> {
        let def = Arc::clone(&self.def);
        let ended = self.result.is_some();
        let running = self.running.as_mut().ok_or(EngineError::NotStarted)?;
        if ended {
            return Ok(MoveOutcome::rejected("Match has ended"));
        }

        let current = running.turns.current_player();
        let validation = ValidationRequest {
            player: request.player,
            current_player: current,
            num_players: running.num_players,
            mv: &request.mv,
        };
        if let Verdict::Reject(reason) = validate_move(&*def, &running.state, &validation) {
            return Ok(MoveOutcome::Rejected { reason });
        }

        let mut ctx = Context::new(current, running.num_players, running.turns.turn(), &mut self.rng)
            .submitted_by(request.player);
        let state = match apply_move(&*def, &running.state, &mut ctx, &request.mv)? {
            Transition::Applied(state) => state,
            Transition::Rejected(reason) => return Ok(MoveOutcome::Rejected { reason }),
        };
        running.state = state;

        let exempt = def.move_spec(&request.mv.name).is_some_and(|spec| spec.turn_exempt);
        if !exempt && running.turns.record_move() {
            debug!(game = def.id(), next = %running.turns.current_player(), "turn passed");
        }

        let result = evaluate_end(&*def, &running.state);
        if let Some(result) = &result {
            info!(game = def.id(), ?result, "match ended");
            self.result = Some(result.clone());
        }

        Ok(MoveOutcome::Accepted {
            next_player: running.turns.current_player(),
            result,
        })
    }

    /// End `player`'s turn early. Allowed once the turn's minimum is met.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<MoveOutcome, EngineError> {
        let ended = self.result.is_some();
        let running = self.running.as_mut().ok_or(EngineError::NotStarted)?;
        if ended {
            return Ok(MoveOutcome::rejected("Match has ended"));
        }
        if player != running.turns.current_player() {
            return Ok(MoveOutcome::rejected("Not your turn"));
        }
        if let Err(reason) = running.turns.end_turn() {
            return Ok(MoveOutcome::Rejected { reason });
        }

        Ok(MoveOutcome::Accepted {
            next_player: running.turns.current_player(),
            result: None,
        })
    }

    /// Feed one recorded input.
    pub fn apply_input(&mut self, input: &MatchInput) -> Result<MoveOutcome, EngineError> {
        match input {
            MatchInput::Move(request) => self.submit(request),
            MatchInput::EndTurn { player } => self.end_turn(*player),
        }
    }

    #[must_use]
    pub fn definition(&self) -> &Arc<GameDefinition<S>> {
        &self.def
    }

    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        match (&self.running, &self.result) {
            (None, _) => MatchPhase::NotStarted,
            (Some(_), None) => MatchPhase::InProgress,
            (Some(_), Some(_)) => MatchPhase::Ended,
        }
    }

    /// Current state; `None` before `start`.
    #[must_use]
    pub fn state(&self) -> Option<&GameState<S>> {
        self.running.as_ref().map(|r| &r.state)
    }

    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.running.as_ref().map(|r| r.turns.current_player())
    }

    #[must_use]
    pub fn turn(&self) -> Option<u32> {
        self.running.as_ref().map(|r| r.turns.turn())
    }

    #[must_use]
    pub fn num_players(&self) -> Option<usize> {
        self.running.as_ref().map(|r| r.num_players)
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Capture everything needed to resume this match elsewhere.
    #[must_use]
    pub fn snapshot(&self) -> Option<MatchSnapshot<S>> {
        let running = self.running.as_ref()?;
        Some(MatchSnapshot {
            game_id: self.def.id().to_string(),
            num_players: running.num_players,
            phase: self.phase(),
            state: running.state.clone(),
            turns: running.turns.clone(),
            rng: self.rng.state(),
            result: self.result.clone(),
        })
    }

    /// Resume a match from a snapshot.
    ///
    /// The snapshot's player count must suit the definition and agree with
    /// its turn tracker.
    pub fn restore(def: Arc<GameDefinition<S>>, snapshot: MatchSnapshot<S>) -> Result<Self, EngineError> {
        if snapshot.game_id != def.id() {
            return Err(EngineError::WrongGameType(snapshot.game_id));
        }

        let meta = def.metadata();
        if !meta.accepts_players(snapshot.num_players) {
            return Err(EngineError::PlayerCount {
                game: meta.id.clone(),
                requested: snapshot.num_players,
                min: meta.min_players,
                max: meta.max_players,
            });
        }
        let turns = &snapshot.turns;
        if turns.num_players() != snapshot.num_players || turns.current_player().index() >= snapshot.num_players {
            return Err(EngineError::Snapshot {
                game: meta.id.clone(),
                reason: format!(
                    "turns track {} players with seat {} to move, snapshot has {}",
                    turns.num_players(),
                    turns.current_player().index(),
                    snapshot.num_players
                ),
            });
        }
        Ok(Self {
            rng: GameRng::from_state(&snapshot.rng),
            running: Some(Running {
                state: snapshot.state,
                turns: snapshot.turns,
                num_players: snapshot.num_players,
            }),
            result: snapshot.result,
            def,
        })
    }

    /// Rebuild a match by replaying its inputs from the original seed.
    ///
    /// Rejected inputs are skipped exactly as they were the first time.
    pub fn replay<'a>(
        def: Arc<GameDefinition<S>>,
        num_players: usize,
        seed: u64,
        setup_data: Option<&Value>,
        inputs: impl IntoIterator<Item = &'a MatchInput>,
    ) -> Result<Self, EngineError> {
        let mut game = Self::new(def, seed);
        game.start(num_players, setup_data)?;
        for input in inputs {
            game.apply_input(input)?;
        }
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MoveArgs, SetupContext, TurnConfig};
    use crate::definition::MoveSpec;
    use crate::error::MoveError;

    fn setup(ctx: &mut SetupContext<'_>, _data: Option<&Value>) -> Vec<u32> {
        vec![0; ctx.num_players]
    }

    fn score(scores: &mut Vec<u32>, ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
        scores[ctx.player.index()] += 1;
        Ok(())
    }

    fn refuse(_scores: &mut Vec<u32>, _ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
        Err(MoveError::INVALID)
    }

    fn first_to_two(scores: &Vec<u32>) -> Option<GameResult> {
        scores
            .iter()
            .position(|&s| s >= 2)
            .map(|i| GameResult::Winner(PlayerId::new(i as u8)))
    }

    fn def(turn: TurnConfig) -> Arc<GameDefinition<Vec<u32>>> {
        Arc::new(
            GameDefinition::builder("race", setup)
                .move_fn("score", score)
                .move_fn("refuse", refuse)
                .move_spec("cheer", MoveSpec::new(score).turn_exempt())
                .turn(turn)
                .end_if(first_to_two)
                .build()
                .unwrap(),
        )
    }

    fn req(player: u8, name: &str) -> MoveRequest {
        MoveRequest::new(PlayerId::new(player), Move::new(name))
    }

    #[test]
    fn test_not_started() {
        let mut game = Match::new(def(TurnConfig::single_move()), 1);
        assert_eq!(game.phase(), MatchPhase::NotStarted);
        assert!(matches!(game.submit(&req(0, "score")), Err(EngineError::NotStarted)));
        assert!(game.snapshot().is_none());
    }

    #[test]
    fn test_start_once() {
        let mut game = Match::new(def(TurnConfig::single_move()), 1);
        game.start(2, None).unwrap();
        assert!(matches!(game.start(2, None), Err(EngineError::AlreadyStarted)));
    }

    #[test]
    fn test_play_to_end() {
        let mut game = Match::new(def(TurnConfig::single_move()), 1);
        game.start(2, None).unwrap();

        assert!(game.submit(&req(0, "score")).unwrap().is_accepted());
        assert_eq!(game.current_player(), Some(PlayerId::new(1)));
        assert!(game.submit(&req(1, "score")).unwrap().is_accepted());

        let outcome = game.submit(&req(0, "score")).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Accepted {
                next_player: PlayerId::new(1),
                result: Some(GameResult::Winner(PlayerId::new(0))),
            }
        );
        assert_eq!(game.phase(), MatchPhase::Ended);

        let after = game.submit(&req(1, "score")).unwrap();
        assert_eq!(after.reason(), Some("Match has ended"));
        assert_eq!(game.state().unwrap().move_count(), 3);
    }

    #[test]
    fn test_out_of_turn_and_rejected_moves_change_nothing() {
        let mut game = Match::new(def(TurnConfig::single_move()), 1);
        game.start(2, None).unwrap();
        let before = game.snapshot().unwrap();

        assert_eq!(game.submit(&req(1, "score")).unwrap().reason(), Some("Not your turn"));
        assert_eq!(game.submit(&req(0, "refuse")).unwrap().reason(), Some("Invalid move"));

        assert_eq!(game.snapshot().unwrap(), before);
    }

    #[test]
    fn test_turn_exempt_move_keeps_turn() {
        let mut game = Match::new(def(TurnConfig::single_move()), 1);
        game.start(2, None).unwrap();

        assert!(game.submit(&req(1, "cheer")).unwrap().is_accepted());
        assert_eq!(game.current_player(), Some(PlayerId::new(0)));
        assert_eq!(game.state().unwrap().payload, vec![0, 1]);
    }

    #[test]
    fn test_end_turn() {
        let mut game = Match::new(def(TurnConfig::new(1, 5)), 1);
        game.start(3, None).unwrap();

        let early = game.end_turn(PlayerId::new(0)).unwrap();
        assert_eq!(early.reason(), Some("Turn requires at least 1 move(s), 0 made"));

        game.submit(&req(0, "score")).unwrap();
        assert_eq!(game.end_turn(PlayerId::new(2)).unwrap().reason(), Some("Not your turn"));
        assert!(game.end_turn(PlayerId::new(0)).unwrap().is_accepted());
        assert_eq!(game.current_player(), Some(PlayerId::new(1)));
        assert_eq!(game.turn(), Some(2));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let def = def(TurnConfig::single_move());
        let mut game = Match::new(Arc::clone(&def), 7);
        game.start(2, None).unwrap();
        game.submit(&req(0, "score")).unwrap();

        let json = serde_json::to_string(&game.snapshot().unwrap()).unwrap();
        let snapshot: MatchSnapshot<Vec<u32>> = serde_json::from_str(&json).unwrap();
        let mut resumed = Match::restore(def, snapshot).unwrap();

        assert_eq!(resumed.current_player(), Some(PlayerId::new(1)));
        assert!(resumed.submit(&req(1, "score")).unwrap().is_accepted());
        assert_eq!(resumed.state().unwrap().payload, vec![1, 1]);
    }

    #[test]
    fn test_replay_matches_live_match() {
        let def = def(TurnConfig::new(1, 3));
        let inputs = vec![
            MatchInput::Move(req(0, "score")),
            MatchInput::Move(req(1, "score")),
            MatchInput::EndTurn { player: PlayerId::new(0) },
            MatchInput::Move(req(1, "refuse")),
            MatchInput::Move(req(1, "score")),
        ];

        let mut live = Match::new(Arc::clone(&def), 3);
        live.start(2, None).unwrap();
        for input in &inputs {
            live.apply_input(input).unwrap();
        }

        let replayed = Match::replay(def, 2, 3, None, &inputs).unwrap();
        assert_eq!(replayed.snapshot(), live.snapshot());
    }

    #[test]
    fn test_restore_checks_player_count() {
        let def = def(TurnConfig::single_move());
        let mut game = Match::new(Arc::clone(&def), 7);
        game.start(2, None).unwrap();
        let snapshot = game.snapshot().unwrap();

        let mut too_many = snapshot.clone();
        too_many.num_players = 9;
        assert!(matches!(
            Match::restore(Arc::clone(&def), too_many),
            Err(EngineError::PlayerCount { requested: 9, min: 2, max: 4, .. })
        ));

        let mut mismatched = snapshot.clone();
        mismatched.num_players = 3;
        assert!(matches!(
            Match::restore(Arc::clone(&def), mismatched),
            Err(EngineError::Snapshot { .. })
        ));

        assert!(Match::restore(def, snapshot).is_ok());
    }
}
