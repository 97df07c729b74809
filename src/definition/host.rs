//! The type-erased surface hosts depend on.
//!
//! Registries, plugins and transports cannot name a game's payload type, so
//! every `GameDefinition<S>` is also a [`Game`]: the same operations with the
//! payload carried as `serde_json::Value`. [`prepare_game`] wraps one in the
//! adapter a transport talks to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::{Context, GameMetadata, GameRng, GameState, Move, PlayerId, TurnConfig};
use crate::error::EngineError;
use crate::rules::{
    apply_move, evaluate_end, setup_state, GameResult, Match, MatchPhase, MatchSnapshot, MoveOutcome,
    MoveRequest, Transition,
};
use crate::validation::{validate_move, ValidationRequest, Verdict};

use super::game::{GameDefinition, Payload};

/// Shared handle to a registered game.
pub type DynGame = Arc<dyn Game>;

/// A game definition with its payload type erased.
pub trait Game: Send + Sync + fmt::Debug {
    fn metadata(&self) -> &GameMetadata;

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn turn(&self) -> TurnConfig;

    /// Move names in declaration order.
    fn move_names(&self) -> Vec<String>;

    fn has_end_if(&self) -> bool;

    fn has_validate_hook(&self) -> bool;

    /// Initial state with the payload as JSON.
    fn setup_json(
        &self,
        num_players: usize,
        random: &mut GameRng,
        setup_data: Option<&Value>,
    ) -> Result<GameState<Value>, EngineError>;

    /// Apply a single move to a JSON state.
    fn apply_json(
        &self,
        state: &GameState<Value>,
        ctx: &mut Context<'_>,
        mv: &Move,
    ) -> Result<Transition<Value>, EngineError>;

    /// Run the validation layer against a JSON state.
    fn validate_json(
        &self,
        state: &GameState<Value>,
        request: &ValidationRequest<'_>,
    ) -> Result<Verdict, EngineError>;

    /// Evaluate the end condition against a JSON state.
    fn end_if_json(&self, state: &GameState<Value>) -> Result<Option<GameResult>, EngineError>;

    /// A fresh, not-yet-started match of this game.
    fn new_match(self: Arc<Self>, seed: u64) -> Box<dyn HostMatch>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A running match, driven through JSON payloads.
pub trait HostMatch: Send + fmt::Debug {
    fn game_id(&self) -> &str;

    fn start(&mut self, num_players: usize, setup_data: Option<&Value>) -> Result<(), EngineError>;

    fn submit(&mut self, request: &MoveRequest) -> Result<MoveOutcome, EngineError>;

    fn end_turn(&mut self, player: PlayerId) -> Result<MoveOutcome, EngineError>;

    fn phase(&self) -> MatchPhase;

    fn current_player(&self) -> Option<PlayerId>;

    fn result(&self) -> Option<GameResult>;

    fn state_json(&self) -> Result<Option<GameState<Value>>, EngineError>;

    fn snapshot_json(&self) -> Result<Option<MatchSnapshot<Value>>, EngineError>;
}

impl<S: Payload> GameDefinition<S> {
    fn decode(&self, state: &GameState<Value>) -> Result<GameState<S>, EngineError> {
        state
            .clone()
            .try_map_payload(serde_json::from_value)
            .map_err(|source| EngineError::State {
                game: self.id().to_string(),
                source,
            })
    }

    fn encode(&self, state: GameState<S>) -> Result<GameState<Value>, EngineError> {
        encode_state(self.id(), state)
    }
}

fn encode_state<S: Serialize>(game: &str, state: GameState<S>) -> Result<GameState<Value>, EngineError> {
    state
        .try_map_payload(serde_json::to_value)
        .map_err(|source| EngineError::State {
            game: game.to_string(),
            source,
        })
}

impl<S: Payload> Game for GameDefinition<S> {
    fn metadata(&self) -> &GameMetadata {
        GameDefinition::metadata(self)
    }

    fn turn(&self) -> TurnConfig {
        GameDefinition::turn(self)
    }

    fn move_names(&self) -> Vec<String> {
        GameDefinition::move_names(self).map(str::to_string).collect()
    }

    fn has_end_if(&self) -> bool {
        self.end_if_fn().is_some()
    }

    fn has_validate_hook(&self) -> bool {
        self.validate_hook().is_some()
    }

    fn setup_json(
        &self,
        num_players: usize,
        random: &mut GameRng,
        setup_data: Option<&Value>,
    ) -> Result<GameState<Value>, EngineError> {
        let state = setup_state(self, num_players, random, setup_data)?;
        self.encode(state)
    }

    fn apply_json(
        &self,
        state: &GameState<Value>,
        ctx: &mut Context<'_>,
        mv: &Move,
    ) -> Result<Transition<Value>, EngineError> {
        let typed = self.decode(state)?;
        match apply_move(self, &typed, ctx, mv)? {
            Transition::Applied(next) => Ok(Transition::Applied(self.encode(next)?)),
            Transition::Rejected(reason) => Ok(Transition::Rejected(reason)),
        }
    }

    fn validate_json(
        &self,
        state: &GameState<Value>,
        request: &ValidationRequest<'_>,
    ) -> Result<Verdict, EngineError> {
        let typed = self.decode(state)?;
        Ok(validate_move(self, &typed, request))
    }

    fn end_if_json(&self, state: &GameState<Value>) -> Result<Option<GameResult>, EngineError> {
        let typed = self.decode(state)?;
        Ok(evaluate_end(self, &typed))
    }

    fn new_match(self: Arc<Self>, seed: u64) -> Box<dyn HostMatch> {
        Box::new(Match::new(self, seed))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<S: Payload> HostMatch for Match<S> {
    fn game_id(&self) -> &str {
        self.definition().id()
    }

    fn start(&mut self, num_players: usize, setup_data: Option<&Value>) -> Result<(), EngineError> {
        Match::start(self, num_players, setup_data)
    }

    fn submit(&mut self, request: &MoveRequest) -> Result<MoveOutcome, EngineError> {
        Match::submit(self, request)
    }

    fn end_turn(&mut self, player: PlayerId) -> Result<MoveOutcome, EngineError> {
        Match::end_turn(self, player)
    }

    fn phase(&self) -> MatchPhase {
        Match::phase(self)
    }

    fn current_player(&self) -> Option<PlayerId> {
        Match::current_player(self)
    }

    fn result(&self) -> Option<GameResult> {
        Match::result(self).cloned()
    }

    fn state_json(&self) -> Result<Option<GameState<Value>>, EngineError> {
        Match::state(self)
            .map(|state| encode_state(self.game_id(), state.clone()))
            .transpose()
    }

    fn snapshot_json(&self) -> Result<Option<MatchSnapshot<Value>>, EngineError> {
        let Some(snapshot) = self.snapshot() else {
            return Ok(None);
        };
        let state = encode_state(&snapshot.game_id, snapshot.state)?;
        Ok(Some(MatchSnapshot {
            game_id: snapshot.game_id,
            num_players: snapshot.num_players,
            phase: snapshot.phase,
            state,
            turns: snapshot.turns,
            rng: snapshot.rng,
            result: snapshot.result,
        }))
    }
}

/// Recover the typed definition behind a registered game.
pub fn downcast_game<S: Payload>(game: &DynGame) -> Result<Arc<GameDefinition<S>>, EngineError> {
    Arc::clone(game)
        .into_any()
        .downcast::<GameDefinition<S>>()
        .map_err(|_| EngineError::WrongGameType(game.id().to_string()))
}

/// Host-facing description of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub min_players: usize,
    pub max_players: usize,
    pub turn: TurnConfig,
    pub moves: Vec<String>,
    pub has_end_if: bool,
    pub has_validate_hook: bool,
}

/// The adapter a transport layer is given for one game.
///
/// This is the only interface the transport depends on.
#[derive(Clone, Debug)]
pub struct PreparedGame {
    game: DynGame,
}

/// Adapt a registered game for the host transport.
pub fn prepare_game(game: &DynGame) -> PreparedGame {
    PreparedGame {
        game: Arc::clone(game),
    }
}

impl PreparedGame {
    #[must_use]
    pub fn id(&self) -> &str {
        self.game.id()
    }

    #[must_use]
    pub fn metadata(&self) -> &GameMetadata {
        self.game.metadata()
    }

    #[must_use]
    pub fn turn(&self) -> TurnConfig {
        self.game.turn()
    }

    #[must_use]
    pub fn move_names(&self) -> Vec<String> {
        self.game.move_names()
    }

    pub fn setup(
        &self,
        num_players: usize,
        random: &mut GameRng,
        setup_data: Option<&Value>,
    ) -> Result<GameState<Value>, EngineError> {
        self.game.setup_json(num_players, random, setup_data)
    }

    pub fn apply(
        &self,
        state: &GameState<Value>,
        ctx: &mut Context<'_>,
        mv: &Move,
    ) -> Result<Transition<Value>, EngineError> {
        self.game.apply_json(state, ctx, mv)
    }

    pub fn validate(
        &self,
        state: &GameState<Value>,
        request: &ValidationRequest<'_>,
    ) -> Result<Verdict, EngineError> {
        self.game.validate_json(state, request)
    }

    pub fn end_if(&self, state: &GameState<Value>) -> Result<Option<GameResult>, EngineError> {
        self.game.end_if_json(state)
    }

    #[must_use]
    pub fn new_match(&self, seed: u64) -> Box<dyn HostMatch> {
        Arc::clone(&self.game).new_match(seed)
    }

    #[must_use]
    pub fn summary(&self) -> GameSummary {
        let meta = self.game.metadata();
        GameSummary {
            id: meta.id.clone(),
            display_name: meta.display_name.clone(),
            description: meta.description.clone(),
            min_players: meta.min_players,
            max_players: meta.max_players,
            turn: self.game.turn(),
            moves: self.game.move_names(),
            has_end_if: self.game.has_end_if(),
            has_validate_hook: self.game.has_validate_hook(),
        }
    }
}
