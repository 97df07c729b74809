//! Typed game definitions.
//!
//! A `GameDefinition<S>` is the canonical, host-independent description of a
//! game whose payload type is `S`. Required parts (`setup`, at least one move,
//! turn bounds) are fields of the builder; optional parts (`end_if`,
//! `validate_move`) are `Option`s. The whole definition is checked once, in
//! `build()`, and is immutable afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::{Context, GameMetadata, MoveArgs, SetupContext, TurnConfig, MAX_PLAYERS};
use crate::error::{DefinitionError, MoveError};
use crate::rules::GameResult;
use crate::validation::{ArgKind, ValidationRequest, Verdict};

/// Bounds every game payload satisfies.
///
/// Payloads are cloned for working copies and cross the host boundary as
/// JSON.
pub trait Payload: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Builds the initial payload. Called exactly once per match.
pub type SetupFn<S> = fn(&mut SetupContext<'_>, Option<&Value>) -> S;

/// Applies one move to a working copy of the payload.
pub type MoveFn<S> = fn(&mut S, &mut Context<'_>, &MoveArgs) -> Result<(), MoveError>;

/// Pure end-condition check: `None` means the match continues.
pub type EndIfFn<S> = fn(&S) -> Option<GameResult>;

/// Game-specific pre-handler validation.
pub type ValidateFn<S> = fn(&S, &ValidationRequest<'_>) -> Verdict;

/// One named move: its handler plus what the validation layer checks first.
pub struct MoveSpec<S> {
    pub handler: MoveFn<S>,

    /// Positional argument signature. `None` leaves argument checking to the
    /// handler and the validation hook.
    pub args: Option<&'static [ArgKind]>,

    /// Playable outside the requester's turn (e.g. pre-game choices). Exempt
    /// moves do not count towards the turn's move total.
    pub turn_exempt: bool,
}

impl<S> MoveSpec<S> {
    pub fn new(handler: MoveFn<S>) -> Self {
        Self {
            handler,
            args: None,
            turn_exempt: false,
        }
    }

    /// Declare the argument signature.
    #[must_use]
    pub fn args(mut self, signature: &'static [ArgKind]) -> Self {
        self.args = Some(signature);
        self
    }

    /// Mark the move as playable out of turn.
    #[must_use]
    pub fn turn_exempt(mut self) -> Self {
        self.turn_exempt = true;
        self
    }
}

impl<S> Clone for MoveSpec<S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler,
            args: self.args,
            turn_exempt: self.turn_exempt,
        }
    }
}

impl<S> fmt::Debug for MoveSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveSpec")
            .field("args", &self.args)
            .field("turn_exempt", &self.turn_exempt)
            .finish_non_exhaustive()
    }
}

/// A complete, validated game definition.
///
/// ## Example
///
/// ```
/// use bgf::core::{Context, MoveArgs, SetupContext};
/// use bgf::definition::GameDefinition;
/// use bgf::error::MoveError;
///
/// fn setup(_ctx: &mut SetupContext<'_>, _data: Option<&serde_json::Value>) -> u32 {
///     0
/// }
///
/// fn tick(count: &mut u32, _ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
///     *count += 1;
///     Ok(())
/// }
///
/// let def = GameDefinition::builder("ticker", setup)
///     .display_name("Ticker")
///     .players(1, 2)
///     .move_fn("tick", tick)
///     .build()
///     .unwrap();
///
/// assert_eq!(def.id(), "ticker");
/// assert!(def.move_spec("tick").is_some());
/// ```
pub struct GameDefinition<S> {
    metadata: GameMetadata,
    setup: SetupFn<S>,
    moves: IndexMap<String, MoveSpec<S>>,
    turn: TurnConfig,
    end_if: Option<EndIfFn<S>>,
    validate: Option<ValidateFn<S>>,
}

impl<S> GameDefinition<S> {
    /// Start a definition with its id and setup function.
    pub fn builder(id: impl Into<String>, setup: SetupFn<S>) -> GameDefinitionBuilder<S> {
        GameDefinitionBuilder {
            metadata: GameMetadata::new(id),
            setup,
            moves: IndexMap::new(),
            turn: TurnConfig::default(),
            end_if: None,
            validate: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    #[must_use]
    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn turn(&self) -> TurnConfig {
        self.turn
    }

    #[must_use]
    pub fn setup_fn(&self) -> SetupFn<S> {
        self.setup
    }

    /// Look up a move by name.
    #[must_use]
    pub fn move_spec(&self, name: &str) -> Option<&MoveSpec<S>> {
        self.moves.get(name)
    }

    /// Move names in declaration order.
    pub fn move_names(&self) -> impl Iterator<Item = &str> {
        self.moves.keys().map(String::as_str)
    }

    #[must_use]
    pub fn end_if_fn(&self) -> Option<EndIfFn<S>> {
        self.end_if
    }

    #[must_use]
    pub fn validate_hook(&self) -> Option<ValidateFn<S>> {
        self.validate
    }
}

impl<S> fmt::Debug for GameDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameDefinition")
            .field("metadata", &self.metadata)
            .field("moves", &self.moves.keys().collect::<Vec<_>>())
            .field("turn", &self.turn)
            .field("end_if", &self.end_if.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Builder for [`GameDefinition`].
pub struct GameDefinitionBuilder<S> {
    metadata: GameMetadata,
    setup: SetupFn<S>,
    moves: IndexMap<String, MoveSpec<S>>,
    turn: TurnConfig,
    end_if: Option<EndIfFn<S>>,
    validate: Option<ValidateFn<S>>,
}

impl<S> GameDefinitionBuilder<S> {
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.display_name = name.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    /// Player-count bounds (inclusive).
    #[must_use]
    pub fn players(mut self, min: usize, max: usize) -> Self {
        self.metadata.min_players = min;
        self.metadata.max_players = max;
        self
    }

    /// Add a move with no declared signature.
    #[must_use]
    pub fn move_fn(self, name: impl Into<String>, handler: MoveFn<S>) -> Self {
        self.move_spec(name, MoveSpec::new(handler))
    }

    /// Add a move. A later move with the same name replaces the earlier one.
    #[must_use]
    pub fn move_spec(mut self, name: impl Into<String>, spec: MoveSpec<S>) -> Self {
        self.moves.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn turn(mut self, turn: TurnConfig) -> Self {
        self.turn = turn;
        self
    }

    #[must_use]
    pub fn end_if(mut self, end_if: EndIfFn<S>) -> Self {
        self.end_if = Some(end_if);
        self
    }

    #[must_use]
    pub fn validate_move(mut self, hook: ValidateFn<S>) -> Self {
        self.validate = Some(hook);
        self
    }

    /// Check the definition and freeze it.
    pub fn build(self) -> Result<GameDefinition<S>, DefinitionError> {
        let id = self.metadata.id.clone();

        let id_ok = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !id_ok {
            return Err(DefinitionError::InvalidId(id));
        }

        let (min, max) = (self.metadata.min_players, self.metadata.max_players);
        if min == 0 {
            return Err(DefinitionError::NoPlayers { id });
        }
        if min > max || max > MAX_PLAYERS {
            return Err(DefinitionError::PlayerBounds { id, min, max });
        }

        if self.moves.is_empty() {
            return Err(DefinitionError::NoMoves { id });
        }
        if self.moves.keys().any(|name| name.is_empty()) {
            return Err(DefinitionError::EmptyMoveName { id });
        }

        if !self.turn.is_valid() {
            return Err(DefinitionError::TurnBounds {
                id,
                min: self.turn.min_moves,
                max: self.turn.max_moves,
            });
        }

        Ok(GameDefinition {
            metadata: self.metadata,
            setup: self.setup,
            moves: self.moves,
            turn: self.turn,
            end_if: self.end_if,
            validate: self.validate,
        })
    }
}
