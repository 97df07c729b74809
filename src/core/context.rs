//! Per-invocation context handed to setup and move handlers.
//!
//! Contexts are never persisted. The engine rebuilds one for every call from
//! the match it is driving. The randomness handle is a required `&mut`
//! borrow: a handler that needs chance has no other source to reach for.

use super::player::PlayerId;
use super::rng::GameRng;

/// Context for a move handler.
#[derive(Debug)]
pub struct Context<'a> {
    /// Player who submitted the move. Differs from `current_player` only for
    /// turn-exempt moves.
    pub player: PlayerId,

    /// Player whose turn it is.
    pub current_player: PlayerId,

    /// Number of seated players.
    pub num_players: usize,

    /// Turn number, starting at 1.
    pub turn: u32,

    /// The match's seeded generator (a working copy while the move runs).
    pub random: &'a mut GameRng,
}

impl<'a> Context<'a> {
    /// Create a context for a move made by `current_player` on their own turn.
    pub fn new(current_player: PlayerId, num_players: usize, turn: u32, random: &'a mut GameRng) -> Self {
        Self {
            player: current_player,
            current_player,
            num_players,
            turn,
            random,
        }
    }

    /// Attribute the move to `player` instead of the turn holder.
    #[must_use]
    pub fn submitted_by(mut self, player: PlayerId) -> Self {
        self.player = player;
        self
    }

    /// Iterate over every seated player.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.num_players)
    }
}

/// Context for a game's setup function.
#[derive(Debug)]
pub struct SetupContext<'a> {
    /// Number of seated players.
    pub num_players: usize,

    /// The match's seeded generator.
    pub random: &'a mut GameRng,
}

impl<'a> SetupContext<'a> {
    pub fn new(num_players: usize, random: &'a mut GameRng) -> Self {
        Self { num_players, random }
    }

    /// Iterate over every seated player.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.num_players)
    }
}
