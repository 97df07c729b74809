//! Turn order and per-turn move accounting.
//!
//! Seats rotate round-robin. A turn is handed off automatically once the
//! holder has made `max_moves` moves, and may be ended voluntarily once
//! `min_moves` have been made.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, TurnConfig};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTracker {
    config: TurnConfig,
    num_players: usize,
    current: PlayerId,
    turn: u32,
    moves_this_turn: u32,
}

impl TurnTracker {
    /// Player 0 opens turn 1.
    #[must_use]
    pub fn new(config: TurnConfig, num_players: usize) -> Self {
        Self {
            config,
            num_players,
            current: PlayerId::new(0),
            turn: 1,
            moves_this_turn: 0,
        }
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Turn number, starting at 1.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn moves_this_turn(&self) -> u32 {
        self.moves_this_turn
    }

    #[must_use]
    pub fn config(&self) -> TurnConfig {
        self.config
    }

    #[must_use]
    pub fn can_end_turn(&self) -> bool {
        self.moves_this_turn >= self.config.min_moves
    }

    /// Count a move. Returns `true` if that move filled the turn and play
    /// passed to the next seat.
    pub fn record_move(&mut self) -> bool {
        self.moves_this_turn += 1;
        if self.moves_this_turn >= self.config.max_moves {
            self.pass();
            true
        } else {
            false
        }
    }

    /// End the turn on the holder's request.
    pub fn end_turn(&mut self) -> Result<(), String> {
        if !self.can_end_turn() {
            return Err(format!(
                "Turn requires at least {} move(s), {} made",
                self.config.min_moves, self.moves_this_turn
            ));
        }
        self.pass();
        Ok(())
    }

    fn pass(&mut self) {
        self.current = self.current.next(self.num_players);
        self.turn += 1;
        self.moves_this_turn = 0;
    }
}
