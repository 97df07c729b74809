//! Game configuration types.
//!
//! Games describe themselves to the engine with:
//! - `GameMetadata`: id, display text and player-count bounds
//! - `TurnConfig`: how many moves make up a turn
//!
//! The engine never interprets game rules. These are the only structural
//! facts it needs to drive a match.

use serde::{Deserialize, Serialize};

/// Bounds on the number of moves in one turn.
///
/// A turn may be ended voluntarily once `min_moves` have been made and is
/// handed off automatically when `max_moves` is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnConfig {
    pub min_moves: u32,
    pub max_moves: u32,
}

impl TurnConfig {
    /// Create a turn configuration.
    #[must_use]
    pub const fn new(min_moves: u32, max_moves: u32) -> Self {
        Self {
            min_moves,
            max_moves,
        }
    }

    /// Exactly one move per turn.
    #[must_use]
    pub const fn single_move() -> Self {
        Self::new(1, 1)
    }

    /// Whether these bounds describe a playable turn.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.max_moves >= 1 && self.min_moves <= self.max_moves
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self::single_move()
    }
}

/// Descriptive, host-facing facts about a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// Unique id (registry key, URL slug).
    pub id: String,

    /// Human-readable name.
    pub display_name: String,

    /// One-line description for lobbies.
    pub description: String,

    /// Fewest players a match can start with.
    pub min_players: usize,

    /// Most players a match can start with.
    pub max_players: usize,
}

impl GameMetadata {
    /// Create metadata with the id doubling as display name and 2-4 players.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            description: String::new(),
            min_players: 2,
            max_players: 4,
        }
    }

    /// Whether `count` players may start a match.
    #[must_use]
    pub fn accepts_players(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_config_validity() {
        assert!(TurnConfig::single_move().is_valid());
        assert!(TurnConfig::new(1, 10).is_valid());
        assert!(TurnConfig::new(0, 3).is_valid());
        assert!(!TurnConfig::new(0, 0).is_valid());
        assert!(!TurnConfig::new(4, 2).is_valid());
    }

    #[test]
    fn test_metadata_player_bounds() {
        let mut meta = GameMetadata::new("zia");
        meta.min_players = 2;
        meta.max_players = 4;

        assert!(!meta.accepts_players(1));
        assert!(meta.accepts_players(2));
        assert!(meta.accepts_players(4));
        assert!(!meta.accepts_players(5));
        assert_eq!(meta.display_name, "zia");
    }
}
