//! Game registry for definition lookup.
//!
//! The `Registry` is an explicit value owned by the host process and handed
//! to the plugin loader and the transport. It keeps games in registration
//! order and takes every insert under one write lock, so when two plugins
//! race to register the same id the first insert deterministically wins.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::game::{GameDefinition, Payload};
use super::host::DynGame;

/// Registry of game definitions keyed by id.
///
/// ## Example
///
/// ```
/// use bgf::definition::Registry;
///
/// let registry = Registry::new();
/// assert!(registry.register_game(bgf::games::sampler::game_def().unwrap()));
///
/// let sampler = registry.lookup("sampler").unwrap();
/// assert_eq!(sampler.metadata().min_players, 2);
/// assert!(registry.lookup("chess").is_none());
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    games: RwLock<IndexMap<String, DynGame>>,
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed definition.
    ///
    /// Returns `false` (and keeps the existing entry) if the id is taken.
    pub fn register_game<S: Payload>(&self, def: GameDefinition<S>) -> bool {
        self.register_dyn(Arc::new(def))
    }

    /// Register an already-erased game, e.g. one exported by a plugin.
    pub fn register_dyn(&self, game: DynGame) -> bool {
        let mut games = self.games.write();
        let id = game.id().to_string();
        if games.contains_key(&id) {
            warn!(game = %id, "game already registered, keeping the first definition");
            return false;
        }
        debug!(game = %id, "registered game");
        games.insert(id, game);
        true
    }

    /// Get a game by id.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<DynGame> {
        self.games.read().get(id).cloned()
    }

    /// Check if a game id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.games.read().contains_key(id)
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.games.read().keys().cloned().collect()
    }

    /// Registered games in registration order.
    #[must_use]
    pub fn games(&self) -> Vec<DynGame> {
        self.games.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Context, MoveArgs, SetupContext};
    use crate::error::MoveError;
    use serde_json::Value;

    fn setup(_ctx: &mut SetupContext<'_>, _data: Option<&Value>) -> u8 {
        0
    }

    fn noop(_state: &mut u8, _ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
        Ok(())
    }

    fn named(id: &str, display: &str) -> GameDefinition<u8> {
        GameDefinition::builder(id, setup)
            .display_name(display)
            .move_fn("noop", noop)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        assert!(registry.register_game(named("alpha", "Alpha")));
        assert!(registry.contains("alpha"));
        assert_eq!(registry.lookup("alpha").unwrap().metadata().display_name, "Alpha");
        assert!(registry.lookup("beta").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = Registry::new();

        assert!(registry.register_game(named("dup", "First")));
        assert!(!registry.register_game(named("dup", "Second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("dup").unwrap().metadata().display_name, "First");
    }

    #[test]
    fn test_insertion_order() {
        let registry = Registry::new();
        for id in ["zeta", "alpha", "mu"] {
            registry.register_game(named(id, id));
        }
        assert_eq!(registry.ids(), vec!["zeta", "alpha", "mu"]);
        assert_eq!(registry.games()[1].id(), "alpha");
    }

    #[test]
    fn test_concurrent_duplicate_registration() {
        use rayon::prelude::*;

        let registry = Registry::new();
        let accepted: usize = (0..32)
            .into_par_iter()
            .map(|i| usize::from(registry.register_game(named("race", &format!("v{i}")))))
            .sum();

        assert_eq!(accepted, 1);
        assert_eq!(registry.len(), 1);
    }
}
