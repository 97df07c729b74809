//! Resource pools: resource kind to non-negative quantity.
//!
//! Quantities are unsigned, so a pool can never go negative. `remove` is
//! atomic: it either takes the full amount or leaves the pool untouched.
//! Kinds are kept in an ordered map so two replicas serialize a pool to the
//! same bytes.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;

/// Mapping of resource kind to quantity.
///
/// ## Example
///
/// ```
/// use bgf::primitives::ResourcePool;
///
/// let mut pool = ResourcePool::new().with("gold", 3);
/// assert!(pool.has("gold", 2));
///
/// assert!(pool.remove("gold", 5).is_err());
/// assert_eq!(pool.get("gold"), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePool {
    amounts: OrdMap<String, u32>,
}

impl ResourcePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial quantity.
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, amount: u32) -> Self {
        self.amounts.insert(kind.into(), amount);
        self
    }

    /// Current quantity of `kind` (0 when never added).
    #[must_use]
    pub fn get(&self, kind: &str) -> u32 {
        self.amounts.get(kind).copied().unwrap_or(0)
    }

    /// Whether at least `amount` of `kind` is available.
    #[must_use]
    pub fn has(&self, kind: &str, amount: u32) -> bool {
        self.get(kind) >= amount
    }

    /// Add `amount` of `kind`, saturating at `u32::MAX`.
    pub fn add(&mut self, kind: &str, amount: u32) {
        let current = self.get(kind);
        self.amounts.insert(kind.to_string(), current.saturating_add(amount));
    }

    /// Remove `amount` of `kind`.
    ///
    /// Fails without touching the pool when fewer than `amount` are held.
    pub fn remove(&mut self, kind: &str, amount: u32) -> Result<(), PrimitiveError> {
        let available = self.get(kind);
        if available < amount {
            return Err(PrimitiveError::InsufficientResource {
                kind: kind.to_string(),
                requested: amount,
                available,
            });
        }
        if amount > 0 {
            self.amounts.insert(kind.to_string(), available - amount);
        }
        Ok(())
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.amounts.values().map(|&v| u64::from(v)).sum()
    }

    /// Iterate over `(kind, quantity)` in kind order, skipping empty kinds.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.amounts
            .iter()
            .filter(|(_, &v)| v > 0)
            .map(|(k, &v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut pool = ResourcePool::new();
        assert_eq!(pool.get("ore"), 0);

        pool.add("ore", 2);
        pool.add("ore", 3);
        assert_eq!(pool.get("ore"), 5);
        assert_eq!(pool.total(), 5);
    }

    #[test]
    fn test_remove_exact_amount() {
        let mut pool = ResourcePool::new().with("gold", 2);

        assert!(pool.remove("gold", 2).is_ok());
        assert_eq!(pool.get("gold"), 0);
        assert!(!pool.has("gold", 1));
    }

    #[test]
    fn test_failed_remove_is_noop() {
        let pool = ResourcePool::new().with("gold", 1).with("ore", 4);
        let mut working = pool.clone();

        let err = working.remove("gold", 2).unwrap_err();
        assert_eq!(
            err,
            PrimitiveError::InsufficientResource {
                kind: "gold".into(),
                requested: 2,
                available: 1
            }
        );
        assert_eq!(working, pool);
        assert_eq!(
            serde_json::to_vec(&working).unwrap(),
            serde_json::to_vec(&pool).unwrap()
        );
    }

    #[test]
    fn test_remove_unknown_kind() {
        let mut pool = ResourcePool::new();
        assert!(pool.remove("tech", 1).is_err());
        assert!(pool.remove("tech", 0).is_ok());
        assert_eq!(pool, ResourcePool::new());
    }

    #[test]
    fn test_iter_is_ordered() {
        let pool = ResourcePool::new().with("ore", 1).with("grain", 2).with("luxury", 0);
        let kinds: Vec<_> = pool.iter().collect();
        assert_eq!(kinds, vec![("grain", 2), ("ore", 1)]);
    }

    #[test]
    fn test_add_saturates() {
        let mut pool = ResourcePool::new().with("gold", u32::MAX - 1);
        pool.add("gold", 10);
        assert_eq!(pool.get("gold"), u32::MAX);
    }
}
