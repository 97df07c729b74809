//! Slots: ordered collections with a fixed capacity.

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;

/// An ordered, capacity-bounded collection.
///
/// Length never exceeds capacity: adding to a full slot is rejected and
/// leaves it unchanged, and a stored slot holding more than its capacity
/// fails to deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SlotData<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Slot<T> {
    label: String,
    capacity: usize,
    items: Vec<T>,
}

#[derive(Deserialize)]
struct SlotData<T> {
    label: String,
    capacity: usize,
    items: Vec<T>,
}

impl<T> TryFrom<SlotData<T>> for Slot<T> {
    type Error = PrimitiveError;

    fn try_from(data: SlotData<T>) -> Result<Self, Self::Error> {
        let SlotData { label, capacity, items } = data;
        if items.len() > capacity {
            return Err(PrimitiveError::Inconsistent {
                kind: "slot",
                reason: format!("'{label}' holds {} items, capacity {capacity}", items.len()),
            });
        }
        Ok(Self { label, capacity, items })
    }
}

impl<T> Slot<T> {
    /// Create an empty slot.
    pub fn new(capacity: usize, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Space left before the slot is full.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    /// Append `value`, or reject it if the slot is full.
    pub fn add(&mut self, value: T) -> Result<(), PrimitiveError> {
        if self.is_full() {
            return Err(PrimitiveError::SlotFull {
                label: self.label.clone(),
                capacity: self.capacity,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// Remove and return the item at `index`, if present.
    pub fn take(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
