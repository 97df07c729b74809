//! Tracks: a labelled integer position held inside `[min, max]`.
//!
//! Score tracks, fame tracks and the like. Advancing past either end clamps,
//! which lets end conditions simply ask `is_at_max()`. A stored track with
//! inverted bounds, or a position outside them, fails to deserialize.

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;

/// A bounded position.
///
/// ## Example
///
/// ```
/// use bgf::primitives::Track;
///
/// let mut score = Track::new(0, 5, 0, "Score");
/// score.advance(3);
/// score.advance(10);
/// assert_eq!(score.position(), 5);
/// assert!(score.is_at_max());
///
/// score.advance(-100);
/// assert_eq!(score.position(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TrackData")]
pub struct Track {
    label: String,
    min: i32,
    max: i32,
    position: i32,
}

#[derive(Deserialize)]
struct TrackData {
    label: String,
    min: i32,
    max: i32,
    position: i32,
}

impl TryFrom<TrackData> for Track {
    type Error = PrimitiveError;

    fn try_from(data: TrackData) -> Result<Self, Self::Error> {
        let TrackData { label, min, max, position } = data;
        if min > max || !(min..=max).contains(&position) {
            return Err(PrimitiveError::Inconsistent {
                kind: "track",
                reason: format!("'{label}' at {position} outside [{min}, {max}]"),
            });
        }
        Ok(Self { label, min, max, position })
    }
}

impl Track {
    /// Create a track. `start` is clamped into `[min, max]`.
    ///
    /// # Panics
    ///
    /// If `min > max`. Bounds come from game code, not from players, so
    /// this is a bug in the calling definition.
    pub fn new(min: i32, max: i32, start: i32, label: impl Into<String>) -> Self {
        assert!(min <= max, "Track min must not exceed max");
        Self {
            label: label.into(),
            min,
            max,
            position: start.clamp(min, max),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Move by `delta`, clamping to the bounds. Returns the new position.
    pub fn advance(&mut self, delta: i32) -> i32 {
        let next = i64::from(self.position) + i64::from(delta);
        self.position = next.clamp(i64::from(self.min), i64::from(self.max)) as i32;
        self.position
    }

    #[must_use]
    pub fn is_at_max(&self) -> bool {
        self.position == self.max
    }

    #[must_use]
    pub fn is_at_min(&self) -> bool {
        self.position == self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_start_is_clamped() {
        assert_eq!(Track::new(0, 10, 15, "t").position(), 10);
        assert_eq!(Track::new(0, 10, -3, "t").position(), 0);
    }

    #[test]
    fn test_advance_within_bounds() {
        let mut track = Track::new(-2, 2, 0, "Balance");
        assert_eq!(track.advance(1), 1);
        assert_eq!(track.advance(-3), -2);
        assert!(track.is_at_min());
    }

    #[test]
    fn test_extreme_deltas_do_not_overflow() {
        let mut track = Track::new(i32::MIN, i32::MAX, 0, "wide");
        track.advance(i32::MAX);
        track.advance(i32::MAX);
        assert!(track.is_at_max());
        track.advance(i32::MIN);
        track.advance(i32::MIN);
        assert!(track.is_at_min());
    }

    #[test]
    #[should_panic(expected = "Track min must not exceed max")]
    fn test_inverted_bounds_panic() {
        let _ = Track::new(5, 1, 0, "bad");
    }

    #[test]
    fn test_stored_track_is_checked() {
        let inverted = serde_json::json!({ "label": "Fame", "min": 30, "max": 20, "position": 25 });
        assert!(serde_json::from_value::<Track>(inverted).is_err());

        let outside = serde_json::json!({ "label": "Fame", "min": 0, "max": 20, "position": 21 });
        let err = serde_json::from_value::<Track>(outside).unwrap_err();
        assert!(err.to_string().contains("'Fame' at 21 outside [0, 20]"), "{err}");

        let valid = serde_json::json!({ "label": "Fame", "min": 0, "max": 20, "position": 20 });
        assert!(serde_json::from_value::<Track>(valid).unwrap().is_at_max());
    }

    proptest! {
        #[test]
        fn prop_position_stays_in_bounds(
            min in -1000i32..1000,
            span in 0i32..1000,
            start in any::<i32>(),
            deltas in proptest::collection::vec(any::<i32>(), 0..32),
        ) {
            let max = min + span;
            let mut track = Track::new(min, max, start, "p");
            prop_assert!(track.position() >= min && track.position() <= max);
            for delta in deltas {
                let pos = track.advance(delta);
                prop_assert!(pos >= min && pos <= max);
            }
        }
    }
}
