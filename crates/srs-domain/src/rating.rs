//! Review ratings supported by the scheduler. The canonical design (see
//! `spec.md` §9) is the 2-button model: `Again` and `Good`. There is no
//! `Hard`/`Easy` — those belong to the 4-button variants the source keeps
//! as dead code.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Outcome of a learner's review of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// The learner failed to recall the card.
    Again,
    /// The learner recalled the card successfully.
    Good,
}

impl Rating {
    /// The wire representation used by the HTTP API and stored reviews:
    /// `Again = 1`, `Good = 2`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Rating::Again => 1,
            Rating::Good => 2,
        }
    }
}

impl TryFrom<i32> for Rating {
    type Error = CoreError;

    /// Parses the wire rating, rejecting anything outside `{1, 2}`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] when `value` is not `1` or `2`.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Good),
            other => Err(CoreError::InvalidInput(format!(
                "rating must be 1 (again) or 2 (good), got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_representation() {
        assert_eq!(Rating::try_from(1).unwrap(), Rating::Again);
        assert_eq!(Rating::try_from(2).unwrap(), Rating::Good);
        assert_eq!(Rating::Again.as_i32(), 1);
        assert_eq!(Rating::Good.as_i32(), 2);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for bad in [-1, 0, 3, 4, 100] {
            let err = Rating::try_from(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)));
        }
    }

    #[test]
    fn ratings_are_comparable() {
        assert_eq!(Rating::Again, Rating::Again);
        assert_ne!(Rating::Again, Rating::Good);
    }
}
