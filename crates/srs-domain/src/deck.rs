//! The `Deck` entity (`spec.md` §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DeckId, UserId};

/// A named collection of cards owned exclusively by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub user_id: UserId,
    pub name: String,
    pub level: String,
    pub language_code: String,
    pub transcription_type: String,
    /// Must be `>= 1`.
    pub new_cards_per_day: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// True once the deck has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive_datetime;

    fn sample() -> Deck {
        Deck {
            id: DeckId::new(),
            user_id: UserId::new(),
            name: "Spanish basics".into(),
            level: "A1".into(),
            language_code: "es".into(),
            transcription_type: "ipa".into(),
            new_cards_per_day: 10,
            created_at: naive_datetime(2024, 1, 1),
            updated_at: naive_datetime(2024, 1, 1),
            deleted_at: None,
        }
    }

    #[test]
    fn not_deleted_by_default() {
        assert!(!sample().is_deleted());
    }

    #[test]
    fn deleted_after_soft_delete() {
        let mut deck = sample();
        deck.deleted_at = Some(naive_datetime(2024, 2, 1));
        assert!(deck.is_deleted());
    }
}
