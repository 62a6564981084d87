//! The `Card` entity and its scheduling state (`spec.md` §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::ids::{CardId, DeckId, UserId};

/// Scheduling state a card occupies. Mirrors the teacher's `CardState`
/// enumeration and its `is_*`/`is_active` query helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    /// Never studied.
    New,
    /// In the short-interval learning drill, before first graduation.
    Learning,
    /// Graduated; scheduled at expanding intervals.
    Review,
    /// Lapsed from `Review`; being re-drilled before re-graduation.
    Relearning,
}

impl CardState {
    /// True for [`CardState::New`].
    #[must_use]
    pub fn is_new(self) -> bool {
        matches!(self, CardState::New)
    }

    /// True for [`CardState::Learning`] or [`CardState::Relearning`] — the
    /// two states that carry a `learning_step`.
    #[must_use]
    pub fn is_drilling(self) -> bool {
        matches!(self, CardState::Learning | CardState::Relearning)
    }

    /// True for [`CardState::Review`].
    #[must_use]
    pub fn is_review(self) -> bool {
        matches!(self, CardState::Review)
    }
}

/// A single vocabulary card, scoped to one `(card_id, user_id)` pair. The
/// same card template may be imported by many users, each with
/// independent progress — the identity is the pair, not `card_id` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub user_id: UserId,
    pub deck_id: DeckId,
    /// Opaque blob: term, translations, transcription, media URLs. The
    /// core never inspects this beyond passing it through.
    pub fields: Json,
    pub state: CardState,
    /// `0` outside the learning/relearning states; `1` or `2` within them.
    pub learning_step: u8,
    /// Always `>= 0`. For `state == Review`, bounded by
    /// `GraduateToReviewInterval..=MaxReviewIntervalDays`.
    pub interval: chrono::Duration,
    /// Clamped to `[MinEase, DefaultEase] == [1.3, 2.5]`; see
    /// `srs-engine::config::SrsConfig` for the authoritative constants.
    pub ease: f64,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub laps_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub first_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Constructs a brand-new, never-studied card.
    #[must_use]
    pub fn new(user_id: UserId, deck_id: DeckId, fields: Json, now: DateTime<Utc>) -> Self {
        Self {
            id: CardId::new(),
            user_id,
            deck_id,
            fields,
            state: CardState::New,
            learning_step: 0,
            interval: chrono::Duration::zero(),
            ease: crate::rating_defaults::DEFAULT_EASE,
            next_review: None,
            review_count: 0,
            laps_count: 0,
            last_reviewed_at: None,
            first_reviewed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// True when the card has been soft-deleted and should be excluded from
    /// every query except administrative ones.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// True when the card is due on or before `as_of` (used by the queue
    /// planner and deck statistics, which both compare against
    /// `today_end`).
    #[must_use]
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        matches!(self.next_review, Some(due) if due <= as_of)
    }
}

/// Invariant checks shared by the engine and the store's test doubles;
/// not part of the public contract but kept close to the entity it
/// describes, matching the teacher's `card_state/invariants.rs` module.
pub mod invariants {
    use super::{Card, CardState};

    /// True when `card` satisfies every invariant listed in `spec.md` §3.
    #[must_use]
    pub fn holds(card: &Card) -> bool {
        match card.state {
            CardState::New => {
                card.review_count == 0
                    && card.next_review.is_none()
                    && card.first_reviewed_at.is_none()
                    && card.interval == chrono::Duration::zero()
            }
            CardState::Learning | CardState::Relearning => {
                matches!(card.learning_step, 1 | 2)
            }
            CardState::Review => card.learning_step == 0 && card.interval >= chrono::Duration::days(1),
        }
    }
}

mod rating_defaults {
    pub const DEFAULT_EASE: f64 = 2.5;
}
