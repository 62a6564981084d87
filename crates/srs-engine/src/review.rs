//! The review processor (`spec.md` §4.4): validates a submitted rating,
//! runs it through the engine, and persists the result as one atomic
//! store write.

use chrono::{DateTime, Utc};
use srs_domain::{Card, CardId, Clock, CoreError, Rating, Review, ReviewId, UserId};

use crate::config::SrsConfig;
use crate::engine::{self, SrsState};
use crate::fuzz::FuzzSource;
use crate::store::{ReviewWrite, SrsStore};

/// A submitted review, as received from the HTTP boundary.
#[derive(Debug, Clone, Copy)]
pub struct ReviewRequest {
    pub card_id: CardId,
    pub user_id: UserId,
    pub rating: i32,
    pub time_spent_ms: u32,
}

/// Applies one review: validates the rating, transitions the card, and
/// persists the new card state plus the history row in a single store
/// write.
///
/// # Errors
///
/// - [`CoreError::InvalidInput`] if `request.rating` is not `1` or `2`.
/// - [`CoreError::NotFound`] if the card does not exist, is soft-deleted,
///   or does not belong to `request.user_id` (the store enforces the
///   ownership scoping; a foreign card is indistinguishable from absent).
/// - Whatever the store returns from [`SrsStore::apply_review`].
pub async fn process_review(
    store: &dyn SrsStore,
    clock: &dyn Clock,
    fuzz: &mut dyn FuzzSource,
    config: &SrsConfig,
    request: ReviewRequest,
) -> Result<Card, CoreError> {
    let rating = Rating::try_from(request.rating)?;
    let card = store.get_card(request.card_id, request.user_id).await?;

    let now = clock.now();
    let before = SrsState {
        state: card.state,
        learning_step: card.learning_step,
        interval: card.interval,
        ease: card.ease,
    };
    let transition = engine::next(before, rating, config, fuzz, now);

    let mut updated = card.clone();
    updated.state = transition.state;
    updated.learning_step = transition.learning_step;
    updated.interval = transition.interval;
    updated.ease = transition.ease;
    updated.next_review = Some(transition.next_review);
    updated.review_count += 1;
    if transition.lapsed {
        updated.laps_count += 1;
    }
    updated.last_reviewed_at = Some(now);
    if updated.first_reviewed_at.is_none() {
        updated.first_reviewed_at = Some(now);
    }
    updated.updated_at = now;

    let review = Review {
        id: ReviewId::new(),
        user_id: request.user_id,
        card_id: card.id,
        rating,
        reviewed_at: now,
        time_spent_ms: request.time_spent_ms,
        prev_interval: card.interval,
        new_interval: transition.interval,
        prev_ease: card.ease,
        new_ease: transition.ease,
    };

    store
        .apply_review(ReviewWrite {
            card: updated.clone(),
            review,
        })
        .await?;

    Ok(updated)
}

/// The `(again, good)` interval labels shown on review buttons, computed
/// without mutating the card or consuming fuzz (`spec.md` §4.3 preview).
#[must_use]
pub fn preview_intervals(card: &Card, config: &SrsConfig) -> (chrono::Duration, chrono::Duration) {
    let state = SrsState {
        state: card.state,
        learning_step: card.learning_step,
        interval: card.interval,
        ease: card.ease,
    };
    (
        engine::preview(state, Rating::Again, config),
        engine::preview(state, Rating::Good, config),
    )
}
