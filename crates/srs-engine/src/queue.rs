//! The daily due-queue planner (`spec.md` §4.5): orders due cards ahead of
//! new cards, respecting the deck's daily new-card budget.

use chrono::{DateTime, Utc};
use srs_domain::{Card, Clock, CoreError, DeckId, UserId};

use crate::store::SrsStore;

/// Returns up to `limit` cards for `(user_id, deck_id)`: due cards first
/// (ordered by `next_review` ascending), then new cards (ordered by
/// `created_at` ascending) bounded by the deck's remaining daily
/// new-card allowance.
///
/// # Errors
///
/// Propagates whatever the store returns, including [`CoreError::NotFound`]
/// if the deck does not exist.
pub async fn plan_due_queue(
    store: &dyn SrsStore,
    clock: &dyn Clock,
    user_id: UserId,
    deck_id: DeckId,
    limit: usize,
) -> Result<Vec<Card>, CoreError> {
    let deck = store.get_deck(deck_id).await?;
    let today_start = clock.today_start();
    let today_end = clock.today_end();

    let mut reviews = store
        .list_due_cards(user_id, deck_id, today_end, limit)
        .await?;

    if reviews.len() >= limit {
        reviews.truncate(limit);
        return Ok(reviews);
    }

    let started_today = store
        .count_new_started_today(user_id, deck_id, today_start)
        .await?;
    let remaining = (deck.new_cards_per_day as usize).saturating_sub(started_today);
    let need = (limit - reviews.len()).min(remaining);

    let news = store.list_new_cards(user_id, deck_id, need).await?;
    reviews.extend(news);
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::TimeZone;
    use srs_domain::clock::FixedClock;
    use srs_domain::{Card, Deck};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().unwrap()
    }

    fn seed_deck(store: &InMemoryStore, user: UserId, new_cards_per_day: u32) -> DeckId {
        let deck_id = DeckId::new();
        store.insert_deck(Deck {
            id: deck_id,
            user_id: user,
            name: "Spanish".into(),
            level: "A1".into(),
            language_code: "es".into(),
            transcription_type: "ipa".into(),
            new_cards_per_day,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        });
        deck_id
    }

    fn due_card(user: UserId, deck_id: DeckId, next_review: DateTime<Utc>) -> Card {
        let mut card = Card::new(user, deck_id, serde_json::json!({}), now());
        card.state = srs_domain::CardState::Review;
        card.interval = chrono::Duration::days(1);
        card.next_review = Some(next_review);
        card
    }

    #[tokio::test]
    async fn due_cards_fill_the_limit_before_any_new_cards() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck_id = seed_deck(&store, user, 20);
        for i in 0..3 {
            store.insert_card(due_card(user, deck_id, now() - chrono::Duration::hours(i)));
        }
        store.insert_card(Card::new(user, deck_id, serde_json::json!({}), now()));
        let clock = FixedClock(now());

        let queue = plan_due_queue(&store, &clock, user, deck_id, 2).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|c| c.state == srs_domain::CardState::Review));
    }

    #[tokio::test]
    async fn new_cards_are_capped_by_remaining_daily_allowance() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck_id = seed_deck(&store, user, 3);

        // Two cards already started today count against the allowance.
        for _ in 0..2 {
            let mut started = Card::new(user, deck_id, serde_json::json!({}), now());
            started.first_reviewed_at = Some(now());
            store.insert_card(started);
        }
        for _ in 0..5 {
            store.insert_card(Card::new(user, deck_id, serde_json::json!({}), now()));
        }
        let clock = FixedClock(now());

        let queue = plan_due_queue(&store, &clock, user, deck_id, 10).await.unwrap();
        // remaining = max(0, 3 - 2) = 1
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn missing_deck_is_not_found() {
        let store = InMemoryStore::new();
        let clock = FixedClock(now());
        let err = plan_due_queue(&store, &clock, UserId::new(), DeckId::new(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
