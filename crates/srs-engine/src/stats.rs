//! Deck statistics (`spec.md` §4.6): four counts computed from one
//! consistent snapshot of a deck's un-deleted cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use srs_domain::{Card, CardState, Clock, CoreError, DeckId, UserId};

use crate::store::SrsStore;

/// The four counts a client sees alongside a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStatistics {
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub completed_today_cards: usize,
}

/// Computes [`DeckStatistics`] for `(user_id, deck_id)`.
///
/// # Errors
///
/// Propagates [`CoreError::NotFound`] if the deck does not exist.
pub async fn compute(
    store: &dyn SrsStore,
    clock: &dyn Clock,
    user_id: UserId,
    deck_id: DeckId,
) -> Result<DeckStatistics, CoreError> {
    let deck = store.get_deck(deck_id).await?;
    let today_start = clock.today_start();
    let today_end = clock.today_end();
    let tomorrow_start = today_start + chrono::Duration::days(1);

    // One consistent snapshot of every un-deleted card in the deck; the
    // four counts below all derive from it rather than racing separate
    // store round-trips against each other.
    let cards = store.list_all_cards_in_deck(user_id, deck_id).await?;
    let started_today = store
        .count_new_started_today(user_id, deck_id, today_start)
        .await?;

    let learning_cards = count_learning(&cards, today_end);
    let review_cards = count_review(&cards, today_end);
    let completed_today_cards = count_completed_today(&cards, today_start, tomorrow_start);
    let total_new = cards.iter().filter(|c| c.state == CardState::New).count();
    let new_cards = total_new.min((deck.new_cards_per_day as usize).saturating_sub(started_today));

    Ok(DeckStatistics {
        new_cards,
        learning_cards,
        review_cards,
        completed_today_cards,
    })
}

fn count_learning(cards: &[Card], today_end: DateTime<Utc>) -> usize {
    cards
        .iter()
        .filter(|c| c.state.is_drilling() && c.next_review.is_some_and(|nr| nr <= today_end))
        .count()
}

fn count_review(cards: &[Card], today_end: DateTime<Utc>) -> usize {
    cards
        .iter()
        .filter(|c| c.state == CardState::Review && c.next_review.is_some_and(|nr| nr <= today_end))
        .count()
}

fn count_completed_today(
    cards: &[Card],
    today_start: DateTime<Utc>,
    tomorrow_start: DateTime<Utc>,
) -> usize {
    cards
        .iter()
        .filter(|c| {
            c.last_reviewed_at
                .is_some_and(|t| t >= today_start && t < tomorrow_start)
                && c.next_review.is_some_and(|nr| nr >= tomorrow_start)
        })
        .count()
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

    #[tokio::test]
    async fn counts_split_cards_into_the_four_buckets() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck_id = seed_deck(&store, user, 5);

        // One learning card, still due today.
        let mut learning = Card::new(user, deck_id, serde_json::json!({}), now());
        learning.state = CardState::Learning;
        learning.learning_step = 1;
        learning.next_review = Some(now());
        store.insert_card(learning);

        // One review card, due today.
        let mut review = Card::new(user, deck_id, serde_json::json!({}), now());
        review.state = CardState::Review;
        review.interval = chrono::Duration::days(3);
        review.next_review = Some(now());
        store.insert_card(review);

        // One card completed earlier today, next due tomorrow or later.
        let mut completed = Card::new(user, deck_id, serde_json::json!({}), now());
        completed.state = CardState::Review;
        completed.last_reviewed_at = Some(now());
        completed.next_review = Some(now() + chrono::Duration::days(2));
        store.insert_card(completed);

        // Three new cards, none started yet.
        for _ in 0..3 {
            store.insert_card(Card::new(user, deck_id, serde_json::json!({}), now()));
        }

        let clock = FixedClock(now());
        let stats = compute(&store, &clock, user, deck_id).await.unwrap();

        assert_eq!(stats.learning_cards, 1);
        assert_eq!(stats.review_cards, 1);
        assert_eq!(stats.completed_today_cards, 1);
        assert_eq!(stats.new_cards, 3);
    }

    #[tokio::test]
    async fn new_cards_bucket_respects_remaining_daily_allowance() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck_id = seed_deck(&store, user, 2);

        for i in 0..4 {
            let mut card = Card::new(user, deck_id, serde_json::json!({}), now());
            if i < 2 {
                card.first_reviewed_at = Some(now());
            }
            store.insert_card(card);
        }

        let clock = FixedClock(now());
        let stats = compute(&store, &clock, user, deck_id).await.unwrap();
        // remaining = max(0, 2 - 2) = 0
        assert_eq!(stats.new_cards, 0);
    }
}
