//! Persistence abstraction required by the engine (`spec.md` §4.2), plus an
//! in-memory reference implementation used throughout this crate's tests
//! and by callers that want a fast fixture. The durable SQLite-backed
//! implementation lives in the `srs-store` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use srs_domain::{Card, CardId, CardState, CoreError, Deck, DeckId, Review, Task, TaskId, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

/// A single atomic write produced by the review processor: the card after
/// applying a transition, and the history row to append alongside it.
#[derive(Debug, Clone)]
pub struct ReviewWrite {
    pub card: Card,
    pub review: Review,
}

/// Transactional persistence port the engine's components depend on.
///
/// Implementations MUST make [`SrsStore::apply_review`] atomic: either both
/// the review history row and the card update land, or neither does.
#[async_trait]
pub trait SrsStore: Send + Sync {
    /// Fetches a card scoped to its owner, excluding soft-deleted rows.
    async fn get_card(&self, card_id: CardId, user_id: UserId) -> Result<Card, CoreError>;

    /// Fetches a deck by id, excluding soft-deleted rows.
    async fn get_deck(&self, deck_id: DeckId) -> Result<Deck, CoreError>;

    /// Lists every non-deleted deck owned by `user_id`.
    async fn get_decks_for_user(&self, user_id: UserId) -> Result<Vec<Deck>, CoreError>;

    /// Lists up to `limit` new cards, ordered by `created_at` ascending.
    async fn list_new_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError>;

    /// Lists up to `limit` cards due at or before `until_time`, ordered by
    /// `next_review` ascending, ties broken by id.
    async fn list_due_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        until_time: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError>;

    /// Counts cards whose `first_reviewed_at` falls on or after
    /// `today_start`.
    async fn count_new_started_today(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        today_start: DateTime<Utc>,
    ) -> Result<usize, CoreError>;

    /// Atomically appends `write.review` and persists `write.card`.
    async fn apply_review(&self, write: ReviewWrite) -> Result<(), CoreError>;

    /// Every un-deleted card owned by `user_id` in `deck_id`, unfiltered by
    /// scheduling state. Deck statistics are the only caller; the narrower
    /// `list_due_cards`/`list_new_cards` queries above can't serve the
    /// "completed today but not due again until tomorrow" bucket.
    async fn list_all_cards_in_deck(
        &self,
        user_id: UserId,
        deck_id: DeckId,
    ) -> Result<Vec<Card>, CoreError>;

    /// Cards that graduated into `review` today and have no un-deleted task
    /// created for them today.
    async fn list_cards_graduated_for_task_gen(
        &self,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, CoreError>;

    /// Inserts a newly generated task.
    async fn insert_task(&self, task: Task) -> Result<(), CoreError>;

    /// Counts un-deleted tasks created for `user_id` within
    /// `[today_start, today_end)`, regardless of completion — used by the
    /// task scheduler to respect `max_tasks_per_day`.
    async fn count_tasks_created_today(
        &self,
        user_id: UserId,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
    ) -> Result<usize, CoreError>;

    /// Lists tasks for `user_id` (optionally scoped to `deck_id`) whose
    /// owning card is currently in `review` state, not completed, not
    /// deleted, ordered by `created_at` ascending.
    async fn list_due_tasks_for_user(
        &self,
        user_id: UserId,
        deck_id: Option<DeckId>,
        limit: usize,
    ) -> Result<Vec<Task>, CoreError>;

    /// Fetches a single task scoped to its owner.
    async fn get_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, CoreError>;

    /// Records a graded submission. MUST fail with
    /// [`CoreError::Conflict`] if the task is already completed.
    async fn record_task_submission(
        &self,
        task_id: TaskId,
        user_id: UserId,
        response: String,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Task, CoreError>;
}

/// Reference in-memory [`SrsStore`], used by this crate's and `srs-tasks`'s
/// unit tests. Not constant-time; fine for fixtures, not meant for load.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    decks: HashMap<DeckId, Deck>,
    cards: HashMap<CardId, Card>,
    reviews: Vec<Review>,
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a deck, returning nothing; used to set up fixtures.
    pub fn insert_deck(&self, deck: Deck) {
        self.inner.lock().expect("lock poisoned").decks.insert(deck.id, deck);
    }

    /// Seeds or overwrites a card; used to set up fixtures.
    pub fn insert_card(&self, card: Card) {
        self.inner.lock().expect("lock poisoned").cards.insert(card.id, card);
    }

    /// Snapshots every card currently stored, for assertions in tests.
    #[must_use]
    pub fn all_cards(&self) -> Vec<Card> {
        self.inner.lock().expect("lock poisoned").cards.values().cloned().collect()
    }

    /// Snapshots every review currently recorded, for assertions in tests.
    #[must_use]
    pub fn all_reviews(&self) -> Vec<Review> {
        self.inner.lock().expect("lock poisoned").reviews.clone()
    }
}

#[async_trait]
impl SrsStore for InMemoryStore {
    async fn get_card(&self, card_id: CardId, user_id: UserId) -> Result<Card, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        inner
            .cards
            .get(&card_id)
            .filter(|c| c.user_id == user_id && !c.is_deleted())
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("card {card_id}")))
    }

    async fn get_deck(&self, deck_id: DeckId) -> Result<Deck, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        inner
            .decks
            .get(&deck_id)
            .filter(|d| !d.is_deleted())
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("deck {deck_id}")))
    }

    async fn get_decks_for_user(&self, user_id: UserId) -> Result<Vec<Deck>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut decks: Vec<Deck> = inner
            .decks
            .values()
            .filter(|d| d.user_id == user_id && !d.is_deleted())
            .cloned()
            .collect();
        decks.sort_by(|a, b| a.id.to_string().cmp(&b.id.to_string()));
        Ok(decks)
    }

    async fn list_new_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut cards: Vec<Card> = inner
            .cards
            .values()
            .filter(|c| {
                c.user_id == user_id
                    && c.deck_id == deck_id
                    && c.state == CardState::New
                    && !c.is_deleted()
            })
            .cloned()
            .collect();
        cards.sort_by(|a, b| (a.created_at, a.id.to_string()).cmp(&(b.created_at, b.id.to_string())));
        cards.truncate(limit);
        Ok(cards)
    }

    async fn list_due_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        until_time: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut cards: Vec<Card> = inner
            .cards
            .values()
            .filter(|c| {
                c.user_id == user_id
                    && c.deck_id == deck_id
                    && !c.is_deleted()
                    && c.next_review.is_some_and(|nr| nr <= until_time)
            })
            .cloned()
            .collect();
        cards.sort_by(|a, b| {
            (a.next_review, a.id.to_string()).cmp(&(b.next_review, b.id.to_string()))
        });
        cards.truncate(limit);
        Ok(cards)
    }

    async fn count_new_started_today(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        today_start: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .cards
            .values()
            .filter(|c| {
                c.user_id == user_id
                    && c.deck_id == deck_id
                    && !c.is_deleted()
                    && c.first_reviewed_at.is_some_and(|t| t >= today_start)
            })
            .count())
    }

    async fn apply_review(&self, write: ReviewWrite) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.cards.insert(write.card.id, write.card);
        inner.reviews.push(write.review);
        Ok(())
    }

    async fn list_all_cards_in_deck(
        &self,
        user_id: UserId,
        deck_id: DeckId,
    ) -> Result<Vec<Card>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .cards
            .values()
            .filter(|c| c.user_id == user_id && c.deck_id == deck_id && !c.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_cards_graduated_for_task_gen(
        &self,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let has_task_today = |card_id: CardId| {
            inner.tasks.values().any(|t| {
                t.card_id == card_id
                    && !t.is_deleted()
                    && t.created_at >= today_start
                    && t.created_at < today_end
            })
        };
        let cards: Vec<Card> = inner
            .cards
            .values()
            .filter(|c| {
                c.state == CardState::Review
                    && !c.is_deleted()
                    && c
                        .last_reviewed_at
                        .is_some_and(|t| t >= today_start && t < today_end)
                    && c.next_review.is_some_and(|nr| nr > now)
                    && !has_task_today(c.id)
            })
            .cloned()
            .collect();
        Ok(cards)
    }

    async fn insert_task(&self, task: Task) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.tasks.insert(task.id, task);
        Ok(())
    }

    async fn count_tasks_created_today(
        &self,
        user_id: UserId,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .tasks
            .values()
            .filter(|t| {
                t.user_id == user_id
                    && !t.is_deleted()
                    && t.created_at >= today_start
                    && t.created_at < today_end
            })
            .count())
    }

    async fn list_due_tasks_for_user(
        &self,
        user_id: UserId,
        deck_id: Option<DeckId>,
        limit: usize,
    ) -> Result<Vec<Task>, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| {
                t.user_id == user_id
                    && !t.is_deleted()
                    && !t.is_completed()
                    && inner
                        .cards
                        .get(&t.card_id)
                        .is_some_and(|c| c.state == CardState::Review && !c.is_deleted())
                    && deck_id.is_none_or(|deck_id| {
                        inner.cards.get(&t.card_id).is_some_and(|c| c.deck_id == deck_id)
                    })
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| (a.created_at, a.id.to_string()).cmp(&(b.created_at, b.id.to_string())));
        tasks.truncate(limit);
        Ok(tasks)
    }

    async fn get_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, CoreError> {
        let inner = self.inner.lock().expect("lock poisoned");
        inner
            .tasks
            .get(&task_id)
            .filter(|t| !t.is_deleted())
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))
            .and_then(|t| {
                if t.user_id == user_id {
                    Ok(t)
                } else {
                    Err(CoreError::Forbidden(format!("task {task_id}")))
                }
            })
    }

    async fn record_task_submission(
        &self,
        task_id: TaskId,
        user_id: UserId,
        response: String,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Task, CoreError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        let task = inner
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))?;
        if task.user_id != user_id {
            return Err(CoreError::Forbidden(format!("task {task_id}")));
        }
        if task.is_completed() {
            return Err(CoreError::Conflict(format!("task {task_id} already completed")));
        }
        let mut updated = task;
        updated.completed_at = Some(now);
        updated.user_response = Some(response);
        updated.is_correct = Some(is_correct);
        inner.tasks.insert(task_id, updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use srs_domain::Rating;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).single().unwrap()
    }

    fn sample_deck(user_id: UserId) -> Deck {
        Deck {
            id: DeckId::new(),
            user_id,
            name: "Spanish basics".into(),
            level: "A1".into(),
            language_code: "es".into(),
            transcription_type: "ipa".into(),
            new_cards_per_day: 20,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn get_card_excludes_other_users_cards() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let other = UserId::new();
        let deck = sample_deck(user);
        let card = Card::new(user, deck.id, serde_json::json!({}), now());
        store.insert_deck(deck);
        store.insert_card(card.clone());

        let err = store.get_card(card.id, other).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(store.get_card(card.id, user).await.is_ok());
    }

    #[tokio::test]
    async fn list_new_cards_orders_by_created_at() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck = sample_deck(user);
        store.insert_deck(deck.clone());

        let mut first = Card::new(user, deck.id, serde_json::json!({}), now());
        let mut second = Card::new(user, deck.id, serde_json::json!({}), now() + chrono::Duration::seconds(5));
        first.created_at = now();
        second.created_at = now() + chrono::Duration::seconds(5);
        store.insert_card(second.clone());
        store.insert_card(first.clone());

        let listed = store.list_new_cards(user, deck.id, 10).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn apply_review_is_atomic_for_assertions() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck = sample_deck(user);
        store.insert_deck(deck.clone());
        let card = Card::new(user, deck.id, serde_json::json!({}), now());
        store.insert_card(card.clone());

        let mut updated = card.clone();
        updated.review_count = 1;
        let review = Review {
            id: srs_domain::ReviewId::new(),
            user_id: user,
            card_id: card.id,
            rating: Rating::Good,
            reviewed_at: now(),
            time_spent_ms: 1200,
            prev_interval: chrono::Duration::zero(),
            new_interval: chrono::Duration::minutes(10),
            prev_ease: 2.5,
            new_ease: 2.5,
        };
        store
            .apply_review(ReviewWrite {
                card: updated.clone(),
                review: review.clone(),
            })
            .await
            .unwrap();

        assert_eq!(store.all_cards(), vec![updated]);
        assert_eq!(store.all_reviews(), vec![review]);
    }

    #[tokio::test]
    async fn record_task_submission_rejects_double_completion() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck = sample_deck(user);
        store.insert_deck(deck.clone());
        let card = Card::new(user, deck.id, serde_json::json!({}), now());
        store.insert_card(card.clone());
        let task = Task::new(
            srs_domain::TaskType::VocabRecall,
            serde_json::json!({}),
            "hola".into(),
            card.id,
            user,
            now(),
        );
        store.insert_task(task.clone()).await.unwrap();

        let first = store
            .record_task_submission(task.id, user, "hola".into(), true, now())
            .await
            .unwrap();
        assert!(first.is_completed());

        let err = store
            .record_task_submission(task.id, user, "hola".into(), true, now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}

