//! The durable SQLite-backed [`SrsStore`] implementation (`spec.md` §4.2,
//! §6). Generalizes the teacher's `CardStore` trait pattern
//! (`card-store::store::CardStore`) to `async fn` signatures over a
//! `sqlx::SqlitePool`, and adds the deck/card administrative operations
//! the HTTP surface needs but the engine itself does not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use srs_domain::{Card, CardId, CardState, CoreError, Deck, DeckId, Review, ReviewId, Task, TaskId, TaskType, UserId};
use srs_engine::store::{ReviewWrite, SrsStore};

use crate::convert::{
    card_state_from_str, card_state_to_str, duration_to_nanos, nanos_to_duration,
    task_type_from_str, task_type_to_str,
};
use crate::error::map_sqlx_err;

/// Durable store backed by a SQLite connection pool.
pub struct SqliteSrsStore {
    pool: SqlitePool,
}

impl SqliteSrsStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool, exposed for callers that need to start their
    /// own transactions (e.g. a deck-import handler batching many cards).
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persists a brand-new deck. Not part of [`SrsStore`]: the engine
    /// never creates decks, only the HTTP layer's import/settings flows do.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Internal`] on a store failure.
    pub async fn insert_deck(&self, deck: &Deck) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO decks (id, user_id, name, level, language_code, transcription_type,
                new_cards_per_day, created_at, updated_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(deck.id.to_string())
        .bind(deck.user_id.to_string())
        .bind(&deck.name)
        .bind(&deck.level)
        .bind(&deck.language_code)
        .bind(&deck.transcription_type)
        .bind(i64::from(deck.new_cards_per_day))
        .bind(deck.created_at)
        .bind(deck.updated_at)
        .bind(deck.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    /// Persists a brand-new card. Not part of [`SrsStore`] for the same
    /// reason as [`Self::insert_deck`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Internal`] on a store failure.
    pub async fn insert_card(&self, card: &Card) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO cards (id, user_id, deck_id, fields, state, learning_step, interval_ns,
                ease, next_review, review_count, laps_count, last_reviewed_at, first_reviewed_at,
                created_at, updated_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(card.id.to_string())
        .bind(card.user_id.to_string())
        .bind(card.deck_id.to_string())
        .bind(card.fields.to_string())
        .bind(card_state_to_str(card.state))
        .bind(i64::from(card.learning_step))
        .bind(duration_to_nanos(card.interval))
        .bind(card.ease)
        .bind(card.next_review)
        .bind(i64::from(card.review_count))
        .bind(i64::from(card.laps_count))
        .bind(card.last_reviewed_at)
        .bind(card.first_reviewed_at)
        .bind(card.created_at)
        .bind(card.updated_at)
        .bind(card.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    /// Updates a deck's daily new-card allowance (`PUT /v1/decks/{id}/settings`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the deck does not exist or is
    /// soft-deleted.
    pub async fn update_new_cards_per_day(
        &self,
        deck_id: DeckId,
        user_id: UserId,
        new_cards_per_day: u32,
        now: DateTime<Utc>,
    ) -> Result<Deck, CoreError> {
        let result = sqlx::query(
            "UPDATE decks SET new_cards_per_day = ?, updated_at = ?
             WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        )
        .bind(i64::from(new_cards_per_day))
        .bind(now)
        .bind(deck_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("deck {deck_id}")));
        }
        self.get_deck(deck_id).await
    }

    /// Soft-deletes a deck and, transactionally, every card it owns
    /// (`spec.md` §3 "Deleting a deck soft-deletes its cards
    /// transactionally").
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the deck does not exist or is
    /// already deleted.
    pub async fn soft_delete_deck(
        &self,
        deck_id: DeckId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let result = sqlx::query(
            "UPDATE decks SET deleted_at = ?, updated_at = ?
             WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(deck_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("deck {deck_id}")));
        }
        sqlx::query("UPDATE cards SET deleted_at = ?, updated_at = ? WHERE deck_id = ? AND deleted_at IS NULL")
            .bind(now)
            .bind(now)
            .bind(deck_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(value).map_err(|e| CoreError::Internal(format!("malformed {what} id {value:?}: {e}")))
}

#[derive(sqlx::FromRow)]
struct DeckRow {
    id: String,
    user_id: String,
    name: String,
    level: String,
    language_code: String,
    transcription_type: String,
    new_cards_per_day: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<DeckRow> for Deck {
    type Error = CoreError;

    fn try_from(row: DeckRow) -> Result<Self, Self::Error> {
        Ok(Deck {
            id: DeckId::from(parse_uuid(&row.id, "deck")?),
            user_id: UserId::from(parse_uuid(&row.user_id, "user")?),
            name: row.name,
            level: row.level,
            language_code: row.language_code,
            transcription_type: row.transcription_type,
            new_cards_per_day: u32::try_from(row.new_cards_per_day).unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: String,
    user_id: String,
    deck_id: String,
    fields: String,
    state: String,
    learning_step: i64,
    interval_ns: i64,
    ease: f64,
    next_review: Option<DateTime<Utc>>,
    review_count: i64,
    laps_count: i64,
    last_reviewed_at: Option<DateTime<Utc>>,
    first_reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CardRow> for Card {
    type Error = CoreError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let fields: Json = serde_json::from_str(&row.fields)
            .map_err(|e| CoreError::Internal(format!("malformed card fields json: {e}")))?;
        Ok(Card {
            id: CardId::from(parse_uuid(&row.id, "card")?),
            user_id: UserId::from(parse_uuid(&row.user_id, "user")?),
            deck_id: DeckId::from(parse_uuid(&row.deck_id, "deck")?),
            fields,
            state: card_state_from_str(&row.state)?,
            learning_step: u8::try_from(row.learning_step).unwrap_or(0),
            interval: nanos_to_duration(row.interval_ns),
            ease: row.ease,
            next_review: row.next_review,
            review_count: u32::try_from(row.review_count).unwrap_or(0),
            laps_count: u32::try_from(row.laps_count).unwrap_or(0),
            last_reviewed_at: row.last_reviewed_at,
            first_reviewed_at: row.first_reviewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    task_type: String,
    content: String,
    answer: String,
    card_id: String,
    user_id: String,
    completed_at: Option<DateTime<Utc>>,
    user_response: Option<String>,
    is_correct: Option<i64>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = CoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let content: Json = serde_json::from_str(&row.content)
            .map_err(|e| CoreError::Internal(format!("malformed task content json: {e}")))?;
        Ok(Task {
            id: TaskId::from(parse_uuid(&row.id, "task")?),
            task_type: task_type_from_str(&row.task_type)?,
            content,
            answer: row.answer,
            card_id: CardId::from(parse_uuid(&row.card_id, "card")?),
            user_id: UserId::from(parse_uuid(&row.user_id, "user")?),
            completed_at: row.completed_at,
            user_response: row.user_response,
            is_correct: row.is_correct.map(|v| v != 0),
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[async_trait]
impl SrsStore for SqliteSrsStore {
    async fn get_card(&self, card_id: CardId, user_id: UserId) -> Result<Card, CoreError> {
        let row = sqlx::query_as::<_, CardRow>(
            "SELECT * FROM cards WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        )
        .bind(card_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| CoreError::NotFound(format!("card {card_id}")))?;
        row.try_into()
    }

    async fn get_deck(&self, deck_id: DeckId) -> Result<Deck, CoreError> {
        let row = sqlx::query_as::<_, DeckRow>("SELECT * FROM decks WHERE id = ? AND deleted_at IS NULL")
            .bind(deck_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| CoreError::NotFound(format!("deck {deck_id}")))?;
        row.try_into()
    }

    async fn get_decks_for_user(&self, user_id: UserId) -> Result<Vec<Deck>, CoreError> {
        let rows = sqlx::query_as::<_, DeckRow>(
            "SELECT * FROM decks WHERE user_id = ? AND deleted_at IS NULL ORDER BY id ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_new_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT * FROM cards
             WHERE user_id = ? AND deck_id = ? AND state = 'new' AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(deck_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_due_cards(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        until_time: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT * FROM cards
             WHERE user_id = ? AND deck_id = ? AND deleted_at IS NULL AND next_review <= ?
             ORDER BY next_review ASC, id ASC
             LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(deck_id.to_string())
        .bind(until_time)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_new_started_today(
        &self,
        user_id: UserId,
        deck_id: DeckId,
        today_start: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cards
             WHERE user_id = ? AND deck_id = ? AND deleted_at IS NULL AND first_reviewed_at >= ?",
        )
        .bind(user_id.to_string())
        .bind(deck_id.to_string())
        .bind(today_start)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(count as usize)
    }

    async fn apply_review(&self, write: ReviewWrite) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let card = &write.card;
        sqlx::query(
            "UPDATE cards SET state = ?, learning_step = ?, interval_ns = ?, ease = ?,
                next_review = ?, review_count = ?, laps_count = ?, last_reviewed_at = ?,
                first_reviewed_at = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(card_state_to_str(card.state))
        .bind(i64::from(card.learning_step))
        .bind(duration_to_nanos(card.interval))
        .bind(card.ease)
        .bind(card.next_review)
        .bind(i64::from(card.review_count))
        .bind(i64::from(card.laps_count))
        .bind(card.last_reviewed_at)
        .bind(card.first_reviewed_at)
        .bind(card.updated_at)
        .bind(card.id.to_string())
        .bind(card.user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        let review = &write.review;
        sqlx::query(
            "INSERT INTO reviews (id, user_id, card_id, rating, reviewed_at, time_spent_ms,
                prev_interval_ns, new_interval_ns, prev_ease, new_ease)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.card_id.to_string())
        .bind(i64::from(review.rating.as_i32()))
        .bind(review.reviewed_at)
        .bind(i64::from(review.time_spent_ms))
        .bind(duration_to_nanos(review.prev_interval))
        .bind(duration_to_nanos(review.new_interval))
        .bind(review.prev_ease)
        .bind(review.new_ease)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_all_cards_in_deck(
        &self,
        user_id: UserId,
        deck_id: DeckId,
    ) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT * FROM cards WHERE user_id = ? AND deck_id = ? AND deleted_at IS NULL",
        )
        .bind(user_id.to_string())
        .bind(deck_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_cards_graduated_for_task_gen(
        &self,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT c.* FROM cards c
             WHERE c.state = 'review'
               AND c.deleted_at IS NULL
               AND c.last_reviewed_at >= ?
               AND c.last_reviewed_at < ?
               AND c.next_review > ?
               AND NOT EXISTS (
                   SELECT 1 FROM tasks t
                   WHERE t.card_id = c.id
                     AND t.deleted_at IS NULL
                     AND t.created_at >= ?
                     AND t.created_at < ?
               )",
        )
        .bind(today_start)
        .bind(today_end)
        .bind(now)
        .bind(today_start)
        .bind(today_end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_task(&self, task: Task) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO tasks (id, task_type, content, answer, card_id, user_id, completed_at,
                user_response, is_correct, created_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(task_type_to_str(task.task_type))
        .bind(task.content.to_string())
        .bind(&task.answer)
        .bind(task.card_id.to_string())
        .bind(task.user_id.to_string())
        .bind(task.completed_at)
        .bind(&task.user_response)
        .bind(task.is_correct.map(i64::from))
        .bind(task.created_at)
        .bind(task.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn count_tasks_created_today(
        &self,
        user_id: UserId,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
    ) -> Result<usize, CoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ? AND deleted_at IS NULL AND created_at >= ? AND created_at < ?",
        )
        .bind(user_id.to_string())
        .bind(today_start)
        .bind(today_end)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(count as usize)
    }

    async fn list_due_tasks_for_user(
        &self,
        user_id: UserId,
        deck_id: Option<DeckId>,
        limit: usize,
    ) -> Result<Vec<Task>, CoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT t.* FROM tasks t
             JOIN cards c ON c.id = t.card_id
             WHERE t.user_id = ?
               AND t.deleted_at IS NULL
               AND t.completed_at IS NULL
               AND c.state = 'review'
               AND c.deleted_at IS NULL
               AND (? IS NULL OR c.deck_id = ?)
             ORDER BY t.created_at ASC, t.id ASC
             LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(deck_id.map(|d| d.to_string()))
        .bind(deck_id.map(|d| d.to_string()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, CoreError> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ? AND deleted_at IS NULL")
            .bind(task_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))?;
        let task: Task = row.try_into()?;
        if task.user_id != user_id {
            return Err(CoreError::Forbidden(format!("task {task_id}")));
        }
        Ok(task)
    }

    async fn record_task_submission(
        &self,
        task_id: TaskId,
        user_id: UserId,
        response: String,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Task, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ? AND deleted_at IS NULL")
            .bind(task_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))?;
        let task: Task = row.try_into()?;
        if task.user_id != user_id {
            return Err(CoreError::Forbidden(format!("task {task_id}")));
        }
        if task.is_completed() {
            return Err(CoreError::Conflict(format!("task {task_id} already completed")));
        }

        sqlx::query(
            "UPDATE tasks SET completed_at = ?, user_response = ?, is_correct = ?
             WHERE id = ? AND completed_at IS NULL",
        )
        .bind(now)
        .bind(&response)
        .bind(i64::from(is_correct))
        .bind(task_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;
        tx.commit().await.map_err(map_sqlx_err)?;

        let mut updated = task;
        updated.completed_at = Some(now);
        updated.user_response = Some(response);
        updated.is_correct = Some(is_correct);
        Ok(updated)
    }
}
