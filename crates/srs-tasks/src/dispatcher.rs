//! The task dispatcher (`spec.md` §4.8): serves eligible tasks to a user
//! and grades submissions.

use chrono::{DateTime, Utc};
use srs_domain::{CoreError, DeckId, Task, TaskId, TaskType, UserId};
use srs_engine::SrsStore;

use crate::grader::{SemanticGrader, PASSING_SCORE};

/// Lists tasks eligible to be served to `user_id`. Filtering out tasks
/// whose card has lapsed out of `review` state is the store's job
/// ([`SrsStore::list_due_tasks_for_user`]); this function is a thin,
/// named entry point kept distinct from the store call so callers don't
/// need to reach into `srs-engine` directly for task reads.
///
/// # Errors
///
/// Propagates whatever the store returns.
pub async fn get_due_tasks(
    store: &dyn SrsStore,
    user_id: UserId,
    deck_id: Option<DeckId>,
    limit: usize,
) -> Result<Vec<Task>, CoreError> {
    store.list_due_tasks_for_user(user_id, deck_id, limit).await
}

/// Result of grading a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub is_correct: bool,
    pub feedback: Option<String>,
}

/// Grades and records a task submission.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if the task does not exist.
/// - [`CoreError::Forbidden`] if the task belongs to another user.
/// - [`CoreError::Conflict`] if the task is already completed.
/// - [`CoreError::ExternalUnavailable`] if the semantic grader could not
///   be reached for a `sentence_translation` task (retryable; no write
///   happens).
pub async fn submit(
    store: &dyn SrsStore,
    grader: &dyn SemanticGrader,
    task_id: TaskId,
    user_id: UserId,
    response: String,
    now: DateTime<Utc>,
) -> Result<SubmissionResult, CoreError> {
    let task = store.get_task(task_id, user_id).await?;
    if task.is_completed() {
        return Err(CoreError::Conflict(format!(
            "task {task_id} already completed"
        )));
    }

    let (is_correct, feedback) = grade(&task, &response, grader).await?;

    store
        .record_task_submission(task_id, user_id, response, is_correct, now)
        .await?;

    Ok(SubmissionResult { is_correct, feedback })
}

async fn grade(
    task: &Task,
    response: &str,
    grader: &dyn SemanticGrader,
) -> Result<(bool, Option<String>), CoreError> {
    match task.task_type {
        TaskType::VocabRecall | TaskType::Audio => {
            Ok((response == task.answer, None))
        }
        TaskType::SentenceTranslation => {
            let (score, feedback) = grader.grade(response, &task.answer).await?;
            let is_correct = score >= PASSING_SCORE;
            Ok((is_correct, if is_correct { None } else { feedback }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::fixtures::ExactMatchGrader;
    use chrono::TimeZone;
    use srs_domain::{Card, CardState, Deck, DeckId};
    use srs_engine::InMemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).single().unwrap()
    }

    async fn store_with_task(
        task_type: TaskType,
        answer: &str,
    ) -> (InMemoryStore, TaskId, UserId) {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let deck_id = DeckId::new();
        store.insert_deck(Deck {
            id: deck_id,
            user_id: user,
            name: "Spanish".into(),
            level: "A1".into(),
            language_code: "es".into(),
            transcription_type: "ipa".into(),
            new_cards_per_day: 20,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        });
        let mut card = Card::new(user, deck_id, serde_json::json!({}), now());
        card.state = CardState::Review;
        store.insert_card(card.clone());
        let task = Task::new(
            task_type,
            serde_json::json!({}),
            answer.into(),
            card.id,
            user,
            now(),
        );
        let task_id = task.id;
        store.insert_task(task).await.unwrap();
        (store, task_id, user)
    }

    #[tokio::test]
    async fn vocab_recall_is_graded_by_exact_match() {
        let (store, task_id, user) = store_with_task(TaskType::VocabRecall, "hola").await;
        let grader = ExactMatchGrader;

        let result = submit(&store, &grader, task_id, user, "hola".into(), now())
            .await
            .unwrap();
        assert!(result.is_correct);
        assert!(result.feedback.is_none());
    }

    #[tokio::test]
    async fn sentence_translation_uses_semantic_grader_and_surfaces_feedback_on_failure() {
        let (store, task_id, user) =
            store_with_task(TaskType::SentenceTranslation, "el gato duerme").await;
        let grader = ExactMatchGrader;

        let result = submit(&store, &grader, task_id, user, "el perro corre".into(), now())
            .await
            .unwrap();
        assert!(!result.is_correct);
        assert!(result.feedback.is_some());
    }

    #[tokio::test]
    async fn double_submission_is_conflict() {
        let (store, task_id, user) = store_with_task(TaskType::VocabRecall, "hola").await;
        let grader = ExactMatchGrader;

        submit(&store, &grader, task_id, user, "hola".into(), now())
            .await
            .unwrap();
        let err = submit(&store, &grader, task_id, user, "hola".into(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn submission_by_non_owner_is_forbidden() {
        let (store, task_id, _user) = store_with_task(TaskType::VocabRecall, "hola").await;
        let grader = ExactMatchGrader;
        let intruder = UserId::new();

        let err = submit(&store, &grader, task_id, intruder, "hola".into(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
