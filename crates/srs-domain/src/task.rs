//! The generated-exercise `Task` entity (`spec.md` §3, §4.7, §4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::ids::{CardId, TaskId, UserId};

/// The kind of exercise a generated task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    VocabRecall,
    SentenceTranslation,
    Audio,
}

impl TaskType {
    /// All task types, in the default weighting order used when a user has
    /// not configured a `task_types` subset.
    pub const ALL: [TaskType; 3] = [
        TaskType::VocabRecall,
        TaskType::SentenceTranslation,
        TaskType::Audio,
    ];
}

/// A generated follow-up exercise attached to a review-state card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub content: Json,
    pub answer: String,
    pub card_id: CardId,
    pub user_id: UserId,
    pub completed_at: Option<DateTime<Utc>>,
    pub user_response: Option<String>,
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Constructs a freshly generated, un-completed task.
    #[must_use]
    pub fn new(
        task_type: TaskType,
        content: Json,
        answer: String,
        card_id: CardId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            task_type,
            content,
            answer,
            card_id,
            user_id,
            completed_at: None,
            user_response: None,
            is_correct: None,
            created_at: now,
            deleted_at: None,
        }
    }

    /// True when the task has already been graded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// True when the completion invariant holds: `completed_at.is_some()`
    /// implies both `user_response` and `is_correct` are populated, and
    /// vice versa.
    #[must_use]
    pub fn completion_is_consistent(&self) -> bool {
        self.is_completed() == (self.user_response.is_some() && self.is_correct.is_some())
    }
}
