//! Task endpoints (`spec.md` §6): listing eligible exercises and grading
//! submissions (C8).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json_;
use uuid::Uuid;

use srs_domain::{CoreError, TaskId, TaskType};
use srs_tasks::{get_due_tasks, submit};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::ApiState;

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub deck_id: Option<Uuid>,
}

/// A task as served to the learner. The `answer` field is deliberately
/// withheld — `submit_task` is how a learner finds out if they were
/// right.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub task_type: TaskType,
    pub content: Json_,
    pub created_at: DateTime<Utc>,
}

pub async fn list_tasks(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = get_due_tasks(state.store.as_ref(), user_id, query.deck_id.map(Into::into), query.limit).await?;
    Ok(Json(
        tasks
            .into_iter()
            .map(|t| TaskResponse {
                id: t.id,
                task_type: t.task_type,
                content: t.content,
                created_at: t.created_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubmitTaskRequest {
    pub task_id: Uuid,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitTaskResponse {
    pub is_correct: bool,
    pub feedback: Option<String>,
}

pub async fn submit_task(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SubmitTaskRequest>,
) -> Result<Json<SubmitTaskResponse>, ApiError> {
    if body.response.trim().is_empty() {
        return Err(CoreError::InvalidInput("response must not be empty".into()).into());
    }
    let now = state.clock.now();
    let result = submit(
        state.store.as_ref(),
        state.grader.as_ref(),
        TaskId::from(body.task_id),
        user_id,
        body.response,
        now,
    )
    .await?;
    Ok(Json(SubmitTaskResponse {
        is_correct: result.is_correct,
        feedback: result.feedback,
    }))
}
