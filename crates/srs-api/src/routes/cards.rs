//! Card endpoints (`spec.md` §6): the due queue and review submission.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json_;
use uuid::Uuid;

use srs_domain::{Card, CardId, CardState};
use srs_engine::{compute_deck_statistics, plan_due_queue, preview_intervals, process_review, DeckStatistics, ReviewRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::humanize_interval;
use crate::state::ApiState;

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub deck_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Labels shown on the two review buttons for a card, computed without
/// mutating the card or consuming fuzz (`spec.md` §4.3 preview).
#[derive(Debug, Serialize)]
pub struct NextIntervals {
    pub again: String,
    pub good: String,
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: CardId,
    pub fields: Json_,
    pub state: CardState,
    pub next_intervals: NextIntervals,
}

fn to_card_response(card: &Card) -> CardResponse {
    let config = srs_engine::SrsConfig::default();
    let (again, good) = preview_intervals(card, &config);
    CardResponse {
        id: card.id,
        fields: card.fields.clone(),
        state: card.state,
        next_intervals: NextIntervals {
            again: humanize_interval(again),
            good: humanize_interval(good),
        },
    }
}

pub async fn due_cards(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    let cards = plan_due_queue(
        state.store.as_ref(),
        state.clock.as_ref(),
        user_id,
        query.deck_id.into(),
        query.limit,
    )
    .await?;
    Ok(Json(cards.iter().map(to_card_response).collect()))
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmission {
    pub rating: i32,
    pub time_spent_ms: u32,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub stats: DeckStatistics,
}

pub async fn submit_review(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewSubmission>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let mut fuzz = state.fuzz.lock().await;
    let updated = process_review(
        state.store.as_ref(),
        state.clock.as_ref(),
        &mut **fuzz,
        &state.srs_config,
        ReviewRequest {
            card_id: CardId::from(id),
            user_id,
            rating: body.rating,
            time_spent_ms: body.time_spent_ms,
        },
    )
    .await?;
    drop(fuzz);

    let stats = compute_deck_statistics(state.store.as_ref(), state.clock.as_ref(), user_id, updated.deck_id).await?;
    Ok(Json(ReviewResponse { stats }))
}
