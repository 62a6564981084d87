//! Deck endpoints (`spec.md` §6): list, get, import, settings, delete.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use srs_domain::{Deck, DeckId};
use srs_engine::{compute_deck_statistics, DeckStatistics, SrsStore};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::ApiState;

/// A deck alongside its current four-bucket statistics, the shape every
/// deck-reading endpoint returns.
#[derive(Debug, Serialize)]
pub struct DeckResponse {
    #[serde(flatten)]
    pub deck: Deck,
    pub stats: DeckStatistics,
}

async fn with_stats(state: &ApiState, deck: Deck) -> Result<DeckResponse, ApiError> {
    let stats = compute_deck_statistics(state.store.as_ref(), state.clock.as_ref(), deck.user_id, deck.id).await?;
    Ok(DeckResponse { deck, stats })
}

pub async fn list_decks(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DeckResponse>>, ApiError> {
    let decks = state.store.get_decks_for_user(user_id).await?;
    let mut out = Vec::with_capacity(decks.len());
    for deck in decks {
        out.push(with_stats(&state, deck).await?);
    }
    Ok(Json(out))
}

pub async fn get_deck(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeckResponse>, ApiError> {
    let deck = state.store.get_deck(DeckId::from(id)).await?;
    if deck.user_id != user_id {
        return Err(srs_domain::CoreError::NotFound(format!("deck {id}")).into());
    }
    Ok(Json(with_stats(&state, deck).await?))
}

#[derive(Debug, Deserialize)]
pub struct ImportDeckRequest {
    pub name: String,
    /// Name of the file an external import worker will parse into cards
    /// (`spec.md` §1 — file upload parsing is out of scope here); this
    /// endpoint never reads the file's contents, only logs the name so
    /// the import can be traced.
    pub file_name: String,
}

/// New-card daily allowance assigned to a freshly imported deck until the
/// owner adjusts it via `PUT /v1/decks/{id}/settings`.
const DEFAULT_NEW_CARDS_PER_DAY: u32 = 20;

pub async fn import_deck(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ImportDeckRequest>,
) -> Result<Json<Deck>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(srs_domain::CoreError::InvalidInput("deck name must not be empty".into()).into());
    }
    tracing::info!(file_name = %body.file_name, "importing deck");
    let now = state.clock.now();
    let deck = Deck {
        id: DeckId::new(),
        user_id,
        name: body.name,
        // Card language/level metadata is only known once the external
        // import worker has parsed `file_name`; left unspecified here and
        // expected to be updated out of band once that completes.
        level: "unspecified".into(),
        language_code: "und".into(),
        transcription_type: "none".into(),
        new_cards_per_day: DEFAULT_NEW_CARDS_PER_DAY,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    state.store.insert_deck(&deck).await?;
    Ok(Json(deck))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub new_cards_per_day: u32,
}

pub async fn update_settings(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<Deck>, ApiError> {
    if body.new_cards_per_day < 1 {
        return Err(srs_domain::CoreError::InvalidInput("new_cards_per_day must be >= 1".into()).into());
    }
    let now = state.clock.now();
    let deck = state
        .store
        .update_new_cards_per_day(DeckId::from(id), user_id, body.new_cards_per_day, now)
        .await?;
    Ok(Json(deck))
}

pub async fn delete_deck(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    let now = state.clock.now();
    state.store.soft_delete_deck(DeckId::from(id), user_id, now).await?;
    Ok(())
}
