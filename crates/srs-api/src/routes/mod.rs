//! HTTP route handlers (`spec.md` §6), grouped the way the teacher pack
//! groups `handlers/*.rs` by resource.

pub mod cards;
pub mod decks;
pub mod tasks;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::ApiState;

/// Assembles the full `/v1` router.
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/decks", get(decks::list_decks))
        .route("/v1/decks/import", post(decks::import_deck))
        .route("/v1/decks/{id}", get(decks::get_deck).delete(decks::delete_deck))
        .route("/v1/decks/{id}/settings", put(decks::update_settings))
        .route("/v1/cards/due", get(cards::due_cards))
        .route("/v1/cards/{id}/review", post(cards::submit_review))
        .route("/v1/tasks", get(tasks::list_tasks))
        .route("/v1/tasks/submit", post(tasks::submit_task))
        .with_state(state)
}

/// Formats a duration the way Anki-style SRS clients label review
/// buttons: whole minutes below an hour, whole hours below a day,
/// whole days below a month, whole months below a year, otherwise whole
/// years. Matches `spec.md` §6's `next_intervals` examples (`"1m"`,
/// `"2d"`).
#[must_use]
pub fn humanize_interval(duration: chrono::Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 60 {
        return format!("{}m", minutes.max(1));
    }
    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h");
    }
    let days = duration.num_days();
    if days < 30 {
        return format!("{days}d");
    }
    let months = days / 30;
    if months < 12 {
        return format!("{months}mo");
    }
    format!("{}y", days / 365)
}
