//! The immutable append-only `Review` history entry (`spec.md` §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CardId, ReviewId, UserId};
use crate::rating::Rating;

/// One completed review. Created once per successful review transaction;
/// never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
    pub time_spent_ms: u32,
    pub prev_interval: chrono::Duration,
    pub new_interval: chrono::Duration,
    pub prev_ease: f64,
    pub new_ease: f64,
}
