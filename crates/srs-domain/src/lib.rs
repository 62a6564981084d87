//! Shared domain types for the spaced-repetition scheduler: card, review,
//! deck, and task records, strongly-typed identifiers, the clock
//! abstraction, and the error taxonomy the rest of the workspace builds on.

pub mod card;
pub mod clock;
pub mod deck;
pub mod error;
pub mod ids;
pub mod rating;
pub mod review;
pub mod task;

pub use card::{Card, CardState};
pub use clock::{Clock, SystemClock};
pub use deck::Deck;
pub use error::CoreError;
pub use ids::{CardId, DeckId, ReviewId, TaskId, UserId};
pub use rating::Rating;
pub use review::Review;
pub use task::{Task, TaskType};

#[cfg(test)]
pub(crate) fn naive_datetime(year: i32, month: u32, day: u32) -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid calendar date")
}
