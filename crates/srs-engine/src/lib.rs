//! The SRS engine: the pure scheduling state machine (C3), the review
//! processor that commits transitions through a store (C4), the due-queue
//! planner (C5), and deck statistics (C6). See `spec.md` §4.3-§4.6.

pub mod config;
pub mod engine;
pub mod fuzz;
pub mod queue;
pub mod review;
pub mod stats;
pub mod store;

pub use config::SrsConfig;
pub use engine::{preview, next, SrsState, Transition};
pub use fuzz::{FixedFuzz, FuzzSource, ProcessRng};
pub use queue::plan_due_queue;
pub use review::{preview_intervals, process_review, ReviewRequest};
pub use stats::{compute as compute_deck_statistics, DeckStatistics};
pub use store::{InMemoryStore, ReviewWrite, SrsStore};
