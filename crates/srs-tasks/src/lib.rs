//! Task generation and dispatch: the background scheduler that turns
//! graduated cards into exercises (C7), and the dispatcher that serves and
//! grades them (C8). See `spec.md` §4.7-§4.8.

pub mod dispatcher;
pub mod generator;
pub mod grader;
pub mod scheduler;

pub use dispatcher::{get_due_tasks, submit, SubmissionResult};
pub use generator::ContentGenerator;
pub use grader::{SemanticGrader, PASSING_SCORE};
pub use scheduler::{TaskScheduler, TaskSchedulerConfig, TickReport};
