//! External collaborator port for grading free-text answers
//! (`spec.md` §4.8). Only `sentence_translation` tasks use this; the other
//! task types are graded by exact string match in the dispatcher itself.

use async_trait::async_trait;
use srs_domain::CoreError;

/// The passing threshold for a semantic grader's score.
pub const PASSING_SCORE: u8 = 80;

/// Scores a free-text response against the expected answer.
#[async_trait]
pub trait SemanticGrader: Send + Sync {
    /// Returns `(score, feedback)`: `score` in `[0, 100]`; `feedback` is
    /// only meaningful (and only surfaced to the learner) when the score
    /// falls below [`PASSING_SCORE`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ExternalUnavailable`] when the grading service
    /// cannot be reached; this is retryable by the caller.
    async fn grade(&self, response: &str, expected: &str) -> Result<(u8, Option<String>), CoreError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Deterministic grader for tests: exact match scores 100, anything
    /// else scores 0 with a fixed feedback string.
    pub struct ExactMatchGrader;

    #[async_trait]
    impl SemanticGrader for ExactMatchGrader {
        async fn grade(&self, response: &str, expected: &str) -> Result<(u8, Option<String>), CoreError> {
            if response.eq_ignore_ascii_case(expected) {
                Ok((100, None))
            } else {
                Ok((40, Some("not quite — check word order".into())))
            }
        }
    }
}
