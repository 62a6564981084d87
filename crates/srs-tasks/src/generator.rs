//! External collaborator port for generated exercise content
//! (`spec.md` §4.7). Not specified in detail — the core only needs a
//! content string, an answer, and a failure mode that the scheduler can
//! log and retry on the next tick.

use async_trait::async_trait;
use serde_json::Value as Json;
use srs_domain::{Card, CoreError, TaskType};

/// Produces exercise content for a graduated card.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates `(content, answer)` for `card` at the given `task_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ExternalUnavailable`] when the generator cannot
    /// be reached or declines to produce content; callers log and skip,
    /// retrying on the next scheduler tick.
    async fn generate(&self, card: &Card, task_type: TaskType) -> Result<(Json, String), CoreError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Deterministic generator for tests: echoes the card's `term` field
    /// (or a placeholder) as both content and answer.
    pub struct EchoGenerator;

    #[async_trait]
    impl ContentGenerator for EchoGenerator {
        async fn generate(
            &self,
            card: &Card,
            task_type: TaskType,
        ) -> Result<(Json, String), CoreError> {
            let term = card
                .fields
                .get("term")
                .and_then(Json::as_str)
                .unwrap_or("palabra")
                .to_string();
            Ok((serde_json::json!({"task_type": task_type, "term": term}), term))
        }
    }

    /// Generator that always fails, for exercising the skip-and-retry path.
    pub struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        async fn generate(&self, _card: &Card, _task_type: TaskType) -> Result<(Json, String), CoreError> {
            Err(CoreError::ExternalUnavailable("generator offline".into()))
        }
    }
}
