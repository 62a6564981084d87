//! The error taxonomy shared across every layer (`spec.md` §7). Each kind
//! maps to exactly one HTTP status at the API boundary; nothing below the
//! HTTP layer knows about status codes.

use thiserror::Error;

/// Sum-type result used in place of the source's sentinel errors
/// (`ErrNotFound` and friends).
#[derive(Debug, Error)]
pub enum CoreError {
    /// The queried entity does not exist, or exists but is soft-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity exists but belongs to another user.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A caller-supplied value failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested mutation conflicts with the entity's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An external collaborator (content generator, semantic grader) is
    /// unavailable. Retryable; the review pipeline never depends on these.
    #[error("external service unavailable: {0}")]
    ExternalUnavailable(String),

    /// The store failed, or a transaction could not be committed after
    /// retries. The caller should retry.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short, stable name for the error kind, used in logs and tests.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::Forbidden(_) => "forbidden",
            CoreError::InvalidInput(_) => "invalid_input",
            CoreError::Conflict(_) => "conflict",
            CoreError::ExternalUnavailable(_) => "external_unavailable",
            CoreError::Internal(_) => "internal",
        }
    }
}
