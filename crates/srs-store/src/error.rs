//! Maps `sqlx` failures onto the shared [`CoreError`] taxonomy
//! (`spec.md` §7) so callers above this crate never see a driver-specific
//! error type.

use srs_domain::CoreError;

/// Converts a driver error into the appropriate [`CoreError`] variant. A
/// missing row is the caller's job to turn into `NotFound` with a useful
/// message (it knows what it was looking for); everything else is a store
/// failure the caller should retry.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::RowNotFound => CoreError::NotFound("row not found".into()),
        other => CoreError::Internal(other.to_string()),
    }
}
