//! Maps [`CoreError`] onto HTTP status codes (`spec.md` §7), following the
//! teacher pack's `DomainError`/`IntoResponse` pattern
//! (`iqrah-backend-domain::errors`).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use srs_domain::CoreError;

/// Wire error shape: `{error: string}` (`spec.md` §6).
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Newtype so this crate can implement [`IntoResponse`] for a
/// foreign error type.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::ExternalUnavailable(_) => StatusCode::BAD_GATEWAY,
            CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if matches!(self.0, CoreError::Internal(_)) {
            tracing::error!(error = %self.0, "internal error");
        }

        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError(CoreError::NotFound("card x".into()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = ApiError(CoreError::Conflict("task x".into()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn external_unavailable_maps_to_502() {
        let err = ApiError(CoreError::ExternalUnavailable("grader down".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
