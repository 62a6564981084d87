//! Request-scoped user identity.
//!
//! `spec.md` §1 lists authentication as an external collaborator's
//! concern, not specified here: "HTTP routing, authentication, ...
//! These are consumers of or sources for the core; this document
//! defines only the contracts they interact through." Every handler
//! still needs a [`UserId`] to scope its store calls, so this crate
//! takes the same stance the pack takes at this seam
//! (`iqrah-backend-api::middleware::auth::AuthUser`): a small
//! [`axum::extract::FromRequestParts`] extractor, just reading the
//! caller-asserted id from a header rather than verifying a JWT —
//! verification is the real auth service's job, sitting in front of
//! this one.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use srs_domain::UserId;

use crate::error::ApiError;
use crate::state::ApiState;

const USER_ID_HEADER: &str = "x-user-id";

/// The caller-asserted user id for this request, taken from the
/// `X-User-Id` header.
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                srs_domain::CoreError::InvalidInput(format!("missing {USER_ID_HEADER} header"))
            })?;
        let uuid = uuid::Uuid::parse_str(raw).map_err(|_| {
            srs_domain::CoreError::InvalidInput(format!("{USER_ID_HEADER} is not a valid uuid"))
        })?;
        Ok(AuthUser(UserId::from(uuid)))
    }
}
