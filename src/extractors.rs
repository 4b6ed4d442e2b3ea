use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::Utc;

use crate::error::AppError;
use crate::security::verify_session_token;
use crate::AppState;

/// The authenticated caller, resolved from a signed bearer token
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session token is present.
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let uid = verify_session_token(
            token,
            &state.config.session_secret,
            Utc::now().timestamp(),
        )
        .ok_or(AppError::Unauthenticated)?;

        Ok(Identity { uid })
    }
}

/// Optional identity extractor: yields None instead of 401 when the caller
/// is anonymous or presents an invalid token. Used on endpoints where the
/// anonymous case maps to "not entitled" rather than an auth failure.
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await {
            Ok(identity) => Ok(MaybeIdentity(Some(identity))),
            Err(_) => Ok(MaybeIdentity(None)),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
