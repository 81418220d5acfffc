//! Bearer-credential extraction.
//!
//! # Responsibility
//! - Turn the `Authorization` header into a verified owner id before any
//!   handler logic runs.
//!
//! # Invariants
//! - Missing, malformed, tampered, and expired credentials all yield the
//!   same 401 rejection.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use daymark_core::auth::token::now_unix_ms;
use daymark_core::UserId;

/// Owner id proven by a valid, unexpired bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = parse_bearer(header).ok_or_else(ApiError::unauthorized)?;
        let owner = state
            .signer()
            .verify(token, now_unix_ms())
            .map_err(|_| ApiError::unauthorized())?;
        Ok(Self(owner))
    }
}

/// Extracts the token from a `Bearer <token>` header value.
fn parse_bearer(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::parse_bearer;

    #[test]
    fn parses_well_formed_bearer_header() {
        assert_eq!(parse_bearer(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(parse_bearer(Some("bearer abc")), Some("abc"));
        assert_eq!(parse_bearer(Some("  Bearer   abc  ")), Some("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(parse_bearer(None), None);
        assert_eq!(parse_bearer(Some("")), None);
        assert_eq!(parse_bearer(Some("Bearer")), None);
        assert_eq!(parse_bearer(Some("Bearer ")), None);
        assert_eq!(parse_bearer(Some("Basic abc")), None);
        assert_eq!(parse_bearer(Some("abc.def")), None);
    }
}
