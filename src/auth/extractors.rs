use axum::{
    async_trait,
    extract::FromRef,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{
    claims::{AuthIdentity, Role},
    jwt::JwtKeys,
};
use crate::error::ApiError;

const BEARER: &str = "Bearer ";

/// Token part of an `Authorization: Bearer <token>` header. The scheme is
/// matched case-sensitively with exactly one space.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER))
        .filter(|t| !t.is_empty())
}

pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Option<AuthIdentity> {
    keys.verify(bearer_token(headers)?)
}

/// Any authenticated user, regardless of role.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub AuthIdentity);

impl AuthUser {
    /// Role gate for operations restricted beyond "authenticated".
    pub fn require(self, role: Role) -> Result<AuthIdentity, ApiError> {
        if self.0.has_role(role) {
            Ok(self.0)
        } else {
            warn!(user_id = %self.0.subject, role = %self.0.role, required = %role, "forbidden");
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        match authenticate(&parts.headers, &keys) {
            Some(identity) => Ok(AuthUser(identity)),
            None => {
                warn!(uri = %parts.uri, "missing, malformed or expired bearer token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
