use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{error, warn};

use super::{
    jwt::{JwtKeys, TokenError},
    repo::UserStore,
    repo_types::User,
};
use crate::{error::AppError, state::AppState};

/// Authenticated caller, resolved from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

/// Pulls the token out of the header value.
///
/// Absent, empty, or non-Bearer headers count as missing credentials;
/// a Bearer header with nothing after it is a failed authentication.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.map(str::trim).unwrap_or_default();
    if header.is_empty() {
        return Err(AppError::MissingCredentials);
    }

    let (scheme, rest) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::MissingCredentials);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(AppError::AuthenticationFailed);
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
    Arc<dyn UserStore>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(v) => Some(v.to_str().map_err(|_| AppError::AuthenticationFailed)?),
            None => None,
        };
        let token = bearer_token(header)?;

        let keys = JwtKeys::from_ref(state);
        let user_id = match keys.verify(token) {
            Ok(id) => id,
            Err(TokenError::Invalid(e)) => {
                warn!(error = %e, "invalid or expired token");
                return Err(AppError::AuthenticationFailed);
            }
            Err(TokenError::Internal(e)) => {
                error!(error = %e, "token verification fault");
                return Err(AppError::AuthenticationError);
            }
        };

        let users = <Arc<dyn UserStore>>::from_ref(state);
        match users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                warn!(%user_id, "token subject no longer exists");
                Err(AppError::AuthenticationFailed)
            }
            Err(e) => {
                error!(error = %e, %user_id, "identity lookup failed");
                Err(AppError::AuthenticationError)
            }
        }
    }
}
