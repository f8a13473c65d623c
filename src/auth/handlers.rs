use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MeResponse, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        password::{hash_password_async, verify_password_async, verify_unknown_user},
        repo_types::NewUser,
    },
    db::StoreError,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let Json(payload) = payload?;
    let reg = payload.validate().map_err(|e| {
        warn!(error = %e, "registration rejected");
        e
    })?;

    let password_hash = hash_password_async(reg.password).await?;

    let user = match state
        .users
        .create(NewUser {
            name: reg.name,
            email: reg.email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!("email already registered");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let token = state.jwt.issue(user.id).map_err(anyhow::Error::from)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let login = payload.validate()?;

    let creds = match state.users.find_credentials_by_email(&login.email).await? {
        Some(c) => c,
        None => {
            verify_unknown_user(login.password).await;
            warn!(email = %login.email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let ok = verify_password_async(login.password, creds.password_hash).await?;
    if !ok {
        warn!(user_id = %creds.user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.issue(creds.user.id).map_err(anyhow::Error::from)?;

    info!(user_id = %creds.user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}
