use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::services::{upload_file, UploadItem};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub bucket: String,
    pub location: String,
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /upload (multipart, single field `file`)
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let mut mp = mp?;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        if body.is_empty() {
            return Err(AppError::validation("Please upload a file"));
        }

        let stored = upload_file(
            state.storage.as_ref(),
            user.id,
            UploadItem {
                body,
                content_type: &content_type,
            },
        )
        .await?;

        info!(key = %stored.key, "file uploaded");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                key: stored.key,
                bucket: stored.bucket,
                location: stored.location,
            }),
        ));
    }

    Err(AppError::validation("Please upload a file"))
}
