use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateJobRequest, JobResponse, JobsResponse, ListJobsQuery, UpdateJobRequest},
    policy::is_owner,
    repo_types::{Job, JobFilter},
    services::notify_job_posted,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/job/:id", get(get_job))
        .route("/job/new", get(reserved_job_id))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/job/new", post(create_job))
        .route("/job/:id", axum::routing::put(update_job).delete(delete_job))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidId)
}

fn job_not_found() -> AppError {
    AppError::not_found("Job not found")
}

/// Loads the job and makes sure `user_id` may mutate it.
async fn load_owned_job(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
    action: &str,
) -> AppResult<Job> {
    let job = state.jobs.find_by_id(id).await?.ok_or_else(job_not_found)?;

    if !is_owner(&job, user_id) {
        warn!(%id, %user_id, owner_id = %job.owner_id, "ownership check failed");
        return Err(AppError::Forbidden(format!(
            "You are not allowed to {action} this job"
        )));
    }
    Ok(job)
}

/// `new` is taken by the create route, so reading it is a malformed id.
async fn reserved_job_id() -> AppError {
    AppError::InvalidId
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
) -> AppResult<Json<JobsResponse>> {
    let Query(q) = query?;
    let filter = JobFilter {
        keyword: q.keyword(),
    };
    let jobs = state.jobs.list(&filter, q.page_request()).await?;
    Ok(Json(JobsResponse { jobs }))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobResponse>> {
    let id = parse_id(&id)?;
    let job = state.jobs.find_by_id(id).await?.ok_or_else(job_not_found)?;
    Ok(Json(JobResponse { job }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> AppResult<Json<JobResponse>> {
    let Json(payload) = payload?;
    let new_job = payload.validate()?;

    let job = state.jobs.create(new_job, user.id).await?;

    info!(job_id = %job.id, "job created");
    notify_job_posted(state.mailer.clone(), &job);
    Ok(Json(JobResponse { job }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> AppResult<Json<JobResponse>> {
    let id = parse_id(&id)?;
    load_owned_job(&state, id, user.id, "update").await?;

    let Json(payload) = payload?;
    let patch = payload.validate()?;

    let job = state
        .jobs
        .update(id, patch)
        .await?
        .ok_or_else(job_not_found)?;

    info!(job_id = %job.id, "job updated");
    Ok(Json(JobResponse { job }))
}

#[instrument(skip_all, fields(user_id = %user.id, job_id = %id))]
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<JobResponse>> {
    let id = parse_id(&id)?;
    load_owned_job(&state, id, user.id, "delete").await?;

    let job = state
        .jobs
        .delete(id)
        .await?
        .ok_or_else(job_not_found)?;

    info!(job_id = %job.id, "job deleted");
    Ok(Json(JobResponse { job }))
}
