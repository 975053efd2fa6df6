use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{DeletedResponse, JobFilter, JobResponse, JobsResponse, NewJob, UpdateJob};
use super::repo_types::Job;
use crate::{auth::extractors::Admin, error::AppError, state::AppState, validation::ValidatedJson};

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/:id", get(get_job).patch(update_job).delete(delete_job))
}

#[instrument(skip(state, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    ValidatedJson(payload): ValidatedJson<NewJob>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let job = Job::create(&state.db, payload).await?;
    info!(job_id = job.id, company_handle = %job.company_handle, "job created");
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

/// `?title=&minSalary=&hasEquity=`; public.
#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> Result<Json<JobsResponse>, AppError> {
    let Query(filter) = filter.map_err(|e| AppError::bad_request(e.body_text()))?;
    let jobs = Job::find_all(&state.db, &filter).await?;
    Ok(Json(JobsResponse { jobs }))
}

/// A non-numeric id is a 400 in the usual error envelope.
fn job_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    let Path(id) = path.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(id)
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<JobResponse>, AppError> {
    let id = job_id(path)?;
    let job = Job::get(&state.db, id).await?;
    Ok(Json(JobResponse { job }))
}

#[instrument(skip(state, payload))]
pub async fn update_job(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    path: Result<Path<i32>, PathRejection>,
    ValidatedJson(payload): ValidatedJson<UpdateJob>,
) -> Result<Json<JobResponse>, AppError> {
    let id = job_id(path)?;
    let job = Job::update(&state.db, id, payload).await?;
    info!(job_id = id, "job updated");
    Ok(Json(JobResponse { job }))
}

#[instrument(skip(state))]
pub async fn delete_job(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = job_id(path)?;
    Job::remove(&state.db, id).await?;
    info!(job_id = id, "job deleted");
    Ok(Json(DeletedResponse {
        deleted: id.to_string(),
    }))
}
