//! Job intake, job browsing and health handlers

use crate::api::models::{
    ErrorResponse, HealthResponse, JobAcceptedResponse, JobListResponse, ListJobsParams,
    StatusUpdateRequest,
};
use crate::error::AppError;
use crate::jobs::{EmailJobRequest, FormJobRequest, JobStatus, PrintJob};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Accept a job submitted through the web form
#[utoipa::path(
    post,
    path = "/api/jobs/form",
    request_body = FormJobRequest,
    responses(
        (status = 200, description = "Job stored", body = JobAcceptedResponse),
        (status = 400, description = "Missing required fields or malformed body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn submit_form_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FormJobRequest>, JsonRejection>,
) -> Result<Json<JobAcceptedResponse>, AppError> {
    let Json(request) = payload?;
    let job = state.jobs.insert(request.into_new_job()?).await?;

    info!(
        job_id = %job.id,
        source = %job.source,
        customer_email = job.customer_email.as_deref().unwrap_or_default(),
        "Job received from web form"
    );

    Ok(Json(JobAcceptedResponse::new("Job received from web form", job)))
}

/// Accept a job forwarded from the email inbox
#[utoipa::path(
    post,
    path = "/api/jobs/email",
    request_body = EmailJobRequest,
    responses(
        (status = 200, description = "Job stored", body = JobAcceptedResponse),
        (status = 400, description = "Missing required fields or malformed body", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn submit_email_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmailJobRequest>, JsonRejection>,
) -> Result<Json<JobAcceptedResponse>, AppError> {
    let Json(request) = payload?;
    let job = state.jobs.insert(request.into_new_job(Utc::now())?).await?;

    info!(
        job_id = %job.id,
        source = %job.source,
        subject = job.subject.as_deref().unwrap_or_default(),
        "Job received from email"
    );

    Ok(Json(JobAcceptedResponse::new("Job received from email", job)))
}

/// List jobs, newest first
#[utoipa::path(
    get,
    path = "/api/jobs",
    params(ListJobsParams),
    responses(
        (status = 200, description = "Jobs", body = JobListResponse),
        (status = 400, description = "Unknown source or status filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<JobListResponse>, AppError> {
    let query = params.into_query()?;
    let jobs = state.jobs.list(&query).await?;

    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// Fetch a single job
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job", body = PrintJob),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PrintJob>, AppError> {
    state
        .jobs
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::JobNotFound(id))
}

/// Move a job to a new status
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/status",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated job", body = PrintJob),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn update_job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<PrintJob>, AppError> {
    let Json(request) = payload?;
    let status: JobStatus = request.status.parse()?;

    let job = state.jobs.update_status(id, status).await?;
    info!(job_id = %job.id, status = %job.status, "Job status updated");

    Ok(Json(job))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_healthy = state.jobs.health_check().await;

    Json(HealthResponse {
        status: if store_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.jobs.backend().to_string(),
        store_healthy,
        canva_tokens_cached: state.tokens.has_tokens(),
    })
}
