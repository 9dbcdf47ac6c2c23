//! HTML pages: landing page and admin dashboard

use crate::jobs::JobQuery;
use crate::views;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

pub async fn home() -> Html<String> {
    Html(views::render_home())
}

/// Table of the most recent jobs
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    let query = JobQuery {
        limit: Some(state.settings.dashboard.recent_limit),
        ..Default::default()
    };

    match state.jobs.list(&query).await {
        Ok(jobs) => Html(views::render_job_table(&state.settings.dashboard.title, &jobs)).into_response(),
        Err(e) => load_failure(e),
    }
}

/// Card list of every job
pub async fn job_cards(State(state): State<Arc<AppState>>) -> Response {
    match state.jobs.list(&JobQuery::default()).await {
        Ok(jobs) => Html(views::render_job_cards(&jobs)).into_response(),
        Err(e) => load_failure(e),
    }
}

fn load_failure(e: crate::AppError) -> Response {
    error!(error = %e, "Failed to load jobs for dashboard");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::render_error(&e.public_message())),
    )
        .into_response()
}
