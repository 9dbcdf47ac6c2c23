//! HTTP route definitions

use crate::api::models::*;
use crate::api::{admin, canva_handlers, handlers, webhooks};
use crate::canva::client::{CreateDesignPayload, DesignDimensions};
use crate::jobs::{
    CanvaWebhookEvent, EmailJobRequest, FormJobRequest, JobSource, JobStatus, PrintJob,
    Quantity,
};
use crate::middleware::{AuthLayer, RateLimitLayer};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Printssistant Backend API",
        description = "Print job intake from web forms, email and Canva, with an admin dashboard and Canva OAuth.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        handlers::submit_form_job,
        handlers::submit_email_job,
        handlers::list_jobs,
        handlers::get_job,
        handlers::update_job_status,
        handlers::health_check,
        webhooks::canva_webhook,
        canva_handlers::start_auth,
        canva_handlers::auth_redirect,
        canva_handlers::auth_callback,
        canva_handlers::refresh_access_token,
        canva_handlers::create_design,
    ),
    components(schemas(
        PrintJob,
        JobSource,
        JobStatus,
        FormJobRequest,
        Quantity,
        EmailJobRequest,
        CanvaWebhookEvent,
        JobAcceptedResponse,
        WebhookResponse,
        JobListResponse,
        StatusUpdateRequest,
        ErrorResponse,
        HealthResponse,
        Dimension,
        CreateDesignRequest,
        CreateDesignPayload,
        DesignDimensions,
        TokenSummaryResponse,
    )),
    tags(
        (name = "Jobs", description = "Print job intake and browsing"),
        (name = "Webhooks", description = "Canva webhook receiver"),
        (name = "Canva", description = "Canva OAuth and design endpoints"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub async fn create_router(state: Arc<crate::AppState>) -> Router {
    let settings = state.settings.clone();

    // Public intake routes, rate limited
    let intake_routes = Router::new()
        .route("/api/jobs/form", post(handlers::submit_form_job))
        .route("/api/jobs/email", post(handlers::submit_email_job))
        .route("/api/webhooks/canva", post(webhooks::canva_webhook));

    let intake_routes = if settings.rate_limit.enabled {
        intake_routes.layer(RateLimitLayer::new(
            settings.rate_limit.requests_per_second,
            settings.rate_limit.burst_size,
        ))
    } else {
        intake_routes
    };

    // Admin routes: JSON job API, token refresh and dashboard pages
    let admin_routes = Router::new()
        .route("/api/jobs", get(handlers::list_jobs))
        .route("/api/jobs/:id", get(handlers::get_job))
        .route("/api/jobs/:id/status", patch(handlers::update_job_status))
        .route("/api/canva/refresh", post(canva_handlers::refresh_access_token))
        .route("/admin", get(admin::dashboard))
        .route("/admin/jobs", get(admin::job_cards));

    let admin_routes = if settings.auth.enabled {
        admin_routes.layer(AuthLayer::new(settings.auth.api_keys.clone()))
    } else {
        admin_routes
    };

    // Canva OAuth flow and design proxy
    let canva_routes = Router::new()
        .route("/api/canva/auth/start", get(canva_handlers::start_auth))
        .route("/api/canva/auth", get(canva_handlers::auth_redirect))
        .route("/api/canva/callback", get(canva_handlers::auth_callback))
        .route(
            "/api/canva/create",
            post(canva_handlers::create_design).get(canva_handlers::create_design_not_allowed),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(admin::home))
        // Health check endpoint (no auth required)
        .route("/health", get(handlers::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(intake_routes)
        .merge(admin_routes)
        .merge(canva_routes)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            settings.server.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
