//! Canva webhook receiver

use crate::api::models::{ErrorResponse, WebhookResponse};
use crate::canva::webhook::{record_export, verify_signature, ExportOutcome, SIGNATURE_HEADER};
use crate::error::AppError;
use crate::jobs::CanvaWebhookEvent;
use crate::AppState;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use std::sync::Arc;
use tracing::info;

/// Receive a Canva webhook event.
///
/// The body is read raw so the signature can be checked over the exact bytes
/// Canva signed.
#[utoipa::path(
    post,
    path = "/api/webhooks/canva",
    request_body = CanvaWebhookEvent,
    responses(
        (status = 200, description = "Event processed", body = WebhookResponse),
        (status = 400, description = "Malformed event", body = ErrorResponse),
        (status = 401, description = "Invalid signature", body = ErrorResponse)
    ),
    tag = "Webhooks"
)]
pub async fn canva_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    if let Some(secret) = state
        .settings
        .canva
        .webhook_secret
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        verify_signature(secret, &body, signature)?;
    }

    let event: CanvaWebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid webhook payload: {e}")))?;

    info!(
        event_type = event.event_type.as_deref().unwrap_or_default(),
        design_id = event.design_id.as_deref().unwrap_or_default(),
        "Canva webhook received"
    );

    if !event.is_export_completed() {
        return Ok(Json(WebhookResponse::acknowledged()));
    }

    let response = match record_export(state.jobs.as_ref(), event).await? {
        ExportOutcome::Attached(job) => {
            WebhookResponse::with_job("Canva design attached to existing job", job)
        }
        ExportOutcome::Created(job) => WebhookResponse::with_job("Canva design received", job),
    };

    Ok(Json(response))
}
