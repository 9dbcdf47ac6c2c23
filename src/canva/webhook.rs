//! Canva webhook handling - signature check and export reconciliation

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::info;

use crate::db::JobStore;
use crate::error::{AppError, Result};
use crate::jobs::{CanvaWebhookEvent, DesignAttachment, PrintJob};

pub const SIGNATURE_HEADER: &str = "x-canva-signature";

type HmacSha256 = Hmac<Sha256>;

/// Check a hex HMAC-SHA256 signature (optionally prefixed with `sha256=`) over the raw body
pub fn verify_signature(secret: &str, body: &[u8], signature: Option<&str>) -> Result<()> {
    let signature = signature
        .map(str::trim)
        .map(|s| s.strip_prefix("sha256=").unwrap_or(s))
        .ok_or(AppError::InvalidSignature)?;
    let expected = hex::decode(signature).map_err(|_| AppError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("invalid webhook secret: {e}")))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| AppError::InvalidSignature)
}

/// What a persisted export did to the job table
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The export was attached to the customer's most recent open job
    Attached(PrintJob),
    /// No open job matched, a new Canva job was created
    Created(PrintJob),
}

impl ExportOutcome {
    pub fn job(&self) -> &PrintJob {
        match self {
            ExportOutcome::Attached(job) | ExportOutcome::Created(job) => job,
        }
    }
}

/// Persist a `design.export.completed` event.
///
/// When the event names a customer email and that customer's most recent job
/// is still open, the export is written onto that row (last write wins).
/// Otherwise a standalone Canva job is inserted.
pub async fn record_export(store: &dyn JobStore, event: CanvaWebhookEvent) -> Result<ExportOutcome> {
    let design = event.design_attachment()?;

    if let Some(email) = event.customer_email() {
        if let Some(job) = attach_to_open_job(store, email, &design).await? {
            info!(
                job_id = %job.id,
                design_id = %design.design_id,
                "Attached Canva export to existing job"
            );
            return Ok(ExportOutcome::Attached(job));
        }
    }

    let job = store.insert(event.into_new_job()?).await?;
    info!(job_id = %job.id, design_id = %design.design_id, "Created Canva job");
    Ok(ExportOutcome::Created(job))
}

async fn attach_to_open_job(
    store: &dyn JobStore,
    email: &str,
    design: &DesignAttachment,
) -> Result<Option<PrintJob>> {
    match store.latest_for_email(email).await? {
        Some(existing) if !existing.status.is_terminal() => {
            // The store re-checks the status under its lock
            store.attach_design(existing.id, design).await
        }
        _ => Ok(None),
    }
}
