//! Inbound submission payloads and their normalization into print jobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::jobs::model::{DesignAttachment, JobSource, NewPrintJob};

/// Canva event that carries a finished export
pub const EXPORT_COMPLETED_EVENT: &str = "design.export.completed";

const DEFAULT_PAPER_SIZE: &str = "A4";
const DEFAULT_COLOR_MODE: &str = "color";
const DEFAULT_URGENCY: &str = "normal";
const DEFAULT_DESIGN_TITLE: &str = "Untitled Design";

/// Web form submission
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormJobRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Required
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Required
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of copies, defaults to 1
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub paper_size: Option<String>,
    #[serde(default)]
    pub color_mode: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub file_urls: Option<Vec<String>>,
}

impl FormJobRequest {
    pub fn into_new_job(self) -> Result<NewPrintJob> {
        let (Some(customer_email), Some(job_title)) =
            (non_blank(self.customer_email), non_blank(self.job_title))
        else {
            return Err(AppError::InvalidRequest(
                "Missing required fields: customerEmail, jobTitle".to_string(),
            ));
        };

        let quantity = match self.quantity.map(|q| q.value()).transpose()?.flatten() {
            None | Some(0) => 1,
            Some(q) if q < 0 => {
                return Err(AppError::InvalidRequest(
                    "quantity must be a positive number".to_string(),
                ))
            }
            Some(q) => i32::try_from(q)
                .map_err(|_| AppError::InvalidRequest("quantity is too large".to_string()))?,
        };

        let mut job = NewPrintJob::pending(JobSource::WebForm);
        job.customer_name = Some(non_blank(self.customer_name).unwrap_or_default());
        job.customer_email = Some(customer_email);
        job.customer_phone = Some(non_blank(self.customer_phone).unwrap_or_default());
        job.job_title = Some(job_title);
        job.description = Some(non_blank(self.description).unwrap_or_default());
        job.quantity = quantity;
        job.paper_size = Some(or_default(self.paper_size, DEFAULT_PAPER_SIZE));
        job.color_mode = Some(or_default(self.color_mode, DEFAULT_COLOR_MODE));
        job.urgency = Some(or_default(self.urgency, DEFAULT_URGENCY));
        job.file_urls = self
            .file_urls
            .unwrap_or_default()
            .into_iter()
            .filter(|url| !url.trim().is_empty())
            .collect();

        Ok(job)
    }
}

/// Copy count as sent by JSON clients (number) or HTML forms (string)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Quantity {
    Number(i64),
    Text(String),
}

impl Quantity {
    /// `None` for a blank string
    fn value(&self) -> Result<Option<i64>> {
        match self {
            Quantity::Number(n) => Ok(Some(*n)),
            Quantity::Text(s) if s.trim().is_empty() => Ok(None),
            Quantity::Text(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                AppError::InvalidRequest("quantity must be a positive number".to_string())
            }),
        }
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Quantity::Number(n)
    }
}

/// Forwarded email
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailJobRequest {
    /// Sender address, required
    #[serde(default)]
    pub from: Option<String>,
    /// Required
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub attachments: Option<Vec<serde_json::Value>>,
    /// RFC 3339 or RFC 2822 timestamp; unparsable values fall back to the arrival time
    #[serde(default)]
    pub received_at: Option<String>,
}

impl EmailJobRequest {
    pub fn into_new_job(self, now: DateTime<Utc>) -> Result<NewPrintJob> {
        let (Some(from), Some(subject)) = (non_blank(self.from), non_blank(self.subject)) else {
            return Err(AppError::InvalidRequest(
                "Missing required fields: from, subject".to_string(),
            ));
        };

        let mut job = NewPrintJob::pending(JobSource::Email);
        job.customer_email = Some(from);
        job.subject = Some(subject);
        job.description = Some(self.body.unwrap_or_default());
        job.attachments = self.attachments.unwrap_or_default();
        job.received_at = Some(
            self.received_at
                .as_deref()
                .and_then(parse_received_at)
                .unwrap_or(now),
        );

        Ok(job)
    }
}

/// Canva webhook payload
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CanvaWebhookEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub design_id: Option<String>,
    #[serde(default)]
    pub design_title: Option<String>,
    #[serde(default)]
    pub export_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Customer the design was made for, used to match an existing job
    #[serde(default)]
    pub customer_email: Option<String>,
}

impl CanvaWebhookEvent {
    pub fn is_export_completed(&self) -> bool {
        self.event_type.as_deref() == Some(EXPORT_COMPLETED_EVENT)
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Export details to store, either on a matched job or a new one
    pub fn design_attachment(&self) -> Result<DesignAttachment> {
        let design_id = non_blank(self.design_id.clone()).ok_or_else(|| {
            AppError::InvalidRequest("Missing required field: design_id".to_string())
        })?;

        Ok(DesignAttachment {
            design_id,
            design_title: or_default(self.design_title.clone(), DEFAULT_DESIGN_TITLE),
            export_url: non_blank(self.export_url.clone()),
            canva_user_id: non_blank(self.user_id.clone()),
        })
    }

    /// Standalone Canva job for exports that match no earlier submission
    pub fn into_new_job(self) -> Result<NewPrintJob> {
        let design = self.design_attachment()?;

        let mut job = NewPrintJob::pending(JobSource::Canva);
        job.customer_email = self.customer_email().map(str::to_string);
        job.design_id = Some(design.design_id);
        job.design_title = Some(design.design_title);
        job.export_url = design.export_url;
        job.canva_user_id = design.canva_user_id;
        job.created_at = self.timestamp;

        Ok(job)
    }
}

fn parse_received_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|at| at.with_timezone(&Utc))
        .ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}
