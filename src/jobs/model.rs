//! Print job records and their status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Where a print job came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    WebForm,
    Email,
    Canva,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::WebForm => "web_form",
            JobSource::Email => "email",
            JobSource::Canva => "canva",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web_form" => Ok(JobSource::WebForm),
            "email" => Ok(JobSource::Email),
            "canva" => Ok(JobSource::Canva),
            other => Err(AppError::InvalidRequest(format!("Unknown job source: {other}"))),
        }
    }
}

/// Print job status
///
/// `pending` → `asset_received` | `processing` → `completed` | `cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    AssetReceived,
    Processing,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::AssetReceived => "asset_received",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Whether a job in this status may move to `next`. Re-applying the
    /// current status is always allowed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, AssetReceived)
                | (Pending, Processing)
                | (Pending, Cancelled)
                | (AssetReceived, Processing)
                | (AssetReceived, Cancelled)
                | (Processing, Completed)
                | (Processing, Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "asset_received" => Ok(JobStatus::AssetReceived),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(AppError::InvalidRequest(format!("Unknown job status: {other}"))),
        }
    }
}

/// A stored print job
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PrintJob {
    pub id: Uuid,
    pub source: JobSource,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub job_title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub paper_size: Option<String>,
    pub color_mode: Option<String>,
    pub urgency: Option<String>,
    pub file_urls: Vec<String>,
    /// Email attachments as forwarded, shape is not interpreted
    #[schema(value_type = Vec<Object>)]
    pub attachments: Vec<serde_json::Value>,
    pub design_id: Option<String>,
    pub design_title: Option<String>,
    pub export_url: Option<String>,
    pub canva_user_id: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrintJob {
    /// Build a stored record from a normalized submission
    pub fn from_new(new: NewPrintJob, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: new.source,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            job_title: new.job_title,
            subject: new.subject,
            description: new.description,
            quantity: new.quantity,
            paper_size: new.paper_size,
            color_mode: new.color_mode,
            urgency: new.urgency,
            file_urls: new.file_urls,
            attachments: new.attachments,
            design_id: new.design_id,
            design_title: new.design_title,
            export_url: new.export_url,
            canva_user_id: new.canva_user_id,
            received_at: new.received_at,
            status: new.status,
            created_at: new.created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    /// Title shown on dashboards
    pub fn display_title(&self) -> &str {
        [&self.job_title, &self.design_title, &self.subject]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("Untitled Job")
    }

    /// Apply a design export to this job, last write wins
    pub fn attach_design(&mut self, design: &DesignAttachment, now: DateTime<Utc>) {
        self.design_id = Some(design.design_id.clone());
        self.design_title = Some(design.design_title.clone());
        if design.export_url.is_some() {
            self.export_url = design.export_url.clone();
        }
        if design.canva_user_id.is_some() {
            self.canva_user_id = design.canva_user_id.clone();
        }
        if self.status.can_transition_to(JobStatus::AssetReceived) {
            self.status = JobStatus::AssetReceived;
        }
        self.updated_at = now;
    }
}

/// A normalized submission, ready to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrintJob {
    pub source: JobSource,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub job_title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub paper_size: Option<String>,
    pub color_mode: Option<String>,
    pub urgency: Option<String>,
    pub file_urls: Vec<String>,
    pub attachments: Vec<serde_json::Value>,
    pub design_id: Option<String>,
    pub design_title: Option<String>,
    pub export_url: Option<String>,
    pub canva_user_id: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    /// Overrides the insert time (Canva webhooks carry their own timestamp)
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPrintJob {
    /// Empty pending submission for a source
    pub fn pending(source: JobSource) -> Self {
        Self {
            source,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
            job_title: None,
            subject: None,
            description: None,
            quantity: 1,
            paper_size: None,
            color_mode: None,
            urgency: None,
            file_urls: Vec::new(),
            attachments: Vec::new(),
            design_id: None,
            design_title: None,
            export_url: None,
            canva_user_id: None,
            received_at: None,
            status: JobStatus::Pending,
            created_at: None,
        }
    }
}

/// Canva export details attached to an existing job
#[derive(Debug, Clone, PartialEq)]
pub struct DesignAttachment {
    pub design_id: String,
    pub design_title: String,
    pub export_url: Option<String>,
    pub canva_user_id: Option<String>,
}

/// Filters for listing jobs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub limit: Option<i64>,
    pub source: Option<JobSource>,
    pub status: Option<JobStatus>,
}
