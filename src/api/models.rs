//! API request and response models

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::canva::tokens::mask_token;
use crate::canva::TokenResponse;
use crate::error::{AppError, Result};
use crate::jobs::{JobQuery, JobSource, JobStatus, PrintJob};

/// Default page size of `GET /api/jobs`
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Largest page `GET /api/jobs` returns
pub const MAX_LIST_LIMIT: i64 = 500;

/// Response to a stored job
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct JobAcceptedResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
    pub data: PrintJob,
}

impl JobAcceptedResponse {
    pub fn new(message: impl Into<String>, job: PrintJob) -> Self {
        Self {
            success: true,
            message: message.into(),
            job_id: job.id,
            data: job,
        }
    }
}

/// Response to a Canva webhook delivery
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    /// Present when the event touched a job
    #[serde(rename = "jobId", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrintJob>,
}

impl WebhookResponse {
    pub fn acknowledged() -> Self {
        Self {
            success: true,
            message: "Webhook received".to_string(),
            job_id: None,
            data: None,
        }
    }

    pub fn with_job(message: impl Into<String>, job: PrintJob) -> Self {
        Self {
            success: true,
            message: message.into(),
            job_id: Some(job.id),
            data: Some(job),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Query parameters of `GET /api/jobs`
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListJobsParams {
    /// Page size (default 50, max 500)
    pub limit: Option<i64>,
    /// Filter by source: web_form, email or canva
    pub source: Option<String>,
    /// Filter by status
    pub status: Option<String>,
}

impl ListJobsParams {
    pub fn into_query(self) -> Result<JobQuery> {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        Ok(JobQuery {
            limit: Some(limit),
            source: self
                .source
                .as_deref()
                .map(str::parse::<JobSource>)
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<JobStatus>)
                .transpose()?,
        })
    }
}

/// Page of jobs
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct JobListResponse {
    pub jobs: Vec<PrintJob>,
    pub count: usize,
}

/// Body of `PATCH /api/jobs/:id/status`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatusUpdateRequest {
    /// Target status
    pub status: String,
}

/// Width or height sent as a number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

impl Dimension {
    /// Positive finite value, `None` for zero, negative or unparsable input
    pub fn inches(&self) -> Option<f64> {
        let value = match self {
            Dimension::Number(n) => *n,
            Dimension::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Body of `POST /api/canva/create`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateDesignRequest {
    pub name: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
}

impl CreateDesignRequest {
    /// Name and dimensions, or the error reported for incomplete bodies
    pub fn validate(&self) -> Result<(String, f64, f64)> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let width = self.width.as_ref().and_then(Dimension::inches);
        let height = self.height.as_ref().and_then(Dimension::inches);

        match (name, width, height) {
            (Some(name), Some(width), Some(height)) => Ok((name.to_string(), width, height)),
            _ => Err(AppError::InvalidRequest(
                "Missing required fields: name, width, height".to_string(),
            )),
        }
    }
}

/// Query of `GET /api/canva/auth/start`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StartAuthParams {
    /// Canva consent prompt, defaults to `consent`
    pub prompt: Option<String>,
}

/// Query Canva appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Masked view of freshly obtained tokens
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TokenSummaryResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl From<&TokenResponse> for TokenSummaryResponse {
    fn from(tokens: &TokenResponse) -> Self {
        Self {
            success: true,
            access_token: mask_token(&tokens.access_token),
            refresh_token: tokens.refresh_token.as_deref().map(mask_token),
            expires_in: tokens.expires_in,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Job store backend (`postgres` or `memory`)
    pub store: String,
    pub store_healthy: bool,
    pub canva_tokens_cached: bool,
}
