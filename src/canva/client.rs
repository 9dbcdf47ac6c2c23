//! Canva REST API client - OAuth token endpoint and design creation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::config::CanvaConfig;
use crate::error::{AppError, Result};

const TOKEN_PATH: &str = "/rest/v1/oauth/token";
const DESIGNS_PATH: &str = "/rest/v1/designs";

/// Authorization code exchange parameters
#[derive(Debug, Clone)]
pub struct CodeExchange {
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub code_verifier: String,
}

/// Refresh grant parameters
#[derive(Debug, Clone)]
pub struct TokenRefresh {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Token endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Design dimensions, always in inches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DesignDimensions {
    pub unit: String,
    pub width: f64,
    pub height: f64,
}

/// Body sent to Canva's design creation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateDesignPayload {
    pub name: String,
    pub dimensions: DesignDimensions,
}

impl CreateDesignPayload {
    pub fn inches(name: String, width: f64, height: f64) -> Self {
        Self {
            name,
            dimensions: DesignDimensions {
                unit: "INCH".to_string(),
                width,
                height,
            },
        }
    }
}

/// Calls this service makes against Canva
#[async_trait]
pub trait CanvaClient: Send + Sync {
    /// Exchange an authorization code for tokens
    async fn exchange_code(&self, request: &CodeExchange) -> Result<TokenResponse>;

    /// Trade a refresh token for a new access token
    async fn refresh_token(&self, request: &TokenRefresh) -> Result<TokenResponse>;

    /// Create a blank design; Canva's response is returned untouched
    async fn create_design(
        &self,
        access_token: &str,
        payload: &CreateDesignPayload,
    ) -> Result<serde_json::Value>;
}

/// `reqwest` implementation of [`CanvaClient`]
pub struct HttpCanvaClient {
    client: Client,
    api_base: String,
}

impl HttpCanvaClient {
    pub fn new(config: &CanvaConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("printssistant-backend/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let grant_type = form
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        debug!(grant_type, "Requesting Canva token");

        let response = self.client.post(self.url(TOKEN_PATH)).form(form).send().await?;
        let response = ensure_success(response, "token").await?;
        Ok(response.json::<TokenResponse>().await?)
    }
}

/// Turn a non-2xx response into `AppError::Upstream` carrying the body text
async fn ensure_success(response: reqwest::Response, call: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(call, status = status.as_u16(), body = %body, "Canva request failed");
    Err(AppError::Upstream {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl CanvaClient for HttpCanvaClient {
    async fn exchange_code(&self, request: &CodeExchange) -> Result<TokenResponse> {
        self.post_token_form(&[
            ("grant_type", "authorization_code"),
            ("code", request.code.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
            ("code_verifier", request.code_verifier.as_str()),
        ])
        .await
    }

    async fn refresh_token(&self, request: &TokenRefresh) -> Result<TokenResponse> {
        self.post_token_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", request.refresh_token.as_str()),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
        ])
        .await
    }

    async fn create_design(
        &self,
        access_token: &str,
        payload: &CreateDesignPayload,
    ) -> Result<serde_json::Value> {
        debug!(name = %payload.name, "Creating Canva design");

        let response = self
            .client
            .post(self.url(DESIGNS_PATH))
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;
        let response = ensure_success(response, "create_design").await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}
