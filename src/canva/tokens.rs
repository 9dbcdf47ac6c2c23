//! In-process cache of the Canva tokens obtained through OAuth

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::info;

use crate::canva::client::{CanvaClient, TokenRefresh, TokenResponse};
use crate::config::CanvaConfig;
use crate::error::{AppError, Result};

/// Tokens are treated as expired this long before Canva says they are
const EXPIRY_SKEW_SECS: i64 = 30;
/// Characters of a token shown in summaries
const MASK_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone)]
struct CachedTokens {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Latest tokens from the authorization-code or refresh grant
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: RwLock<Option<CachedTokens>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a token response. A response without a refresh token keeps the previous one.
    pub fn store(&self, tokens: &TokenResponse, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        let previous_refresh = inner.as_ref().and_then(|t| t.refresh_token.clone());

        *inner = Some(CachedTokens {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone().or(previous_refresh),
            expires_at: tokens.expires_in.and_then(|secs| expiry_after(now, secs)),
        });
    }

    /// Cached access token if it is still valid at `now`
    pub fn access_token(&self, now: DateTime<Utc>) -> Option<String> {
        let inner = self.inner.read();
        let tokens = inner.as_ref()?;
        match tokens.expires_at {
            Some(expires_at) if expires_at <= now + Duration::seconds(EXPIRY_SKEW_SECS) => None,
            _ => Some(tokens.access_token.clone()),
        }
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().as_ref().and_then(|t| t.refresh_token.clone())
    }

    pub fn has_tokens(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

/// `None` (no expiry) when the lifetime does not fit a timestamp
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
}

/// First characters of a token followed by an ellipsis
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(MASK_PREFIX_LEN).collect();
    format!("{prefix}…")
}

/// Client id and secret, or the error the OAuth pages report
pub fn oauth_credentials(config: &CanvaConfig) -> Result<(String, String)> {
    match (config.client_id.as_deref(), config.client_secret.as_deref()) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
            Ok((id.to_string(), secret.to_string()))
        }
        _ => Err(AppError::MissingConfig(
            "Missing CANVA_CLIENT_ID or CANVA_CLIENT_SECRET in environment variables".to_string(),
        )),
    }
}

/// Run the refresh grant with the cached (or configured) refresh token and cache the result
pub async fn refresh_tokens(
    cache: &TokenCache,
    client: &dyn CanvaClient,
    config: &CanvaConfig,
) -> Result<TokenResponse> {
    let refresh_token = cache
        .refresh_token()
        .or_else(|| config.refresh_token.clone())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No Canva refresh token available".to_string()))?;
    let (client_id, client_secret) = oauth_credentials(config)?;

    let tokens = client
        .refresh_token(&TokenRefresh {
            refresh_token,
            client_id,
            client_secret,
        })
        .await?;

    cache.store(&tokens, Utc::now());
    info!(expires_in = ?tokens.expires_in, "Canva access token refreshed");
    Ok(tokens)
}

/// Access token for API calls.
///
/// Order: a valid cached token, a refreshed token when the cached one has
/// expired, then the token configured in the environment.
pub async fn current_access_token(
    cache: &TokenCache,
    client: &dyn CanvaClient,
    config: &CanvaConfig,
) -> Result<String> {
    if let Some(token) = cache.access_token(Utc::now()) {
        return Ok(token);
    }

    if cache.has_tokens() && cache.refresh_token().is_some() {
        let tokens = refresh_tokens(cache, client, config).await?;
        return Ok(tokens.access_token);
    }

    config
        .access_token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::MissingConfig("Missing CANVA_ACCESS_TOKEN in environment".to_string()))
}
