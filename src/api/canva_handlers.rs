//! Canva OAuth and design handlers

use crate::api::models::{
    AuthCallbackParams, CreateDesignRequest, ErrorResponse, StartAuthParams, TokenSummaryResponse,
};
use crate::canva::pkce::{generate_state, PkcePair, CHALLENGE_METHOD};
use crate::canva::redirect::{redirect_uri, AUTH_PATH, CALLBACK_PATH};
use crate::canva::tokens::{current_access_token, oauth_credentials, refresh_tokens};
use crate::canva::{CodeExchange, CreateDesignPayload};
use crate::error::AppError;
use crate::views;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub const VERIFIER_COOKIE: &str = "canva_code_verifier";
pub const STATE_COOKIE: &str = "canva_oauth_state";
const OAUTH_COOKIE_MAX_AGE_SECS: i64 = 600;
const DEFAULT_PROMPT: &str = "consent";

fn oauth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(OAUTH_COOKIE_MAX_AGE_SECS))
        .build()
}

fn clear_oauth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(VERIFIER_COOKIE).path("/"))
        .remove(Cookie::build(STATE_COOKIE).path("/"))
}

/// Start the Canva authorization flow
#[utoipa::path(
    get,
    path = "/api/canva/auth/start",
    params(StartAuthParams),
    responses(
        (status = 302, description = "Redirect to Canva consent"),
        (status = 500, description = "Client id not configured", body = ErrorResponse)
    ),
    tag = "Canva"
)]
pub async fn start_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<StartAuthParams>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let config = &state.settings.canva;
    let client_id = config
        .client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AppError::MissingConfig(
                "Missing CANVA_CLIENT_ID env variable. Add it to start the OAuth flow.".to_string(),
            )
        })?;

    let pkce = PkcePair::generate();
    let oauth_state = generate_state();
    let redirect = redirect_uri(config, &headers, AUTH_PATH);
    let prompt = params
        .prompt
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let authorize_url = url::Url::parse_with_params(
        &format!("{}{}", config.auth_base.trim_end_matches('/'), config.auth_path),
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect.as_str()),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", CHALLENGE_METHOD),
            ("scope", config.scopes.as_str()),
            ("state", oauth_state.as_str()),
            ("prompt", prompt.as_str()),
        ],
    )
    .map_err(|e| AppError::Internal(format!("Invalid Canva authorize URL: {e}")))?;

    info!(redirect_uri = %redirect, "Starting Canva OAuth flow");

    let jar = jar
        .add(oauth_cookie(VERIFIER_COOKIE, pkce.verifier))
        .add(oauth_cookie(STATE_COOKIE, oauth_state));

    Ok((
        StatusCode::FOUND,
        jar,
        [(header::LOCATION, authorize_url.to_string())],
    )
        .into_response())
}

/// Canva redirect target registered as `/api/canva/auth`
#[utoipa::path(
    get,
    path = "/api/canva/auth",
    params(AuthCallbackParams),
    responses(
        (status = 200, description = "Token summary page", body = String, content_type = "text/html"),
        (status = 400, description = "Missing code or verifier cookie", body = String, content_type = "text/plain")
    ),
    tag = "Canva"
)]
pub async fn auth_redirect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<AuthCallbackParams>,
    jar: CookieJar,
) -> Response {
    complete_authorization(&state, &headers, params, jar, AUTH_PATH).await
}

/// Canva redirect target registered as `/api/canva/callback`; also checks `state`
#[utoipa::path(
    get,
    path = "/api/canva/callback",
    params(AuthCallbackParams),
    responses(
        (status = 200, description = "Token summary page", body = String, content_type = "text/html"),
        (status = 400, description = "Missing code, verifier cookie or state mismatch", body = String, content_type = "text/plain")
    ),
    tag = "Canva"
)]
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<AuthCallbackParams>,
    jar: CookieJar,
) -> Response {
    complete_authorization(&state, &headers, params, jar, CALLBACK_PATH).await
}

async fn complete_authorization(
    state: &AppState,
    headers: &HeaderMap,
    params: AuthCallbackParams,
    jar: CookieJar,
    route_path: &str,
) -> Response {
    match exchange_authorization_code(state, headers, params, &jar, route_path).await {
        Ok(tokens) => {
            state.tokens.store(&tokens, Utc::now());
            info!(expires_in = ?tokens.expires_in, "Canva tokens acquired");
            (
                clear_oauth_cookies(jar),
                Html(views::render_token_summary(&tokens)),
            )
                .into_response()
        }
        Err(e) => e.into_plain_response(),
    }
}

async fn exchange_authorization_code(
    state: &AppState,
    headers: &HeaderMap,
    params: AuthCallbackParams,
    jar: &CookieJar,
    route_path: &str,
) -> Result<crate::canva::TokenResponse, AppError> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Missing `code` query parameter".to_string()))?;

    let code_verifier = jar
        .get(VERIFIER_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "Missing PKCE code_verifier cookie. Start the OAuth flow again.".to_string(),
            )
        })?;

    if route_path == CALLBACK_PATH {
        let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
        match (params.state.as_deref(), expected.as_deref()) {
            (Some(received), Some(expected)) if !received.is_empty() && received == expected => {}
            _ => {
                warn!("OAuth state mismatch on Canva callback");
                return Err(AppError::InvalidRequest(
                    "Invalid or missing OAuth state. Start the flow again.".to_string(),
                ));
            }
        }
    }

    let config = &state.settings.canva;
    let (client_id, client_secret) = oauth_credentials(config)?;

    state
        .canva
        .exchange_code(&CodeExchange {
            code,
            redirect_uri: redirect_uri(config, headers, route_path),
            client_id,
            client_secret,
            code_verifier,
        })
        .await
}

/// Refresh the Canva access token
#[utoipa::path(
    post,
    path = "/api/canva/refresh",
    responses(
        (status = 200, description = "Masked refreshed tokens", body = TokenSummaryResponse),
        (status = 400, description = "No refresh token available", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    tag = "Canva"
)]
pub async fn refresh_access_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TokenSummaryResponse>, AppError> {
    let tokens = refresh_tokens(&state.tokens, state.canva.as_ref(), &state.settings.canva).await?;
    Ok(Json(TokenSummaryResponse::from(&tokens)))
}

/// Create a blank Canva design
#[utoipa::path(
    post,
    path = "/api/canva/create",
    request_body = CreateDesignRequest,
    responses(
        (status = 200, description = "Canva's design response"),
        (status = 400, description = "Missing fields or invalid JSON", body = ErrorResponse),
        (status = 500, description = "No access token configured", body = ErrorResponse)
    ),
    tag = "Canva"
)]
pub async fn create_design(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDesignRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) =
        payload.map_err(|_| AppError::InvalidRequest("Invalid JSON body".to_string()))?;
    let (name, width, height) = request.validate()?;

    let access_token =
        current_access_token(&state.tokens, state.canva.as_ref(), &state.settings.canva).await?;
    let payload = CreateDesignPayload::inches(name, width, height);

    match state.canva.create_design(&access_token, &payload).await {
        Ok(design) => {
            info!(name = %payload.name, "Canva design created");
            Ok(Json(design).into_response())
        }
        Err(AppError::Upstream { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok((
                status,
                Json(json!({ "error": "Failed to create design", "details": body })),
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /api/canva/create`
pub async fn create_design_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
