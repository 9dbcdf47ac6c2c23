//! API key authentication for the admin routes

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::Arc;
use std::task::{Context, Poll};
use subtle::{Choice, ConstantTimeEq};
use tower::{Layer, Service};
use tracing::debug;

use crate::error::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Layer rejecting requests that carry none of the configured keys
#[derive(Clone)]
pub struct AuthLayer {
    keys: Arc<HashSet<String>>,
}

impl AuthLayer {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            keys: Arc::new(api_keys.into_iter().filter(|k| !k.is_empty()).collect()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            keys: self.keys.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    keys: Arc<HashSet<String>>,
}

impl<S> Service<Request> for AuthService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        if !is_authorized(&self.keys, request.headers()) {
            debug!(path = %request.uri().path(), "Rejected request without a valid API key");
            return Box::pin(async { Ok(AppError::Unauthorized.into_response()) });
        }

        // The clone is not ready yet, keep the instance poll_ready was called on
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(request).await })
    }
}

/// Key from `x-api-key`, or the token of an `Authorization: Bearer` header
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.trim());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Every configured key is compared in constant time
fn is_authorized(keys: &HashSet<String>, headers: &HeaderMap) -> bool {
    let Some(presented) = presented_key(headers) else {
        return false;
    };
    keys.iter()
        .fold(Choice::from(0), |found, key| {
            found | key.as_bytes().ct_eq(presented.as_bytes())
        })
        .into()
}
