//! OAuth redirect URI selection based on the request host

use axum::http::HeaderMap;

use crate::config::CanvaConfig;

/// Route Canva redirects to after consent (and the default path for start)
pub const AUTH_PATH: &str = "/api/canva/auth";
/// Alternative redirect route matching the usual Canva app settings
pub const CALLBACK_PATH: &str = "/api/canva/callback";

/// Lower-cased host from `x-forwarded-host`, falling back to `host`
pub fn request_host(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-host")
        .or_else(|| header_str(headers, "host"))
        .unwrap_or_default()
        .to_lowercase()
}

/// Whether the host looks like a production deployment
pub fn is_production_host(config: &CanvaConfig, host: &str) -> bool {
    config
        .prod_host_markers
        .iter()
        .map(|m| m.trim())
        .any(|marker| !marker.is_empty() && host.contains(marker))
}

/// Redirect URI to send to Canva for a request arriving at `route_path`.
///
/// Production hosts use `redirect_uri_prod`, or a URI computed from the
/// forwarded host and protocol when none is configured. Anything else uses
/// the local `redirect_uri`.
pub fn redirect_uri(config: &CanvaConfig, headers: &HeaderMap, route_path: &str) -> String {
    let host = request_host(headers);

    if host.is_empty() || !is_production_host(config, &host) {
        return config.redirect_uri.clone();
    }

    if let Some(uri) = config.redirect_uri_prod.as_deref().filter(|u| !u.is_empty()) {
        return uri.to_string();
    }

    let proto = header_str(headers, "x-forwarded-proto")
        .unwrap_or("https")
        .to_lowercase();
    format!("{proto}://{host}{route_path}")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
