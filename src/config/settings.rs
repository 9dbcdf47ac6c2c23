//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config/printssistant.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub canva: CanvaConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration. Without a URL jobs are kept in memory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: true,
        }
    }
}

/// Canva OAuth client and API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CanvaConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_auth_path")]
    pub auth_path: String,
    #[serde(default = "default_scopes")]
    pub scopes: String,
    /// Redirect URI used for local development hosts
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Redirect URI used when the request host looks like production
    #[serde(default)]
    pub redirect_uri_prod: Option<String>,
    /// Host substrings that select the production redirect URI
    #[serde(default = "default_prod_host_markers")]
    pub prod_host_markers: Vec<String>,
    /// Long-lived token from the environment, used until an OAuth flow completes
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Shared secret for `x-canva-signature`; verification is skipped when unset
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_canva_timeout")]
    pub timeout_ms: u64,
}

fn default_api_base() -> String {
    "https://api.canva.com".to_string()
}

fn default_auth_base() -> String {
    "https://www.canva.com".to_string()
}

fn default_auth_path() -> String {
    "/api/rest/v1/oauth/authorize".to_string()
}

fn default_scopes() -> String {
    "design:content:read design:content:write asset:write asset:read webhook:manage".to_string()
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:3000/api/canva/auth".to_string()
}

fn default_prod_host_markers() -> Vec<String> {
    vec!["vercel.app".to_string(), "printssistant".to_string()]
}

fn default_canva_timeout() -> u64 {
    15000
}

impl Default for CanvaConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base: default_api_base(),
            auth_base: default_auth_base(),
            auth_path: default_auth_path(),
            scopes: default_scopes(),
            redirect_uri: default_redirect_uri(),
            redirect_uri_prod: None,
            prod_host_markers: default_prod_host_markers(),
            access_token: None,
            refresh_token: None,
            webhook_secret: None,
            timeout_ms: default_canva_timeout(),
        }
    }
}

/// API key protection for admin routes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_keys: Vec<String>,
}

/// Rate limiting for the public intake routes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    20
}

fn default_burst() -> u32 {
    40
}

/// Admin dashboard configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Rows shown on the `/admin` table
    #[serde(default = "default_recent_limit")]
    pub recent_limit: i64,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_recent_limit() -> i64 {
    50
}

fn default_title() -> String {
    "Printssistant Job Dashboard".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Plain environment variable names the deployment already uses, mapped to settings keys
const ENV_ALIASES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("SUPABASE_DB_URL", "database.url"),
    ("CANVA_CLIENT_ID", "canva.client_id"),
    ("CANVA_CLIENT_SECRET", "canva.client_secret"),
    ("CANVA_API_BASE", "canva.api_base"),
    ("CANVA_AUTH_BASE", "canva.auth_base"),
    ("CANVA_AUTH_PATH", "canva.auth_path"),
    ("CANVA_SCOPES", "canva.scopes"),
    ("CANVA_REDIRECT_URI", "canva.redirect_uri"),
    ("CANVA_REDIRECT_URI_PROD", "canva.redirect_uri_prod"),
    ("CANVA_ACCESS_TOKEN", "canva.access_token"),
    ("CANVA_REFRESH_TOKEN", "canva.refresh_token"),
    ("CANVA_WEBHOOK_SECRET", "canva.webhook_secret"),
];

impl Settings {
    /// Load settings from the default file and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("PRINTSSISTANT_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load settings from a specific YAML or TOML file, then apply environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "toml") {
            FileFormat::Toml
        } else {
            FileFormat::Yaml
        };

        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 10)?
            .set_default("database.run_migrations", true)?
            .set_default("canva.api_base", default_api_base())?
            .set_default("auth.enabled", false)?
            .set_default("auth.api_keys", Vec::<String>::new())?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.requests_per_second", 20)?
            .set_default("rate_limit.burst_size", 40)?
            .set_default("dashboard.recent_limit", 50)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?;

        if path.exists() {
            builder = builder.add_source(File::from(path).format(format));
        }

        // Deployment variable names are overrides and take precedence over everything else
        for (var, key) in ENV_ALIASES {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    builder = builder.set_override(*key, value)?;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("PRINTSSISTANT")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("auth.api_keys")
                .with_list_parse_key("canva.prod_host_markers")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(config_error("Server port cannot be 0"));
        }

        if self.database.max_connections == 0 {
            return Err(config_error("database.max_connections must be at least 1"));
        }

        if self.canva.prod_host_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(config_error(
                "canva.prod_host_markers must contain at least one entry",
            ));
        }

        if self.rate_limit.enabled
            && (self.rate_limit.requests_per_second == 0 || self.rate_limit.burst_size == 0)
        {
            return Err(config_error(
                "rate_limit.requests_per_second and burst_size must be positive",
            ));
        }

        if self.auth.enabled && self.auth.api_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(config_error("auth is enabled but no api_keys are configured"));
        }

        if self.dashboard.recent_limit <= 0 {
            return Err(config_error("dashboard.recent_limit must be positive"));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn config_error(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig::default(),
            canva: CanvaConfig::default(),
            auth: AuthConfig {
                enabled: false,
                api_keys: vec![],
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                requests_per_second: default_rps(),
                burst_size: default_burst(),
            },
            dashboard: DashboardConfig {
                recent_limit: default_recent_limit(),
                title: default_title(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
