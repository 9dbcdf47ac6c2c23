//! Printssistant Backend
//!
//! Collects print jobs from a web form, an email relay and Canva webhooks into a
//! single job table, serves an admin dashboard over it, and runs the Canva OAuth
//! flow used to create designs on a customer's behalf.

pub mod api;
pub mod canva;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod views;

pub use error::{AppError, Result};

use std::sync::Arc;

use canva::{CanvaClient, TokenCache};
use db::JobStore;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub jobs: Arc<dyn JobStore>,
    pub canva: Arc<dyn CanvaClient>,
    pub tokens: Arc<TokenCache>,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        jobs: Arc<dyn JobStore>,
        canva: Arc<dyn CanvaClient>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            jobs,
            canva,
            tokens: Arc::new(TokenCache::new()),
        }
    }
}
