//! Job storage - the `JobStore` trait and its PostgreSQL and in-memory implementations

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::jobs::{DesignAttachment, JobQuery, JobStatus, NewPrintJob, PrintJob};

pub use memory::InMemoryJobStore;
pub use postgres::{create_pool, run_migrations, PgJobStore};

/// Persistence for print jobs
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Short name of the storage backend, reported by the health check
    fn backend(&self) -> &'static str;

    /// Insert a new job and return the stored row
    async fn insert(&self, job: NewPrintJob) -> Result<PrintJob>;

    async fn get(&self, id: Uuid) -> Result<Option<PrintJob>>;

    /// Jobs matching the query, newest first
    async fn list(&self, query: &JobQuery) -> Result<Vec<PrintJob>>;

    async fn count(&self) -> Result<i64>;

    /// Most recently created job for a customer email, compared case-insensitively.
    /// Equal timestamps resolve to the later insert.
    async fn latest_for_email(&self, email: &str) -> Result<Option<PrintJob>>;

    /// Store Canva export details on an existing job.
    ///
    /// Returns `None` without writing when the job is completed or cancelled
    /// by the time its row is locked.
    async fn attach_design(&self, id: Uuid, design: &DesignAttachment)
        -> Result<Option<PrintJob>>;

    /// Move a job to a new status, rejecting disallowed transitions
    async fn update_status(&self, id: Uuid, status: JobStatus) -> Result<PrintJob>;

    /// Whether the store is reachable
    async fn health_check(&self) -> bool;
}
