//! In-memory job store, used when no database is configured

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::db::JobStore;
use crate::error::{AppError, Result};
use crate::jobs::{DesignAttachment, JobQuery, JobStatus, NewPrintJob, PrintJob};

/// Job store kept in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<Vec<PrintJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<PrintJob>
    where
        F: FnOnce(&mut PrintJob) -> Result<()>,
    {
        let mut jobs = self.jobs.write();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(AppError::JobNotFound(id))?;
        apply(job)?;
        Ok(job.clone())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, job: NewPrintJob) -> Result<PrintJob> {
        let job = PrintJob::from_new(job, Utc::now());
        self.jobs.write().push(job.clone());
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PrintJob>> {
        Ok(self.jobs.read().iter().find(|j| j.id == id).cloned())
    }

    async fn list(&self, query: &JobQuery) -> Result<Vec<PrintJob>> {
        // Newest insert first, then a stable sort keeps that order for equal timestamps
        let mut jobs: Vec<PrintJob> = self
            .jobs
            .read()
            .iter()
            .rev()
            .filter(|j| query.source.map_or(true, |s| j.source == s))
            .filter(|j| query.status.map_or(true, |s| j.status == s))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = query.limit {
            jobs.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(jobs)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.jobs.read().len() as i64)
    }

    async fn latest_for_email(&self, email: &str) -> Result<Option<PrintJob>> {
        let jobs = self.jobs.read();
        // max_by_key keeps the last maximum, so ties go to the newest insert
        let latest = jobs
            .iter()
            .filter(|j| {
                j.customer_email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .max_by_key(|j| j.created_at)
            .cloned();
        Ok(latest)
    }

    async fn attach_design(
        &self,
        id: Uuid,
        design: &DesignAttachment,
    ) -> Result<Option<PrintJob>> {
        let mut jobs = self.jobs.write();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(AppError::JobNotFound(id))?;
        if job.status.is_terminal() {
            return Ok(None);
        }
        job.attach_design(design, Utc::now());
        Ok(Some(job.clone()))
    }

    async fn update_status(&self, id: Uuid, status: JobStatus) -> Result<PrintJob> {
        self.update(id, |job| {
            if !job.status.can_transition_to(status) {
                return Err(AppError::InvalidTransition {
                    from: job.status,
                    to: status,
                });
            }
            job.status = status;
            job.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}
