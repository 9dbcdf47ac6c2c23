//! PostgreSQL job store backed by sqlx

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::db::JobStore;
use crate::error::{AppError, Result};
use crate::jobs::{DesignAttachment, JobQuery, JobStatus, NewPrintJob, PrintJob};

/// Column list for `print_jobs` queries.
const JOB_COLUMNS: &str = "\
    id, source, customer_name, customer_email, customer_phone, \
    job_title, subject, description, quantity, paper_size, color_mode, urgency, \
    file_urls, attachments, design_id, design_title, export_url, canva_user_id, \
    received_at, status, created_at, updated_at";

/// Create a connection pool from database settings
pub async fn create_pool(config: &DatabaseConfig, url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await?;
    Ok(pool)
}

/// Apply pending migrations from `./migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Raw `print_jobs` row; enums are stored as text
#[derive(Debug, sqlx::FromRow)]
struct PrintJobRow {
    id: Uuid,
    source: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    job_title: Option<String>,
    subject: Option<String>,
    description: Option<String>,
    quantity: i32,
    paper_size: Option<String>,
    color_mode: Option<String>,
    urgency: Option<String>,
    file_urls: Vec<String>,
    attachments: Json<Vec<serde_json::Value>>,
    design_id: Option<String>,
    design_title: Option<String>,
    export_url: Option<String>,
    canva_user_id: Option<String>,
    received_at: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrintJobRow> for PrintJob {
    type Error = AppError;

    fn try_from(row: PrintJobRow) -> Result<Self> {
        let id = row.id;
        let corrupt = |e: AppError| AppError::Internal(format!("corrupt print_jobs row {id}: {e}"));

        Ok(PrintJob {
            id,
            source: row.source.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            job_title: row.job_title,
            subject: row.subject,
            description: row.description,
            quantity: row.quantity,
            paper_size: row.paper_size,
            color_mode: row.color_mode,
            urgency: row.urgency,
            file_urls: row.file_urls,
            attachments: row.attachments.0,
            design_id: row.design_id,
            design_title: row.design_title,
            export_url: row.export_url,
            canva_user_id: row.canva_user_id,
            received_at: row.received_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Job store on a PostgreSQL pool
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lock a row for the rest of the transaction
    async fn lock_job(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<PrintJob> {
        let query = format!("SELECT {JOB_COLUMNS} FROM print_jobs WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, PrintJobRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::JobNotFound(id))?;
        row.try_into()
    }

    /// Write back the mutable fields of a locked job
    async fn save_job(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        job: &PrintJob,
    ) -> Result<PrintJob> {
        let query = format!(
            "UPDATE print_jobs SET \
                design_id = $2, design_title = $3, export_url = $4, canva_user_id = $5, \
                status = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PrintJobRow>(&query)
            .bind(job.id)
            .bind(job.design_id.as_deref())
            .bind(job.design_title.as_deref())
            .bind(job.export_url.as_deref())
            .bind(job.canva_user_id.as_deref())
            .bind(job.status.as_str())
            .bind(job.updated_at)
            .fetch_one(&mut **tx)
            .await?;
        row.try_into()
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, job: NewPrintJob) -> Result<PrintJob> {
        let job = PrintJob::from_new(job, Utc::now());

        let query = format!(
            "INSERT INTO print_jobs ({JOB_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                     $13, $14, $15, $16, $17, $18, $19, $20, $21, $22) \
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PrintJobRow>(&query)
            .bind(job.id)
            .bind(job.source.as_str())
            .bind(job.customer_name.as_deref())
            .bind(job.customer_email.as_deref())
            .bind(job.customer_phone.as_deref())
            .bind(job.job_title.as_deref())
            .bind(job.subject.as_deref())
            .bind(job.description.as_deref())
            .bind(job.quantity)
            .bind(job.paper_size.as_deref())
            .bind(job.color_mode.as_deref())
            .bind(job.urgency.as_deref())
            .bind(&job.file_urls)
            .bind(Json(&job.attachments))
            .bind(job.design_id.as_deref())
            .bind(job.design_title.as_deref())
            .bind(job.export_url.as_deref())
            .bind(job.canva_user_id.as_deref())
            .bind(job.received_at)
            .bind(job.status.as_str())
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> Result<Option<PrintJob>> {
        let query = format!("SELECT {JOB_COLUMNS} FROM print_jobs WHERE id = $1");
        sqlx::query_as::<_, PrintJobRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(PrintJob::try_from)
            .transpose()
    }

    async fn list(&self, query: &JobQuery) -> Result<Vec<PrintJob>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM print_jobs WHERE TRUE"));

        if let Some(source) = query.source {
            builder.push(" AND source = ").push_bind(source.as_str());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC, seq DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit.max(0));
        }

        builder
            .build_query_as::<PrintJobRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(PrintJob::try_from)
            .collect()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM print_jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn latest_for_email(&self, email: &str) -> Result<Option<PrintJob>> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM print_jobs \
             WHERE lower(customer_email) = lower($1) \
             ORDER BY created_at DESC, seq DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PrintJobRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(PrintJob::try_from)
            .transpose()
    }

    async fn attach_design(
        &self,
        id: Uuid,
        design: &DesignAttachment,
    ) -> Result<Option<PrintJob>> {
        let mut tx = self.pool.begin().await?;
        let mut job = Self::lock_job(&mut tx, id).await?;
        if job.status.is_terminal() {
            tx.rollback().await?;
            return Ok(None);
        }
        job.attach_design(design, Utc::now());
        let saved = Self::save_job(&mut tx, &job).await?;
        tx.commit().await?;
        Ok(Some(saved))
    }

    async fn update_status(&self, id: Uuid, status: JobStatus) -> Result<PrintJob> {
        let mut tx = self.pool.begin().await?;
        let mut job = Self::lock_job(&mut tx, id).await?;
        if !job.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: job.status,
                to: status,
            });
        }
        job.status = status;
        job.updated_at = Utc::now();
        let saved = Self::save_job(&mut tx, &job).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
