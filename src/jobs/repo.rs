use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Industry, Job, JobFilter, JobPatch, JobRow, NewJob, PageRequest};
use crate::db::StoreError;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: NewJob, owner_id: Uuid) -> Result<Job, StoreError>;
    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<Vec<Job>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError>;
    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Job>, StoreError>;
}

const JOB_COLUMNS: &str = "id, title, description, email, address, company, industry, \
                           positions, salary, posting_date, user_id";

/// Escapes `%`, `_` and `\` so a keyword is matched literally by `ILIKE`.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn into_job(row: JobRow) -> Result<Job, StoreError> {
    let id = row.id;
    Job::try_from(row)
        .with_context(|| format!("decode job {id}"))
        .map_err(StoreError::from)
}

fn industry_labels(industry: &[Industry]) -> Vec<String> {
    industry.iter().map(|i| i.as_str().to_string()).collect()
}

#[derive(Clone)]
pub struct PgJobStore {
    db: PgPool,
}

impl PgJobStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: NewJob, owner_id: Uuid) -> Result<Job, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (id, title, description, email, address, company, industry,
                              positions, salary, posting_date, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.email)
        .bind(&job.address)
        .bind(&job.company)
        .bind(industry_labels(&job.industry))
        .bind(job.positions)
        .bind(job.salary)
        .bind(job.posting_date)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;
        into_job(row)
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY posting_date DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.keyword.as_deref().map(like_pattern))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(into_job).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_job).transpose()
    }

    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs SET
                title        = COALESCE($2, title),
                description  = COALESCE($3, description),
                email        = COALESCE($4, email),
                address      = COALESCE($5, address),
                company      = COALESCE($6, company),
                industry     = COALESCE($7, industry),
                positions    = COALESCE($8, positions),
                salary       = COALESCE($9, salary),
                posting_date = COALESCE($10, posting_date)
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.email)
        .bind(patch.address)
        .bind(patch.company)
        .bind(patch.industry.as_deref().map(industry_labels))
        .bind(patch.positions)
        .bind(patch.salary)
        .bind(patch.posting_date)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_job).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "DELETE FROM jobs WHERE id = $1 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_job).transpose()
    }
}
