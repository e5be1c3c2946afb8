use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Pool, Postgres};

use crate::{
    pkg::internal::{
        adaptors::{
            applications::{mutators::ApplicationMutator, selectors::ApplicationSelector},
            jobs::{mutators::JobMutator, selectors::JobSelector},
        },
        schema::JobPosting,
        store::JobStore,
    },
    prelude::{Error, Result},
};

pub fn db_pool(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)?;
    Ok(pool)
}

/// Postgres backend: postings in `jobs`, headers in `response_tables`,
/// submissions in `applications`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pool: Arc<PgPool>,
}

impl DocumentStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        DocumentStore { pool }
    }
}

#[async_trait]
impl JobStore for DocumentStore {
    async fn list_postings(&self) -> Result<Vec<JobPosting>> {
        let mut conn = self.pool.acquire().await?;
        let jobs = JobSelector::new(&mut conn).get_all().await?;
        Ok(jobs.into_iter().map(JobPosting::from).collect())
    }

    async fn get_posting(&self, id: &str) -> Result<Option<JobPosting>> {
        let mut conn = self.pool.acquire().await?;
        let job = JobSelector::new(&mut conn).get_by_id(id).await?;
        Ok(job.map(JobPosting::from))
    }

    async fn insert_posting(&self, posting: &JobPosting) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn).create(posting).await
    }

    async fn delete_posting(&self, id: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn).delete(id).await
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }

    async fn create_response_table(&self, posting: &JobPosting, headers: &[String]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn)
            .create_response_table(posting, headers)
            .await
    }

    async fn read_headers(&self, posting: &JobPosting) -> Result<Option<Vec<String>>> {
        let mut conn = self.pool.acquire().await?;
        let table = JobSelector::new(&mut conn)
            .get_response_table(&posting.id)
            .await?;
        Ok(table.map(|t| t.headers.0))
    }

    async fn append_headers(&self, posting: &JobPosting, headers: &[String]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        if !JobMutator::new(&mut conn)
            .append_headers(&posting.id, headers)
            .await?
        {
            return Err(Error::SheetNotFound(posting.title.clone()));
        }
        Ok(())
    }

    async fn append_row(&self, posting: &JobPosting, row: Vec<String>) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let entry = ApplicationMutator::new(&mut conn)
            .create(&posting.id, row)
            .await?;
        tracing::debug!("application {} stored for job {}", entry.id, &entry.job_id);
        Ok(())
    }

    async fn read_rows(&self, posting: &JobPosting) -> Result<Vec<Vec<String>>> {
        let mut conn = self.pool.acquire().await?;
        let rows = ApplicationSelector::new(&mut conn)
            .get_by_job(&posting.id)
            .await?;
        Ok(rows.into_iter().map(|r| r.row_values.0).collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("select 1").execute(&*self.pool).await?;
        Ok(())
    }
}
