use sqlx::{types::Json, PgConnection};

use crate::{pkg::internal::schema::JobPosting, prelude::Result};

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    pub async fn create(&mut self, job: &JobPosting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, category, description, fields, created_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.category)
        .bind(&job.description)
        .bind(Json(&job.fields))
        .bind(job.created_at)
        .bind(job.active)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn create_response_table(&mut self, job: &JobPosting, headers: &[String]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO response_tables (job_id, title, headers)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(Json(headers))
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn append_headers(&mut self, job_id: &str, headers: &[String]) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE response_tables SET headers = headers || $2 WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(Json(headers))
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
