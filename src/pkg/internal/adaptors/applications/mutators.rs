use sqlx::{types::Json, PgConnection};

use crate::{pkg::internal::adaptors::applications::spec::ApplicationEntry, prelude::Result};

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    pub async fn create(&mut self, job_id: &str, row: Vec<String>) -> Result<ApplicationEntry> {
        let entry = sqlx::query_as::<_, ApplicationEntry>(
            r#"
            INSERT INTO applications (job_id, row_values)
            VALUES ($1, $2)
            RETURNING id, job_id, row_values, created_at
            "#,
        )
        .bind(job_id)
        .bind(Json(row))
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(entry)
    }
}
