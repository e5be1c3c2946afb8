use sqlx::PgConnection;

use crate::{
    pkg::internal::adaptors::jobs::spec::{JobEntry, ResponseTableEntry},
    prelude::Result,
};

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<JobEntry>> {
        let row = sqlx::query_as::<_, JobEntry>(
            "SELECT id, title, category, description, fields, created_at, active
             FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_all(&mut self) -> Result<Vec<JobEntry>> {
        let rows = sqlx::query_as::<_, JobEntry>(
            "SELECT id, title, category, description, fields, created_at, active
             FROM jobs ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_response_table(&mut self, job_id: &str) -> Result<Option<ResponseTableEntry>> {
        let row = sqlx::query_as::<_, ResponseTableEntry>(
            "SELECT job_id, title, headers FROM response_tables WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
