use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationEntry {
    pub id: i64,
    pub job_id: String,
    pub row_values: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}
