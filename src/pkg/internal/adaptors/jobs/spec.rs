use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::pkg::internal::schema::{FieldSpec, JobPosting};

#[derive(Debug, FromRow)]
pub struct JobEntry {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub fields: Json<Vec<FieldSpec>>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl From<JobEntry> for JobPosting {
    fn from(entry: JobEntry) -> Self {
        JobPosting {
            id: entry.id,
            title: entry.title,
            category: entry.category,
            description: entry.description,
            fields: entry.fields.0,
            created_at: entry.created_at,
            active: entry.active,
            sheet_name: None,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ResponseTableEntry {
    pub job_id: String,
    pub title: String,
    pub headers: Json<Vec<String>>,
}
