use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            auth::Admin,
            form::{form_for, FormSpec},
            reconcile::ApplicationTable,
            schema::{FieldSpec, JobPosting, NewPosting},
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct CreateJobInput {
    #[validate(length(min = 1, max = 200, message = "Job title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Option<Vec<FieldSpec>>,
}

impl From<CreateJobInput> for NewPosting {
    fn from(input: CreateJobInput) -> Self {
        NewPosting {
            title: input.title,
            category: input.category,
            description: input.description,
            fields: input.fields,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub active: Option<bool>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    fn matches(&self, job: &JobPosting) -> bool {
        let active = self.active.map_or(true, |active| job.active == active);
        let category = self
            .category
            .as_deref()
            .map_or(true, |c| c == "All" || job.category == c);
        let search = self.q.as_deref().map(str::to_lowercase).map_or(true, |q| {
            job.title.to_lowercase().contains(&q) || job.description.to_lowercase().contains(&q)
        });
        active && category && search
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<JobPosting>>> {
    let jobs = state
        .reconciler
        .list_postings()
        .await?
        .into_iter()
        .filter(|j| query.matches(j))
        .collect();
    Ok(Json(jobs))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobPosting>> {
    Ok(Json(state.reconciler.get_posting(&job_id).await?))
}

pub async fn form(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<FormSpec>> {
    let job = state.reconciler.get_posting(&job_id).await?;
    Ok(Json(form_for(&job)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<Arc<Admin>>,
    body: String,
) -> Result<Json<JobPosting>> {
    // malformed bodies surface as ERR-PAYLOAD-001
    let input: CreateJobInput = serde_json::from_str(&body)?;
    input
        .validate()
        .map_err(|e| Error::Invalid(e.to_string()))?;
    let job = state.reconciler.create_posting(input.into()).await?;
    tracing::info!("{} published job {}", &admin.email, &job.id);
    Ok(Json(job))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<Arc<Admin>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>> {
    state.reconciler.delete_posting(&job_id).await?;
    tracing::info!("{} removed job {}", &admin.email, &job_id);
    Ok(Json(json!({ "status": "success" })))
}

pub async fn applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ApplicationTable>> {
    Ok(Json(state.reconciler.read_applications(&job_id).await?))
}
