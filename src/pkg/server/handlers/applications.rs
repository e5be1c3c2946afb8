use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::{
    pkg::{
        internal::{
            form::{validate_submission, UploadedFile, PDF_MIME},
            reconcile::{JobKey, Submission},
            schema::{FieldType, JobPosting},
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

/// Multipart parts name their field by id or by label.
fn field_id_for(job: &JobPosting, part: &str) -> Option<String> {
    job.fields
        .iter()
        .find(|f| f.id == part)
        .or_else(|| job.field_by_label(part))
        .map(|f| f.id.clone())
}

pub async fn submit(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let job = state.reconciler.get_posting(&job_id).await?;
    let mut answers: HashMap<String, String> = HashMap::new();
    let mut files: Vec<UploadedFile> = vec![];
    let mut email = None;
    let mut submitted_at = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Invalid(format!("unreadable form data: {}", e)))?
    {
        let part = field.name().unwrap_or("").to_string();
        match part.as_str() {
            "email" => {
                email = Some(field.text().await.map_err(|e| Error::Invalid(e.to_string()))?);
                continue;
            }
            "submittedAt" => {
                submitted_at = Some(field.text().await.map_err(|e| Error::Invalid(e.to_string()))?);
                continue;
            }
            _ => {}
        }
        let Some(field_id) = field_id_for(&job, &part) else {
            tracing::debug!("ignoring unknown form part '{}'", &part);
            field
                .bytes()
                .await
                .map_err(|e| Error::Invalid(format!("unreadable form data: {}", e)))?;
            continue;
        };
        let is_file = job
            .fields
            .iter()
            .any(|f| f.id == field_id && f.kind == FieldType::File);
        if is_file {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::Invalid(format!("upload interrupted: {}", e)))?;
            if data.is_empty() {
                continue;
            }
            files.push(UploadedFile {
                field_id,
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let text = field.text().await.map_err(|e| Error::Invalid(e.to_string()))?;
            answers.insert(field_id, text);
        }
    }

    validate_submission(&job, &answers, &files)?;

    let millis = Utc::now().timestamp_millis();
    let mut set = JoinSet::new();
    for file in files {
        let blobs = state.blobs.clone();
        let key = file.object_key(&job.id, millis);
        set.spawn(async move {
            let url = blobs.upload_object(&key, file.data, PDF_MIME).await?;
            Ok::<(String, String), Error>((file.field_id, url))
        });
    }
    while let Some(result) = set.join_next().await {
        let (field_id, url) = result.map_err(|e| Error::Upload(e.to_string()))??;
        // file answers are keyed by label, same as the legacy form
        if let Some(field) = job.fields.iter().find(|f| f.id == field_id) {
            answers.insert(field.label.clone(), url);
        }
    }

    let submission = Submission {
        job: JobKey::id(&job.id),
        email,
        responses: answers,
        submitted_at,
    };
    state.reconciler.submit_application(submission).await?;
    Ok(Json(json!({ "status": "success", "jobId": job.id })))
}
