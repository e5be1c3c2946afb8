//! Legacy action endpoint. Always HTTP 200, `{"status": "success"}` or `{"error"}`.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    pkg::{
        internal::{reconcile::Submission, schema::NewPosting},
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

#[derive(Deserialize)]
struct ActionBody {
    action: String,
}

#[derive(Deserialize)]
struct DeleteJob {
    id: String,
}

fn reply(result: Result<Value>) -> Json<Value> {
    match result {
        Ok(value) => Json(value),
        Err(e) => {
            tracing::warn!("action failed: {}", &e);
            Json(json!({ "error": e.to_string() }))
        }
    }
}

pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<ActionQuery>,
) -> Json<Value> {
    let result = match params.action.as_deref() {
        Some("getJobs") => state
            .reconciler
            .list_postings()
            .await
            .and_then(|jobs| Ok(serde_json::to_value(jobs)?)),
        _ => Err(Error::UnknownAction),
    };
    reply(result)
}

/// Browsers send the body as `text/plain`.
pub async fn perform(State(state): State<AppState>, headers: HeaderMap, body: String) -> Json<Value> {
    reply(dispatch(&state, &headers, &body).await)
}

async fn dispatch(state: &AppState, headers: &HeaderMap, body: &str) -> Result<Value> {
    let payload: Value = serde_json::from_str(body)?;
    let ActionBody { action } = serde_json::from_value(payload.clone())?;
    match action.as_str() {
        "createJob" => {
            let admin = state.admin.check(headers).ok_or(Error::Unauthorized)?;
            let draft: NewPosting = serde_json::from_value(payload)?;
            let job = state.reconciler.create_posting(draft).await?;
            tracing::info!("{} published job {}", &admin.email, &job.id);
            let mut reply = json!({ "status": "success", "id": job.id });
            if let Some(sheet) = job.sheet_name {
                reply["sheetName"] = Value::String(sheet);
            }
            Ok(reply)
        }
        "submitApplication" => {
            let submission: Submission = serde_json::from_value(payload)?;
            let job = state.reconciler.submit_application(submission).await?;
            Ok(json!({ "status": "success", "jobId": job.id }))
        }
        "deleteJob" => {
            let admin = state.admin.check(headers).ok_or(Error::Unauthorized)?;
            let DeleteJob { id } = serde_json::from_value(payload)?;
            state.reconciler.delete_posting(&id).await?;
            tracing::info!("{} removed job {}", &admin.email, &id);
            Ok(json!({ "status": "success" }))
        }
        _ => Err(Error::UnknownAction),
    }
}
