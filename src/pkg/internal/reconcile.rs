//! Keeps posting fields and response headers aligned. Headers are append-only.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    pkg::internal::{
        schema::{JobPosting, NewPosting, IDENTITY_HEADER, SUBMITTED_HEADER},
        store::JobStore,
    },
    prelude::{Error, Result},
};

pub const MISSING_VALUE: &str = "N/A";
pub const ANONYMOUS: &str = "anonymous";

const MAX_TAB_NAME: usize = 100;
const FORBIDDEN_TAB_CHARS: [char; 7] = ['[', ']', '*', '?', '/', '\\', ':'];

/// `[identity, submission date, label...]` in declaration order.
pub fn response_headers(posting: &JobPosting) -> Vec<String> {
    let mut headers = vec![IDENTITY_HEADER.to_string(), SUBMITTED_HEADER.to_string()];
    headers.extend(posting.fields.iter().map(|f| f.label.clone()));
    headers
}

/// Labels of `posting` that have no column in `headers` yet.
pub fn missing_headers(posting: &JobPosting, headers: &[String]) -> Vec<String> {
    posting
        .fields
        .iter()
        .filter(|f| !headers.iter().any(|h| h == &f.label))
        .map(|f| f.label.clone())
        .collect()
}

/// Tab name for `title` that does not clash with `taken`.
pub fn unique_tab_name(title: &str, taken: &[String]) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .filter(|c| !FORBIDDEN_TAB_CHARS.contains(c))
        .take(MAX_TAB_NAME)
        .collect();
    let base = match cleaned.trim() {
        "" => "Job".to_string(),
        name => name.to_string(),
    };
    if !taken.iter().any(|t| t == &base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!(" ({})", n);
        let stem: String = base.chars().take(MAX_TAB_NAME - suffix.len()).collect();
        let candidate = format!("{}{}", stem.trim_end(), suffix);
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Which posting a submission targets: id first, exact title as fallback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobKey {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

impl JobKey {
    pub fn id(id: &str) -> Self {
        JobKey {
            job_id: Some(id.to_string()),
            job_title: None,
        }
    }

    pub fn title(title: &str) -> Self {
        JobKey {
            job_id: None,
            job_title: Some(title.to_string()),
        }
    }
}

pub fn resolve<'a>(postings: &'a [JobPosting], key: &JobKey) -> Option<&'a JobPosting> {
    let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
    let by_id = non_empty(&key.job_id).and_then(|id| postings.iter().find(|p| p.id == id));
    by_id.or_else(|| {
        non_empty(&key.job_title).and_then(|title| postings.iter().find(|p| p.title == title))
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(flatten)]
    pub job: JobKey,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub responses: HashMap<String, String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

// form state may carry numbers or booleans, cells are always text
fn deserialize_answers<'de, D>(
    deserializer: D,
) -> core::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

fn answer<'a>(
    posting: &JobPosting,
    header: &str,
    responses: &'a HashMap<String, String>,
) -> Option<&'a str> {
    let by_id = posting
        .field_by_label(header)
        .and_then(|f| responses.get(&f.id));
    by_id
        .or_else(|| responses.get(header))
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Lays out one response row against `headers`.
pub fn build_row(posting: &JobPosting, headers: &[String], submission: &Submission) -> Vec<String> {
    let identity = submission
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(str::to_owned)
        .or_else(|| {
            posting
                .fields
                .iter()
                .find(|f| f.label.eq_ignore_ascii_case("email"))
                .and_then(|f| answer(posting, &f.label, &submission.responses))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| ANONYMOUS.to_string());
    let submitted_at = submission
        .submitted_at
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    headers
        .iter()
        .map(|header| match header.as_str() {
            IDENTITY_HEADER => identity.clone(),
            SUBMITTED_HEADER => submitted_at.clone(),
            label => answer(posting, label, &submission.responses)
                .unwrap_or(MISSING_VALUE)
                .to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn JobStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Reconciler { store }
    }

    pub async fn list_postings(&self) -> Result<Vec<JobPosting>> {
        let mut postings = self.store.list_postings().await?;
        postings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(postings)
    }

    pub async fn get_posting(&self, id: &str) -> Result<JobPosting> {
        self.store.get_posting(id).await?.ok_or(Error::JobNotFound)
    }

    pub async fn create_posting(&self, draft: NewPosting) -> Result<JobPosting> {
        let mut posting = draft.into_posting()?;
        if self.store.named_tables() {
            let taken = self.store.table_names().await?;
            posting.sheet_name = Some(unique_tab_name(&posting.title, &taken));
        }
        self.store.insert_posting(&posting).await?;
        let headers = response_headers(&posting);
        if let Err(e) = self.store.create_response_table(&posting, &headers).await {
            tracing::error!(
                "job {} saved but its response table was not created: {}",
                &posting.id,
                &e
            );
            return Err(e);
        }
        tracing::info!(
            "created job {} '{}' with {} fields",
            &posting.id,
            &posting.title,
            posting.fields.len()
        );
        Ok(posting)
    }

    pub async fn delete_posting(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() || !self.store.delete_posting(id).await? {
            return Err(Error::JobNotFound);
        }
        tracing::info!("deleted job {}, response data retained", id);
        Ok(())
    }

    /// Current headers of the posting's table, extended with any label that
    /// has no column yet.
    async fn reconcile_headers(&self, posting: &JobPosting) -> Result<Vec<String>> {
        let mut headers = self
            .store
            .read_headers(posting)
            .await?
            .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))?;
        let missing = missing_headers(posting, &headers);
        if !missing.is_empty() {
            tracing::debug!("adding columns {:?} for job {}", &missing, &posting.id);
            self.store.append_headers(posting, &missing).await?;
            headers.extend(missing);
        }
        Ok(headers)
    }

    pub async fn submit_application(&self, submission: Submission) -> Result<JobPosting> {
        let postings = self.list_postings().await?;
        let posting = resolve(&postings, &submission.job)
            .cloned()
            .ok_or(Error::JobNotFound)?;
        let headers = self.reconcile_headers(&posting).await?;
        let row = build_row(&posting, &headers, &submission);
        self.store.append_row(&posting, row).await?;
        tracing::info!("application recorded for job {}", &posting.id);
        Ok(posting)
    }

    pub async fn read_applications(&self, id: &str) -> Result<ApplicationTable> {
        let posting = self.get_posting(id).await?;
        let headers = self
            .store
            .read_headers(&posting)
            .await?
            .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))?;
        let rows = self
            .store
            .read_rows(&posting)
            .await?
            .into_iter()
            .map(|mut row| {
                if row.len() < headers.len() {
                    row.resize(headers.len(), MISSING_VALUE.to_string());
                }
                row
            })
            .collect();
        Ok(ApplicationTable { headers, rows })
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
