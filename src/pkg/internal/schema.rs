use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::prelude::{Error, Result};

pub const IDENTITY_HEADER: &str = "Applicant Identity";
pub const SUBMITTED_HEADER: &str = "Submission Date";

const JOB_ID_LEN: usize = 20;
const FIELD_ID_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    File,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(kind: FieldType, label: &str, required: bool) -> Self {
        FieldSpec {
            id: field_id(),
            kind,
            label: label.to_string(),
            required,
        }
    }

    /// The pair every new posting starts with in the admin console.
    pub fn defaults() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                id: "1".into(),
                kind: FieldType::Text,
                label: "Full Name".into(),
                required: true,
            },
            FieldSpec {
                id: "2".into(),
                kind: FieldType::Text,
                label: "Email".into(),
                required: true,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub fields: Vec<FieldSpec>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl JobPosting {
    pub fn field_by_label(&self, label: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// Admin input for a new posting, before ids and timestamps are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPosting {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Option<Vec<FieldSpec>>,
}

impl NewPosting {
    pub fn new(title: &str, category: &str, description: &str, fields: Vec<FieldSpec>) -> Self {
        NewPosting {
            title: title.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            fields: Some(fields),
        }
    }

    /// Checks the draft and turns it into a posting with a fresh id.
    pub fn into_posting(self) -> Result<JobPosting> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Invalid("Job title is required".into()));
        }
        let mut fields = self.fields.unwrap_or_else(FieldSpec::defaults);
        validate_fields(&fields)?;
        let mut ids = HashSet::new();
        for field in fields.iter_mut() {
            field.label = field.label.trim().to_string();
            if field.id.trim().is_empty() || ids.contains(&field.id) {
                field.id = field_id();
            }
            ids.insert(field.id.clone());
        }
        Ok(JobPosting {
            id: job_id(),
            title: title.to_string(),
            category: self.category.trim().to_string(),
            description: self.description,
            fields,
            created_at: Utc::now(),
            active: true,
            sheet_name: None,
        })
    }
}

fn validate_fields(fields: &[FieldSpec]) -> Result<()> {
    if fields.iter().any(|f| f.label.trim().is_empty()) {
        return Err(Error::Invalid("Please provide labels for all fields".into()));
    }
    let mut seen = HashSet::new();
    for field in fields {
        let label = field.label.trim();
        if label == IDENTITY_HEADER || label == SUBMITTED_HEADER {
            return Err(Error::Invalid(format!("Field label '{}' is reserved", label)));
        }
        if !seen.insert(label) {
            return Err(Error::Invalid(format!("Duplicate field label '{}'", label)));
        }
    }
    Ok(())
}

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn job_id() -> String {
    random_token(JOB_ID_LEN)
}

pub fn field_id() -> String {
    random_token(FIELD_ID_LEN).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let draft: NewPosting =
            serde_json::from_str(r#"{"title":"Engineer","category":"Engineering"}"#).unwrap();
        let posting = draft.into_posting().unwrap();
        let labels: Vec<_> = posting.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Full Name", "Email"]);
        assert!(posting.active);
        assert_eq!(posting.id.len(), 20);
    }

    #[test]
    fn explicit_empty_field_list_is_kept() {
        let posting = NewPosting::new("Engineer", "Engineering", "", vec![])
            .into_posting()
            .unwrap();
        assert!(posting.fields.is_empty());
    }

    #[test]
    fn blank_labels_are_rejected() {
        let err = NewPosting::new(
            "Engineer",
            "Engineering",
            "",
            vec![FieldSpec::new(FieldType::Text, "  ", true)],
        )
        .into_posting()
        .unwrap_err();
        assert_eq!(err.to_string(), "Please provide labels for all fields");
    }

    #[test]
    fn duplicate_and_reserved_labels_are_rejected() {
        let dup = NewPosting::new(
            "Engineer",
            "",
            "",
            vec![
                FieldSpec::new(FieldType::Text, "Name", true),
                FieldSpec::new(FieldType::Text, "Name ", false),
            ],
        )
        .into_posting();
        assert!(matches!(dup, Err(Error::Invalid(_))));

        let reserved = NewPosting::new(
            "Engineer",
            "",
            "",
            vec![FieldSpec::new(FieldType::Text, SUBMITTED_HEADER, true)],
        )
        .into_posting();
        assert!(matches!(reserved, Err(Error::Invalid(_))));
    }

    #[test]
    fn missing_field_ids_are_generated() {
        let draft: NewPosting = serde_json::from_str(
            r#"{"title":"Designer","fields":[{"type":"file","label":"Resume"}]}"#,
        )
        .unwrap();
        let posting = draft.into_posting().unwrap();
        let field = &posting.fields[0];
        assert_eq!(field.id.len(), 9);
        assert_eq!(field.id, field.id.to_lowercase());
        assert!(field.required);
        assert_eq!(field.kind, FieldType::File);
    }

    #[test]
    fn repeated_field_ids_are_replaced() {
        let draft: NewPosting = serde_json::from_str(
            r#"{"title":"Designer","fields":[
                {"id":"1","type":"text","label":"Full Name"},
                {"id":"1","type":"text","label":"Portfolio URL"}
            ]}"#,
        )
        .unwrap();
        let posting = draft.into_posting().unwrap();
        assert_eq!(posting.fields[0].id, "1");
        assert_ne!(posting.fields[1].id, "1");
    }

    #[test]
    fn posting_serializes_in_camel_case() {
        let posting = NewPosting::new("Designer", "Design", "", vec![])
            .into_posting()
            .unwrap();
        let value = serde_json::to_value(&posting).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("sheetName").is_none());
    }
}
