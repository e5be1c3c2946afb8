use std::{collections::HashMap, path::Path};

use serde::Serialize;

use crate::{
    pkg::internal::schema::{FieldType, JobPosting},
    prelude::{Error, Result},
};

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub label: String,
    pub input_type: FieldType,
    pub required: bool,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    pub job_id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub inputs: Vec<FormInput>,
}

pub fn form_for(posting: &JobPosting) -> FormSpec {
    let inputs = posting
        .fields
        .iter()
        .map(|f| FormInput {
            name: f.id.clone(),
            label: f.label.clone(),
            input_type: f.kind,
            required: f.required,
            placeholder: format!("Enter {}...", f.label),
            accept: (f.kind == FieldType::File).then(|| PDF_MIME.to_string()),
        })
        .collect();
    FormSpec {
        job_id: posting.id.clone(),
        title: posting.title.clone(),
        category: posting.category.clone(),
        description: posting.description.clone(),
        inputs,
    }
}

const FALLBACK_FILE_NAME: &str = "upload.pdf";

/// A file part received for one of the posting's file fields.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_id: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Only what the client declared counts, a nameless untyped part is not a PDF.
    pub fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map_or(false, |ct| ct.eq_ignore_ascii_case(PDF_MIME));
        let by_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"));
        by_type || by_name
    }

    /// `applications/<job>/<millis>_<field>_<name>`, path separators stripped.
    pub fn object_key(&self, job_id: &str, millis: i64) -> String {
        let name: String = self
            .file_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("applications/{}/{}_{}_{}", job_id, millis, self.field_id, name)
    }
}

/// Checks text answers (keyed by field id) and uploads against the posting.
/// All problems are reported at once.
pub fn validate_submission(
    posting: &JobPosting,
    answers: &HashMap<String, String>,
    files: &[UploadedFile],
) -> Result<()> {
    let mut problems = vec![];
    for field in &posting.fields {
        match field.kind {
            FieldType::File => {
                let upload = files.iter().find(|f| f.field_id == field.id);
                match upload {
                    None if field.required => problems.push(format!("{} is required", field.label)),
                    None => {}
                    Some(file) if !file.is_pdf() => {
                        problems.push(format!("{} must be a PDF document", field.label))
                    }
                    Some(file) if file.data.len() > MAX_UPLOAD_BYTES => {
                        problems.push(format!("{} exceeds the 10MB limit", field.label))
                    }
                    Some(_) => {}
                }
            }
            FieldType::Text | FieldType::Number => {
                let value = answers.get(&field.id).map(|v| v.trim()).unwrap_or("");
                if value.is_empty() {
                    if field.required {
                        problems.push(format!("{} is required", field.label));
                    }
                    continue;
                }
                if field.kind == FieldType::Number
                    && !value.parse::<f64>().map_or(false, f64::is_finite)
                {
                    problems.push(format!("{} must be a number", field.label));
                }
            }
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Invalid(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::schema::{FieldSpec, NewPosting};

    fn posting() -> JobPosting {
        NewPosting::new(
            "Engineer",
            "Engineering",
            "",
            vec![
                FieldSpec::new(FieldType::Text, "Full Name", true),
                FieldSpec::new(FieldType::Number, "Years of Experience", false),
                FieldSpec::new(FieldType::File, "Resume", true),
            ],
        )
        .into_posting()
        .unwrap()
    }

    fn pdf(field_id: &str) -> UploadedFile {
        UploadedFile {
            field_id: field_id.to_string(),
            file_name: Some("cv.pdf".into()),
            content_type: Some(PDF_MIME.into()),
            data: b"%PDF-1.7".to_vec(),
        }
    }

    #[test]
    fn form_mirrors_field_order_and_types() {
        let p = posting();
        let form = form_for(&p);
        assert_eq!(form.inputs.len(), 3);
        assert_eq!(form.inputs[0].placeholder, "Enter Full Name...");
        assert_eq!(form.inputs[1].input_type, FieldType::Number);
        assert_eq!(form.inputs[2].accept.as_deref(), Some(PDF_MIME));
        assert_eq!(form.inputs[2].name, p.fields[2].id);
        assert!(form.inputs[0].accept.is_none());
    }

    #[test]
    fn complete_submission_passes() {
        let p = posting();
        let answers = HashMap::from([
            (p.fields[0].id.clone(), "Ann".to_string()),
            (p.fields[1].id.clone(), "4.5".to_string()),
        ]);
        assert!(validate_submission(&p, &answers, &[pdf(&p.fields[2].id)]).is_ok());
    }

    #[test]
    fn problems_are_collected() {
        let p = posting();
        let answers = HashMap::from([(p.fields[1].id.clone(), "lots".to_string())]);
        let err = validate_submission(&p, &answers, &[]).unwrap_err().to_string();
        assert_eq!(
            err,
            "Full Name is required; Years of Experience must be a number; Resume is required"
        );
    }

    #[test]
    fn non_pdf_and_oversized_uploads_are_rejected() {
        let p = posting();
        let answers = HashMap::from([(p.fields[0].id.clone(), "Ann".to_string())]);
        let mut doc = pdf(&p.fields[2].id);
        doc.file_name = Some("cv.docx".into());
        doc.content_type = Some("application/msword".into());
        assert!(validate_submission(&p, &answers, &[doc]).is_err());

        let mut big = pdf(&p.fields[2].id);
        big.data = vec![0; MAX_UPLOAD_BYTES + 1];
        assert!(validate_submission(&p, &answers, &[big]).is_err());
    }

    #[test]
    fn nameless_untyped_part_is_not_a_pdf() {
        let p = posting();
        let answers = HashMap::from([(p.fields[0].id.clone(), "Ann".to_string())]);
        let mut text = pdf(&p.fields[2].id);
        text.file_name = None;
        text.content_type = None;
        text.data = b"not a pdf at all".to_vec();
        assert!(!text.is_pdf());
        let err = validate_submission(&p, &answers, &[text]).unwrap_err();
        assert_eq!(err.to_string(), "Resume must be a PDF document");

        let mut typed = pdf(&p.fields[2].id);
        typed.file_name = None;
        assert!(typed.is_pdf());
    }

    #[test]
    fn object_keys_stay_under_the_job_prefix() {
        let mut file = pdf("f1");
        file.file_name = Some("../etc/cv.pdf".into());
        assert_eq!(
            file.object_key("job42", 1700000000000),
            "applications/job42/1700000000000_f1_.._etc_cv.pdf"
        );
        file.file_name = None;
        assert_eq!(
            file.object_key("job42", 1700000000000),
            "applications/job42/1700000000000_f1_upload.pdf"
        );
    }

    #[test]
    fn same_file_name_in_two_fields_gets_two_keys() {
        let resume = pdf("r1");
        let letter = pdf("c2");
        assert_ne!(resume.object_key("job42", 1), letter.object_key("job42", 1));
    }
}
