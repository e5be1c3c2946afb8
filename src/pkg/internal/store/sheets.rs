//! Workbook of named tabs: `Jobs` metadata plus one response tab per posting.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    pkg::internal::{schema::JobPosting, store::JobStore},
    prelude::{Error, Result},
};

pub const JOBS_SHEET: &str = "Jobs";

const JOBS_HEADERS: [&str; 8] = [
    "ID",
    "Title",
    "Category",
    "Description",
    "Fields",
    "Created At",
    "Active",
    "Sheet Name",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: Vec<String>) -> Self {
        Sheet {
            name: name.to_string(),
            rows: vec![headers],
        }
    }

    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    fn jobs_mut(&mut self) -> &mut Sheet {
        if self.sheet(JOBS_SHEET).is_none() {
            let headers = JOBS_HEADERS.iter().map(|h| h.to_string()).collect();
            self.sheets.push(Sheet::new(JOBS_SHEET, headers));
        }
        // the tab was inserted above if it was missing
        let idx = self
            .sheets
            .iter()
            .position(|s| s.name == JOBS_SHEET)
            .unwrap_or_default();
        &mut self.sheets[idx]
    }

    fn postings(&self) -> Vec<JobPosting> {
        let Some(jobs) = self.sheet(JOBS_SHEET) else {
            return vec![];
        };
        jobs.rows
            .iter()
            .skip(1)
            .filter_map(|row| match decode_posting(row) {
                Ok(posting) => Some(posting),
                Err(e) => {
                    tracing::warn!("skipping unreadable row in {} tab: {}", JOBS_SHEET, e);
                    None
                }
            })
            .collect()
    }
}

fn encode_posting(posting: &JobPosting) -> Result<Vec<String>> {
    Ok(vec![
        posting.id.clone(),
        posting.title.clone(),
        posting.category.clone(),
        posting.description.clone(),
        serde_json::to_string(&posting.fields)?,
        posting.created_at.to_rfc3339(),
        if posting.active { "TRUE" } else { "FALSE" }.to_string(),
        posting.sheet_name.clone().unwrap_or_default(),
    ])
}

fn decode_posting(row: &[String]) -> Result<JobPosting> {
    let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
    let created_at = DateTime::parse_from_rfc3339(cell(5))
        .map_err(|e| Error::Invalid(format!("bad timestamp '{}': {}", cell(5), e)))?
        .with_timezone(&Utc);
    let sheet_name = Some(cell(7).to_string()).filter(|s| !s.is_empty());
    Ok(JobPosting {
        id: cell(0).to_string(),
        title: cell(1).to_string(),
        category: cell(2).to_string(),
        description: cell(3).to_string(),
        fields: serde_json::from_str(cell(4))?,
        created_at,
        active: cell(6).eq_ignore_ascii_case("true"),
        sheet_name,
    })
}

pub struct SheetStore {
    workbook: RwLock<Workbook>,
    path: Option<PathBuf>,
}

impl SheetStore {
    pub fn in_memory() -> Self {
        SheetStore {
            workbook: RwLock::new(Workbook::default()),
            path: None,
        }
    }

    /// Loads the snapshot at `path`, or starts empty when there is none yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no workbook at {}, starting empty", path.display());
                Workbook::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(SheetStore {
            workbook: RwLock::new(workbook),
            path: Some(path),
        })
    }

    async fn persist(&self, workbook: &Workbook) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(workbook)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        tracing::debug!("workbook saved to {}", path.display());
        Ok(())
    }
}

fn tab_name(posting: &JobPosting) -> Result<&str> {
    posting
        .sheet_name
        .as_deref()
        .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))
}

#[async_trait]
impl JobStore for SheetStore {
    async fn list_postings(&self) -> Result<Vec<JobPosting>> {
        Ok(self.workbook.read().await.postings())
    }

    async fn get_posting(&self, id: &str) -> Result<Option<JobPosting>> {
        Ok(self
            .workbook
            .read()
            .await
            .postings()
            .into_iter()
            .find(|p| p.id == id))
    }

    async fn insert_posting(&self, posting: &JobPosting) -> Result<()> {
        let row = encode_posting(posting)?;
        let mut workbook = self.workbook.write().await;
        workbook.jobs_mut().rows.push(row);
        self.persist(&workbook).await
    }

    async fn delete_posting(&self, id: &str) -> Result<bool> {
        let mut workbook = self.workbook.write().await;
        let Some(jobs) = workbook.sheet_mut(JOBS_SHEET) else {
            return Ok(false);
        };
        let before = jobs.rows.len();
        let mut index = 0;
        jobs.rows.retain(|row| {
            let keep = index == 0 || row.first().map(String::as_str) != Some(id);
            index += 1;
            keep
        });
        let removed = jobs.rows.len() < before;
        if removed {
            self.persist(&workbook).await?;
        }
        Ok(removed)
    }

    fn named_tables(&self) -> bool {
        true
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .workbook
            .read()
            .await
            .sheets
            .iter()
            .map(|s| s.name.clone())
            .collect();
        if !names.iter().any(|n| n == JOBS_SHEET) {
            names.push(JOBS_SHEET.to_string());
        }
        Ok(names)
    }

    async fn create_response_table(&self, posting: &JobPosting, headers: &[String]) -> Result<()> {
        let name = tab_name(posting)?;
        let mut workbook = self.workbook.write().await;
        if workbook.sheet(name).is_some() {
            return Err(Error::Invalid(format!("Sheet '{}' already exists", name)));
        }
        workbook.sheets.push(Sheet::new(name, headers.to_vec()));
        self.persist(&workbook).await
    }

    async fn read_headers(&self, posting: &JobPosting) -> Result<Option<Vec<String>>> {
        let Some(name) = posting.sheet_name.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .workbook
            .read()
            .await
            .sheet(name)
            .map(|s| s.headers().to_vec()))
    }

    async fn append_headers(&self, posting: &JobPosting, headers: &[String]) -> Result<()> {
        let name = tab_name(posting)?;
        let mut workbook = self.workbook.write().await;
        let sheet = workbook
            .sheet_mut(name)
            .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))?;
        match sheet.rows.first_mut() {
            Some(header_row) => header_row.extend_from_slice(headers),
            None => sheet.rows.push(headers.to_vec()),
        }
        self.persist(&workbook).await
    }

    async fn append_row(&self, posting: &JobPosting, row: Vec<String>) -> Result<()> {
        let name = tab_name(posting)?;
        let mut workbook = self.workbook.write().await;
        workbook
            .sheet_mut(name)
            .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))?
            .rows
            .push(row);
        self.persist(&workbook).await
    }

    async fn read_rows(&self, posting: &JobPosting) -> Result<Vec<Vec<String>>> {
        let name = tab_name(posting)?;
        let workbook = self.workbook.read().await;
        let sheet = workbook
            .sheet(name)
            .ok_or_else(|| Error::SheetNotFound(posting.title.clone()))?;
        Ok(sheet.rows.iter().skip(1).cloned().collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::schema::{FieldSpec, FieldType, NewPosting};

    fn posting(title: &str, tab: &str) -> JobPosting {
        let mut p = NewPosting::new(
            title,
            "Design",
            "",
            vec![FieldSpec::new(FieldType::Text, "Portfolio URL", false)],
        )
        .into_posting()
        .unwrap();
        p.sheet_name = Some(tab.to_string());
        p
    }

    #[traced_test]
    #[tokio::test]
    async fn postings_survive_the_jobs_tab() -> Result<()> {
        let store = SheetStore::in_memory();
        let p = posting("Designer", "Designer");
        store.insert_posting(&p).await?;
        let listed = store.list_postings().await?;
        assert_eq!(listed, vec![p.clone()]);
        assert_eq!(store.get_posting(&p.id).await?, Some(p));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn delete_keeps_the_response_tab() -> Result<()> {
        let store = SheetStore::in_memory();
        let p = posting("Designer", "Designer");
        store.insert_posting(&p).await?;
        store
            .create_response_table(&p, &["Applicant Identity".to_string()])
            .await?;
        assert!(store.delete_posting(&p.id).await?);
        assert!(!store.delete_posting(&p.id).await?);
        assert!(store.list_postings().await?.is_empty());
        assert!(store.table_names().await?.contains(&"Designer".to_string()));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn unreadable_metadata_rows_are_skipped() -> Result<()> {
        let store = SheetStore::in_memory();
        store.insert_posting(&posting("Designer", "Designer")).await?;
        store
            .workbook
            .write()
            .await
            .jobs_mut()
            .rows
            .push(vec!["broken".into()]);
        assert_eq!(store.list_postings().await?.len(), 1);
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn snapshot_is_reloaded_from_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("workbook.json");
        let p = posting("Designer", "Designer");
        {
            let store = SheetStore::open(&path).await?;
            store.insert_posting(&p).await?;
            store
                .create_response_table(&p, &["Applicant Identity".to_string()])
                .await?;
            store
                .append_row(&p, vec!["ann@example.com".to_string()])
                .await?;
        }
        let reopened = SheetStore::open(&path).await?;
        assert_eq!(reopened.list_postings().await?, vec![p.clone()]);
        assert_eq!(
            reopened.read_rows(&p).await?,
            vec![vec!["ann@example.com".to_string()]]
        );
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_tab_reads_as_none() -> Result<()> {
        let store = SheetStore::in_memory();
        let p = posting("Designer", "Nowhere");
        assert_eq!(store.read_headers(&p).await?, None);
        assert!(matches!(
            store.append_row(&p, vec![]).await,
            Err(Error::SheetNotFound(_))
        ));
        Ok(())
    }
}
