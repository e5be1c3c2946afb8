pub mod documents;
pub mod sheets;

use async_trait::async_trait;

use crate::{pkg::internal::schema::JobPosting, prelude::Result};

/// Row-store backing a set of postings and their response tables.
///
/// Postings and response tables are written in separate calls; nothing spans
/// both in a transaction.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn list_postings(&self) -> Result<Vec<JobPosting>>;

    async fn get_posting(&self, id: &str) -> Result<Option<JobPosting>>;

    async fn insert_posting(&self, posting: &JobPosting) -> Result<()>;

    /// Removes posting metadata only, the response table stays.
    async fn delete_posting(&self, id: &str) -> Result<bool>;

    /// Whether response tables are addressed by a name derived from the title.
    fn named_tables(&self) -> bool {
        false
    }

    /// Names already taken by response tables, deleted postings included.
    async fn table_names(&self) -> Result<Vec<String>>;

    async fn create_response_table(&self, posting: &JobPosting, headers: &[String]) -> Result<()>;

    async fn read_headers(&self, posting: &JobPosting) -> Result<Option<Vec<String>>>;

    async fn append_headers(&self, posting: &JobPosting, headers: &[String]) -> Result<()>;

    async fn append_row(&self, posting: &JobPosting, row: Vec<String>) -> Result<()>;

    async fn read_rows(&self, posting: &JobPosting) -> Result<Vec<Vec<String>>>;

    async fn ping(&self) -> Result<()>;
}
