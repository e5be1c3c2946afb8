use std::sync::Arc;

use crate::{
    conf::{settings, Backend},
    pkg::internal::{
        auth::AdminPolicy,
        blob::{BlobStore, S3BlobStore, S3Options},
        reconcile::Reconciler,
        store::{
            documents::{db_pool, DocumentStore},
            sheets::SheetStore,
            JobStore,
        },
    },
    prelude::{Error, Result},
};

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
    pub blobs: Arc<dyn BlobStore>,
    pub admin: Arc<AdminPolicy>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        let store: Arc<dyn JobStore> = match settings.backend {
            Backend::Sheets => {
                let path = settings.workbook_path.as_deref().unwrap_or("workbook.json");
                tracing::info!("using workbook at {}", path);
                Arc::new(SheetStore::open(path).await?)
            }
            Backend::Documents => {
                let url = settings
                    .database_url
                    .as_deref()
                    .ok_or_else(|| Error::Config("DATABASE_URL is required for the documents backend".into()))?;
                let pool = db_pool(url, settings.database_pool_max_connections)?;
                Arc::new(DocumentStore::new(Arc::new(pool)))
            }
        };
        let blobs = S3BlobStore::new(S3Options {
            endpoint: &settings.s3_endpoint,
            region: &settings.s3_region,
            bucket: &settings.s3_bucket_name,
            access_key: &settings.s3_access_key,
            secret_key: &settings.s3_secret_key,
            public_url: settings.public_url(),
        });
        if let Err(e) = blobs.ensure_bucket().await {
            tracing::warn!("could not ensure upload bucket: {}", e);
        }
        Ok(AppState::from_parts(
            store,
            Arc::new(blobs),
            AdminPolicy::new(&settings.admin_email, &settings.admin_token),
        ))
    }

    pub fn from_parts(
        store: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        admin: AdminPolicy,
    ) -> AppState {
        AppState {
            reconciler: Reconciler::new(store),
            blobs,
            admin: Arc::new(admin),
        }
    }
}
