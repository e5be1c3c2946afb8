use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

use crate::{
    conf::{settings, Backend},
    prelude::{Error, Result},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn apply() -> Result<()> {
    if settings.backend != Backend::Documents {
        tracing::warn!("migrations only apply to the documents backend, nothing to do");
        return Ok(());
    }
    let url = settings
        .database_url
        .as_deref()
        .ok_or_else(|| Error::Config("DATABASE_URL is not set".into()))?;
    let pool = PgPoolOptions::new().connect(url).await?;
    tracing::debug!("connected to db");

    let mut tx = pool.begin().await?;
    MIGRATOR.run(&mut *tx).await?;
    tx.commit().await?;

    println!("Migrations applied successfully");
    Ok(())
}
