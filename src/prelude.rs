use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Invalid(String),

    #[error("Job not found")]
    JobNotFound,

    #[error("Sheet not found for job {0}")]
    SheetNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unknown action")]
    UnknownAction,

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Improperly configured: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Invalid(_) => "ERR-JOB-001",
            Error::JobNotFound => "ERR-JOB-404",
            Error::SheetNotFound(_) => "ERR-SHEET-404",
            Error::Unauthorized => "ERR-AUTH-001",
            Error::UnknownAction => "ERR-ACTION-001",
            Error::MalformedPayload(_) => "ERR-PAYLOAD-001",
            Error::Database(_) | Error::Migration(_) => "ERR-DB-000",
            Error::Upload(_) => "ERR-BLOB-001",
            Error::Io(_) => "ERR-IO-000",
            Error::Config(_) => "ERR-CONF-000",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Invalid(_) | Error::MalformedPayload(_) | Error::UnknownAction => {
                StatusCode::BAD_REQUEST
            }
            Error::JobNotFound | Error::SheetNotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {}", self.code(), &self);
        }
        (
            status,
            Json(json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
