use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sheets,
    Documents,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: String,
    #[serde(default = "default_backend")]
    pub backend: Backend,
    //sheets
    pub workbook_path: Option<String>,
    //documents
    pub database_url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub database_pool_max_connections: u32,
    //blobs
    pub s3_endpoint: String,
    #[serde(default = "default_region")]
    pub s3_region: String,
    pub s3_bucket_name: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_public_url: Option<String>,
    //admin
    pub admin_email: String,
    pub admin_token: String,
}

fn default_service_name() -> String {
    "careersync".into()
}

fn default_listen_port() -> String {
    "3000".into()
}

fn default_backend() -> Backend {
    Backend::Sheets
}

fn default_pool_size() -> u32 {
    5
}

fn default_region() -> String {
    "us-east-1".into()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .add_source(Environment::default())
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        if s.s3_public_url.as_deref().map_or(true, str::is_empty) {
            s.s3_public_url = Some(s.s3_endpoint.clone());
        }
        if s.backend == Backend::Sheets && s.workbook_path.is_none() {
            s.workbook_path = Some("workbook.json".into());
        }
        Ok(s)
    }

    pub fn public_url(&self) -> &str {
        self.s3_public_url.as_deref().unwrap_or(&self.s3_endpoint)
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
