use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    primitives::ByteStream,
    Client,
};

use crate::prelude::{Error, Result};

/// Stores uploaded files and hands back a URL the admin can open.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_url: String,
}

pub struct S3Options<'a> {
    pub endpoint: &'a str,
    pub region: &'a str,
    pub bucket: &'a str,
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub public_url: &'a str,
}

impl S3BlobStore {
    pub fn new(opts: S3Options<'_>) -> Self {
        let credentials = Credentials::new(opts.access_key, opts.secret_key, None, None, "static");
        let conf = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(opts.region.to_string()))
            .endpoint_url(opts.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        S3BlobStore {
            client: Client::from_conf(conf),
            bucket: opts.bucket.to_string(),
            public_url: opts.public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.public_url, &self.bucket, key)
    }

    /// Creates the bucket unless it is already there.
    pub async fn ensure_bucket(&self) -> Result<()> {
        let create = self.client.create_bucket().bucket(&self.bucket).send().await;
        match create {
            Ok(_) => {
                tracing::info!("created bucket {}", &self.bucket);
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .map(|se| se.is_bucket_already_exists() || se.is_bucket_already_owned_by_you())
                    == Some(true) =>
            {
                Ok(())
            }
            Err(err) => Err(Error::Upload(format!("bucket {}: {}", &self.bucket, err))),
        }
    }
}

pub fn object_url(public_url: &str, bucket: &str, key: &str) -> String {
    let path: Vec<String> = key.split('/').map(encode_segment).collect();
    format!("{}/{}/{}", public_url.trim_end_matches('/'), bucket, path.join("/"))
}

fn encode_segment(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Error::Upload(format!("{}: {}", key, e)))?;
        tracing::debug!("uploaded {} ({} bytes)", key, size);
        Ok(self.object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_path_style_and_escaped() {
        assert_eq!(
            object_url("http://minio:9000/", "resumes", "applications/j1/17_my cv.pdf"),
            "http://minio:9000/resumes/applications/j1/17_my%20cv.pdf"
        );
    }
}
