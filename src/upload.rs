//! Shipping the finished report to remote storage.

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use thiserror::Error;
use tracing::info;

/// The report could not be delivered. The local copy is unaffected.
#[derive(Debug, Error)]
#[error("failed to upload {name}: {reason:#}")]
pub struct UploadError {
    pub name: String,
    pub reason: anyhow::Error,
}

/// Remote destination accepting a named file.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn put(&self, name: &str, body: Vec<u8>) -> Result<()>;
}

/// Uploads reports to S3 under `<prefix>/date=<YYYY-MM-DD>/<name>`.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    gzip: bool,
}

impl S3Store {
    /// Builds a store from the ambient AWS configuration (env vars, profile,
    /// instance role).
    pub async fn from_env(bucket: String, prefix: String, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            prefix,
            gzip,
        }
    }
}

/// Object key for a report uploaded on `date`.
pub fn object_key(prefix: &str, date: NaiveDate, name: &str, gzip: bool) -> String {
    let prefix = prefix.trim_matches('/');
    let date = date.format("%Y-%m-%d");
    let ext = if gzip { ".gz" } else { "" };
    if prefix.is_empty() {
        format!("date={date}/{name}{ext}")
    } else {
        format!("{prefix}/date={date}/{name}{ext}")
    }
}

pub fn gzip_bytes(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl ReportStore for S3Store {
    #[tracing::instrument(skip(self, body), fields(bytes = body.len()))]
    async fn put(&self, name: &str, body: Vec<u8>) -> Result<()> {
        let key = object_key(&self.prefix, chrono::Utc::now().date_naive(), name, self.gzip);
        let body = if self.gzip { gzip_bytes(&body)? } else { body };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("text/plain; charset=utf-8")
            .send()
            .await?;

        info!(bucket = %self.bucket, key = %key, "Report uploaded to S3");
        Ok(())
    }
}
