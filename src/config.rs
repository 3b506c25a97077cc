//! Run configuration, read from CLI flags with environment fallbacks.

use crate::sources::{Sources, urls};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
pub struct RunConfig {
    /// URL or file path for the population dataset
    #[arg(long, env = "DATAUSA_POPULATION_SOURCE", default_value = urls::POPULATION)]
    pub population_source: String,

    /// URL or file path for the citizenship dataset
    #[arg(long, env = "DATAUSA_NON_CITIZEN_SOURCE", default_value = urls::NON_CITIZEN)]
    pub non_citizen_source: String,

    /// URL or file path for the age distribution dataset
    #[arg(long, env = "DATAUSA_AGE_SOURCE", default_value = urls::AGE)]
    pub age_source: String,

    /// URL or file path for the tuition dataset
    #[arg(long, env = "DATAUSA_TUITION_SOURCE", default_value = urls::TUITION)]
    pub tuition_source: String,

    /// URL or file path for the financial aid dataset
    #[arg(long, env = "DATAUSA_AID_SOURCE", default_value = urls::AID)]
    pub aid_source: String,

    /// Local report file
    #[arg(short, long, env = "REPORT_OUTPUT", default_value = "data.tsv")]
    pub output: PathBuf,

    /// File name the report is uploaded under
    #[arg(long, env = "REPORT_REMOTE_NAME", default_value = "data.tsv")]
    pub remote_name: String,

    /// Optional: S3 bucket to upload the report to (upload skipped if unset)
    #[arg(long, env = "REPORT_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, env = "REPORT_S3_PREFIX", default_value = "reports")]
    pub s3_prefix: String,

    /// Gzip compress the report before uploading
    #[arg(long, env = "REPORT_GZIP", default_value_t = false)]
    pub gzip: bool,

    /// Per-dataset fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Upload timeout in seconds
    #[arg(long, env = "UPLOAD_TIMEOUT_SECS", default_value_t = 60)]
    pub upload_timeout_secs: u64,
}

impl RunConfig {
    /// Config pointing at `sources`, writing to `output`, with no upload.
    pub fn local(sources: Sources, output: PathBuf) -> Self {
        Self {
            population_source: sources.population,
            non_citizen_source: sources.non_citizen,
            age_source: sources.age,
            tuition_source: sources.tuition,
            aid_source: sources.aid,
            output,
            remote_name: "data.tsv".to_string(),
            s3_bucket: None,
            s3_prefix: "reports".to_string(),
            gzip: false,
            fetch_timeout_secs: 30,
            upload_timeout_secs: 60,
        }
    }

    pub fn sources(&self) -> Sources {
        Sources {
            population: self.population_source.clone(),
            non_citizen: self.non_citizen_source.clone(),
            age: self.age_source.clone(),
            tuition: self.tuition_source.clone(),
            aid: self.aid_source.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
