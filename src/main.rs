//! CLI entry point for the Data USA report tool.
//!
//! Fetches the population, citizenship, age, tuition and financial aid
//! datasets, joins them into one block per year, writes the report locally
//! and uploads it to S3.

use anyhow::Result;
use clap::{Parser, Subcommand};
use datausa_report::{
    config::RunConfig,
    fetch::BasicClient,
    pipeline::{UploadStatus, run},
    sources::Dataset,
    upload::{ReportStore, S3Store},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "datausa_report")]
#[command(about = "Builds a per-year report from Data USA datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all datasets, write the report and upload it
    Run(RunConfig),
    /// Show where each dataset will be read from
    ListSources(RunConfig),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(config) => {
            let client = BasicClient::new(config.fetch_timeout())?;

            let store = match &config.s3_bucket {
                Some(bucket) if !bucket.is_empty() => {
                    info!(bucket = %bucket, gzip = config.gzip, "S3 upload enabled");
                    Some(S3Store::from_env(bucket.clone(), config.s3_prefix.clone(), config.gzip).await)
                }
                _ => None,
            };

            let outcome = run(
                &config,
                &client,
                store.as_ref().map(|s| s as &dyn ReportStore),
            )
            .await?;

            for s in outcome.report.skipped.iter().filter(|s| s.skipped > 0) {
                info!(dataset = s.dataset, skipped = s.skipped, "Malformed records");
            }

            if let UploadStatus::Failed(e) = outcome.upload {
                error!(path = %config.output.display(), "Report kept locally after upload failure");
                return Err(e.into());
            }
        }
        Commands::ListSources(config) => {
            let sources = config.sources();
            for dataset in Dataset::ALL {
                info!(dataset = %dataset, source = sources.get(dataset), "Source");
            }
        }
    }

    Ok(())
}

/// Colored stderr logging plus a JSON daily-rolling log file.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/datausa_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("datausa_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}
