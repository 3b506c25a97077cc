//! Loading raw dataset records from the Data USA API or local files.

mod basic;

pub use basic::BasicClient;

use crate::records::RawRecord;
use crate::sources::{Dataset, Sources};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Request, Response};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// A dataset could not be loaded. Aborts the run.
#[derive(Debug, Error)]
#[error("failed to load {dataset} from {source_ref}: {reason:#}")]
pub struct FetchError {
    pub dataset: Dataset,
    pub source_ref: String,
    pub reason: anyhow::Error,
}

/// The `{"data": [...]}` envelope. Other top-level keys are ignored.
#[derive(Deserialize)]
struct ApiResponse {
    data: Vec<RawRecord>,
}

/// Raw records for every dataset of one run.
#[derive(Debug, Default, Clone)]
pub struct Datasets {
    pub population: Vec<RawRecord>,
    pub non_citizen: Vec<RawRecord>,
    pub age: Vec<RawRecord>,
    pub tuition: Vec<RawRecord>,
    pub aid: Vec<RawRecord>,
}

pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("HTTP status {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Decodes the records out of a response body.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let body: ApiResponse = serde_json::from_slice(bytes).context("malformed dataset body")?;
    Ok(body.data)
}

/// Loads one dataset from a URL, or from disk when `source` is not `http(s)`.
pub async fn load_records<C: HttpClient + ?Sized>(client: &C, source: &str) -> Result<Vec<RawRecord>> {
    let bytes = if source.starts_with("http") {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading {source}"))?
    };
    debug!(bytes = bytes.len(), "Dataset body received");
    parse_records(&bytes)
}

#[tracing::instrument(skip(client, dataset, source, timeout), fields(dataset = %dataset))]
async fn load_dataset<C: HttpClient + ?Sized>(
    client: &C,
    dataset: Dataset,
    source: &str,
    timeout: Duration,
) -> Result<Vec<RawRecord>, FetchError> {
    let result = match tokio::time::timeout(timeout, load_records(client, source)).await {
        Ok(inner) => inner,
        Err(_) => Err(anyhow::anyhow!("timed out after {timeout:?}")),
    };

    match result {
        Ok(records) => {
            info!(records = records.len(), "Dataset loaded");
            Ok(records)
        }
        Err(reason) => Err(FetchError {
            dataset,
            source_ref: source.to_string(),
            reason,
        }),
    }
}

/// Loads all five datasets concurrently. The first failure aborts the rest.
pub async fn fetch_all<C: HttpClient + ?Sized>(
    client: &C,
    sources: &Sources,
    timeout: Duration,
) -> Result<Datasets, FetchError> {
    let (population, non_citizen, age, tuition, aid) = tokio::try_join!(
        load_dataset(client, Dataset::Population, &sources.population, timeout),
        load_dataset(client, Dataset::NonCitizen, &sources.non_citizen, timeout),
        load_dataset(client, Dataset::Age, &sources.age, timeout),
        load_dataset(client, Dataset::Tuition, &sources.tuition, timeout),
        load_dataset(client, Dataset::Aid, &sources.aid, timeout),
    )?;

    Ok(Datasets {
        population,
        non_citizen,
        age,
        tuition,
        aid,
    })
}
