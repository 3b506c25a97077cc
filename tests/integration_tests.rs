use anyhow::Result;
use async_trait::async_trait;
use datausa_report::config::RunConfig;
use datausa_report::fetch::HttpClient;
use datausa_report::output::parse_report;
use datausa_report::pipeline::{UploadStatus, run};
use datausa_report::records::Year;
use datausa_report::sources::Sources;
use datausa_report::upload::ReportStore;
use reqwest::{Request, Response};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

const EXPECTED: &str = "\
Year: 2021\nPopulation: 329725481\nAge: 30\nUniversityCost: 22788.00\nUniversityAid: N/A\n\n\n\
Year: 2020\nPopulation: 326569308\nAge: 40\nUniversityCost: N/A\nUniversityAid: 12500.00\n\n\n\
Year: 2019\nPopulation: 324697795\nAge: N/A\nUniversityCost: 9000.00\nUniversityAid: 11500.00\n\n\n";

struct OfflineClient;

#[async_trait]
impl HttpClient for OfflineClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        panic!("fixtures should not hit the network: {}", req.url());
    }
}

#[derive(Default)]
struct MemoryStore {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn put(&self, name: &str, body: Vec<u8>) -> Result<()> {
        self.files.lock().unwrap().push((name.to_string(), body));
        Ok(())
    }
}

struct RejectingStore;

#[async_trait]
impl ReportStore for RejectingStore {
    async fn put(&self, _name: &str, _body: Vec<u8>) -> Result<()> {
        anyhow::bail!("connection refused")
    }
}

struct StalledStore;

#[async_trait]
impl ReportStore for StalledStore {
    async fn put(&self, _name: &str, _body: Vec<u8>) -> Result<()> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(())
    }
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture_sources() -> Sources {
    Sources {
        population: fixture("population.json"),
        non_citizen: fixture("non_citizen.json"),
        age: fixture("age.json"),
        tuition: fixture("tuition.json"),
        aid: fixture("aid.json"),
    }
}

fn temp_output(name: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    let _ = fs::remove_file(&path);
    path
}

#[tokio::test]
async fn test_full_pipeline_from_fixtures() {
    let output = temp_output("datausa_report_it_full.tsv");
    let config = RunConfig::local(fixture_sources(), output.clone());
    let store = MemoryStore::default();

    let outcome = run(&config, &OfflineClient, Some(&store)).await.unwrap();

    assert!(matches!(outcome.upload, UploadStatus::Uploaded));
    assert_eq!(outcome.report.text, EXPECTED);
    assert_eq!(outcome.report.total_skipped(), 1);
    assert_eq!(outcome.report.rows[0].non_citizen_population, Some(21500000));
    assert_eq!(outcome.report.rows[1].non_citizen_population, None);

    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED);

    let files = store.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, "data.tsv");
    assert_eq!(files[0].1, EXPECTED.as_bytes());

    let blocks = parse_report(EXPECTED).unwrap();
    let years: Vec<Year> = blocks.iter().map(|b| b.year).collect();
    assert_eq!(years, vec![Year(2021), Year(2020), Year(2019)]);

    fs::remove_file(&output).unwrap();
}

#[tokio::test]
async fn test_upload_failure_keeps_local_report() {
    let output = temp_output("datausa_report_it_upload_fail.tsv");
    let config = RunConfig::local(fixture_sources(), output.clone());

    let outcome = run(&config, &OfflineClient, Some(&RejectingStore))
        .await
        .unwrap();

    match &outcome.upload {
        UploadStatus::Failed(e) => assert_eq!(e.name, "data.tsv"),
        other => panic!("expected upload failure, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED);

    fs::remove_file(&output).unwrap();
}

#[tokio::test]
async fn test_fetch_failure_writes_nothing() {
    let output = temp_output("datausa_report_it_fetch_fail.tsv");
    let mut sources = fixture_sources();
    sources.age = fixture("does_not_exist.json");
    let config = RunConfig::local(sources, output.clone());
    let store = MemoryStore::default();

    let result = run(&config, &OfflineClient, Some(&store)).await;

    assert!(result.is_err());
    assert!(!output.exists());
    assert!(store.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_store_skips_upload() {
    let output = temp_output("datausa_report_it_no_store.tsv");
    let config = RunConfig::local(fixture_sources(), output.clone());

    let outcome = run(&config, &OfflineClient, None).await.unwrap();

    assert!(matches!(outcome.upload, UploadStatus::Skipped));
    assert!(output.exists());

    fs::remove_file(&output).unwrap();
}

#[tokio::test]
async fn test_upload_timeout_keeps_local_report() {
    let output = temp_output("datausa_report_it_upload_timeout.tsv");
    let mut config = RunConfig::local(fixture_sources(), output.clone());
    config.upload_timeout_secs = 1;

    let outcome = run(&config, &OfflineClient, Some(&StalledStore))
        .await
        .unwrap();

    match &outcome.upload {
        UploadStatus::Failed(e) => {
            let msg = e.to_string();
            assert!(msg.contains("timed out after 1s"), "{msg}");
        }
        other => panic!("expected upload timeout, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED);

    fs::remove_file(&output).unwrap();
}
