//! One full pass: fetch, reduce, join, render, write, upload.

use crate::analyzers::aggregate::{
    AgeDistribution, Grouped, SumCount, Total, first_per_year, group_by_year,
};
use crate::analyzers::join::{SecondarySeries, join_rows};
use crate::analyzers::types::{SkippedRecords, UnifiedRow, YearSeries};
use crate::config::RunConfig;
use crate::fetch::{Datasets, HttpClient, fetch_all};
use crate::output::{print_json, render_report, write_report};
use crate::records::{self, RawRecord};
use crate::sources::{Dataset, fields};
use crate::upload::{ReportStore, UploadError};
use anyhow::Result;
use tracing::{debug, error, info};

/// The rendered report and what went into it.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<UnifiedRow>,
    pub text: String,
    pub skipped: Vec<SkippedRecords>,
}

impl Report {
    pub fn total_skipped(&self) -> usize {
        self.skipped.iter().map(|s| s.skipped).sum()
    }
}

#[derive(Debug)]
pub enum UploadStatus {
    /// No remote store configured.
    Skipped,
    Uploaded,
    Failed(UploadError),
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub upload: UploadStatus,
}

fn population_series(rows: &[RawRecord]) -> (YearSeries<u64>, usize) {
    first_per_year(Dataset::Population.name(), rows, fields::YEAR, |r| {
        records::count(r, fields::POPULATION)
    })
}

fn non_citizen_series(rows: &[RawRecord]) -> (YearSeries<u64>, usize) {
    let grouped: Grouped<Total> =
        group_by_year(Dataset::NonCitizen.name(), rows, fields::ID_YEAR, |r| {
            if records::text(r, fields::CITIZENSHIP)? == fields::CITIZEN {
                return Ok(None);
            }
            records::count(r, fields::CITIZENSHIP_STATUS).map(Some)
        });
    let series = grouped.groups.into_iter().map(|(y, t)| (y, t.0)).collect();
    (series, grouped.skipped)
}

fn median_age_series(rows: &[RawRecord]) -> Result<(YearSeries<u32>, usize)> {
    let grouped: Grouped<AgeDistribution> =
        group_by_year(Dataset::Age.name(), rows, fields::YEAR, |r| {
            let age = records::age(r, fields::AGE)?;
            let weight = records::count(r, fields::TOTAL_POPULATION)?;
            Ok(Some((age, weight)))
        });

    let mut series = YearSeries::new();
    for (year, dist) in &grouped.groups {
        match dist.median()? {
            Some(age) => {
                series.insert(*year, age);
            }
            None => debug!(%year, "No population for year, median age unavailable"),
        }
    }
    Ok((series, grouped.skipped))
}

fn average_series(dataset: Dataset, rows: &[RawRecord], value_field: &str) -> (YearSeries<f64>, usize) {
    let grouped: Grouped<SumCount> = group_by_year(dataset.name(), rows, fields::YEAR, |r| {
        records::number(r, value_field).map(Some)
    });
    let series = grouped
        .groups
        .iter()
        .filter_map(|(year, acc)| acc.average().map(|avg| (*year, avg)))
        .collect();
    (series, grouped.skipped)
}

/// Reduces every dataset to its per-year series and joins them into the
/// report. Pure and synchronous.
pub fn build_report(datasets: &Datasets) -> Result<Report> {
    let (population, pop_skipped) = population_series(&datasets.population);
    let (non_citizen, nc_skipped) = non_citizen_series(&datasets.non_citizen);
    let (median_age, age_skipped) = median_age_series(&datasets.age)?;
    let (tuition, tuition_skipped) =
        average_series(Dataset::Tuition, &datasets.tuition, fields::STATE_TUITION);
    let (aid, aid_skipped) = average_series(Dataset::Aid, &datasets.aid, fields::MEDIAN_AID);

    let rows = join_rows(
        &population,
        &SecondarySeries {
            non_citizen: &non_citizen,
            median_age: &median_age,
            tuition: &tuition,
            aid: &aid,
        },
    );
    let text = render_report(&rows);

    let skipped = [
        (Dataset::Population, pop_skipped),
        (Dataset::NonCitizen, nc_skipped),
        (Dataset::Age, age_skipped),
        (Dataset::Tuition, tuition_skipped),
        (Dataset::Aid, aid_skipped),
    ]
    .into_iter()
    .map(|(dataset, skipped)| SkippedRecords {
        dataset: dataset.name(),
        skipped,
    })
    .collect();

    Ok(Report {
        rows,
        text,
        skipped,
    })
}

/// Runs the whole pipeline. Any fetch failure aborts before a file is
/// written. An upload failure is reported in the outcome and leaves the
/// local report in place.
#[tracing::instrument(skip(config, client, store), fields(output = %config.output.display()))]
pub async fn run<C: HttpClient + ?Sized>(
    config: &RunConfig,
    client: &C,
    store: Option<&dyn ReportStore>,
) -> Result<RunOutcome> {
    let datasets = fetch_all(client, &config.sources(), config.fetch_timeout()).await?;

    let report = build_report(&datasets)?;
    info!(
        rows = report.rows.len(),
        skipped = report.total_skipped(),
        "Report built"
    );
    print_json(&report.rows)?;

    write_report(&config.output, report.text.as_bytes())?;

    let upload = match store {
        None => {
            info!("No remote store configured, skipping upload");
            UploadStatus::Skipped
        }
        Some(store) => {
            let name = config.remote_name.as_str();
            let put = store.put(name, report.text.clone().into_bytes());
            let result = match tokio::time::timeout(config.upload_timeout(), put).await {
                Ok(inner) => inner,
                Err(_) => Err(anyhow::anyhow!(
                    "timed out after {:?}",
                    config.upload_timeout()
                )),
            };
            match result {
                Ok(()) => UploadStatus::Uploaded,
                Err(reason) => {
                    let err = UploadError {
                        name: name.to_string(),
                        reason,
                    };
                    error!(error = %err, "Upload failed, local report kept");
                    UploadStatus::Failed(err)
                }
            }
        }
    };

    Ok(RunOutcome { report, upload })
}
