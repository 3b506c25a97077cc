//! Report rendering and local persistence.
//!
//! Each row becomes a five-line labeled block followed by two blank lines:
//!
//! ```text
//! Year: 2020
//! Population: 326569308
//! Age: 38
//! UniversityCost: 9349.20
//! UniversityAid: N/A
//! ```

use crate::analyzers::types::UnifiedRow;
use crate::records::Year;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::{debug, info};

/// Rendered in place of a metric the year has no data for.
pub const NO_DATA: &str = "N/A";

fn or_no_data<T>(value: Option<T>, fmt: impl FnOnce(T) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| NO_DATA.to_string())
}

/// Renders one row as its labeled block, including the two trailing blank lines.
pub fn render_block(row: &UnifiedRow) -> String {
    format!(
        "Year: {}\nPopulation: {}\nAge: {}\nUniversityCost: {}\nUniversityAid: {}\n\n\n",
        row.year,
        row.population,
        or_no_data(row.median_age, |a| a.to_string()),
        or_no_data(row.average_tuition, |t| format!("{t:.2}")),
        or_no_data(row.average_aid, |a| format!("{a:.2}")),
    )
}

pub fn render_report(rows: &[UnifiedRow]) -> String {
    rows.iter().map(render_block).collect()
}

/// A block read back from a rendered report. The report does not carry the
/// non-citizen population, so neither does this.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBlock {
    pub year: Year,
    pub population: u64,
    pub median_age: Option<u32>,
    pub average_tuition: Option<f64>,
    pub average_aid: Option<f64>,
}

impl From<&UnifiedRow> for ReportBlock {
    fn from(row: &UnifiedRow) -> Self {
        Self {
            year: row.year,
            population: row.population,
            median_age: row.median_age,
            average_tuition: row.average_tuition,
            average_aid: row.average_aid,
        }
    }
}

fn labeled<'a>(line: Option<&'a str>, label: &str) -> Result<&'a str> {
    let line = line.ok_or_else(|| anyhow!("expected `{label}:` line, found end of report"))?;
    line.strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(": "))
        .ok_or_else(|| anyhow!("expected `{label}:` line, found {line:?}"))
}

fn optional<T: std::str::FromStr>(value: &str, label: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if value == NO_DATA {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .with_context(|| format!("invalid {label} value {value:?}"))
}

/// Parses a report produced by [`render_report`].
pub fn parse_report(text: &str) -> Result<Vec<ReportBlock>> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();

    loop {
        while lines.peek().is_some_and(|l| l.is_empty()) {
            lines.next();
        }
        if lines.peek().is_none() {
            break;
        }

        let year = labeled(lines.next(), "Year")?;
        let year = Year(year.parse::<i32>().with_context(|| format!("invalid Year {year:?}"))?);
        let population = labeled(lines.next(), "Population")?;
        let population = population
            .parse::<u64>()
            .with_context(|| format!("invalid Population {population:?}"))?;
        let median_age = optional(labeled(lines.next(), "Age")?, "Age")?;
        let average_tuition = optional(labeled(lines.next(), "UniversityCost")?, "UniversityCost")?;
        let average_aid = optional(labeled(lines.next(), "UniversityAid")?, "UniversityAid")?;

        blocks.push(ReportBlock {
            year,
            population,
            median_age,
            average_tuition,
            average_aid,
        });
    }

    Ok(blocks)
}

/// Writes the report to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, body: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = body.len(), "Report written");
    Ok(())
}

/// Logs the joined rows, non-citizen population included, as JSON.
pub fn print_json(rows: &[UnifiedRow]) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}
