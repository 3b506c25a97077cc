use crate::analyzers::median::weighted_median;
use crate::analyzers::types::YearSeries;
use crate::analyzers::utility::average;
use crate::records::{RawRecord, RecordError, Year};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Number of individual malformed records logged per series before only the
/// total is reported.
const SKIP_LOG_LIMIT: usize = 5;

/// Per-year running state fed one extracted value at a time.
pub trait Accumulator: Default {
    type Input;

    fn push(&mut self, input: Self::Input);
}

/// Running sum and count, reduced with [`average`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SumCount {
    pub sum: f64,
    pub count: u64,
}

impl Accumulator for SumCount {
    type Input = f64;

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }
}

impl SumCount {
    pub fn average(&self) -> Option<f64> {
        average(self.sum, self.count)
    }
}

/// Running sum alone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Total(pub u64);

impl Accumulator for Total {
    type Input = u64;

    fn push(&mut self, value: u64) {
        self.0 = self.0.saturating_add(value);
    }
}

/// Age buckets and their population weights, kept index-aligned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AgeDistribution {
    ages: Vec<u32>,
    weights: Vec<u64>,
}

impl Accumulator for AgeDistribution {
    type Input = (u32, u64);

    fn push(&mut self, (age, weight): (u32, u64)) {
        self.ages.push(age);
        self.weights.push(weight);
    }
}

impl AgeDistribution {
    pub fn ages(&self) -> &[u32] {
        &self.ages
    }

    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Weighted median age, or `None` when the year has no population.
    pub fn median(&self) -> anyhow::Result<Option<u32>> {
        weighted_median(&self.ages, &self.weights)
    }
}

/// Records grouped by year, plus how many were rejected as malformed.
#[derive(Debug)]
pub struct Grouped<A> {
    pub groups: BTreeMap<Year, A>,
    pub skipped: usize,
}

/// Groups `records` by the year in `year_field`, folding each record's
/// extracted value into its year's accumulator.
///
/// `extract` returns `Ok(None)` for records the dataset filters out on
/// purpose; those are not counted as skipped.
pub fn group_by_year<A, F>(series: &str, records: &[RawRecord], year_field: &str, extract: F) -> Grouped<A>
where
    A: Accumulator,
    F: Fn(&RawRecord) -> Result<Option<A::Input>, RecordError>,
{
    let mut groups: BTreeMap<Year, A> = BTreeMap::new();
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        let parsed = crate::records::year(record, year_field)
            .and_then(|year| extract(record).map(|input| (year, input)));

        match parsed {
            Ok((year, Some(input))) => groups.entry(year).or_default().push(input),
            Ok((_, None)) => {}
            Err(e) => {
                skipped += 1;
                if skipped <= SKIP_LOG_LIMIT {
                    debug!(series, index, error = %e, "Skipping malformed record");
                }
            }
        }
    }

    if skipped > 0 {
        warn!(series, skipped, total = records.len(), "Malformed records skipped");
    }

    Grouped { groups, skipped }
}

/// Builds a one-value-per-year series, keeping the first value seen for a
/// year. Used for the anchor series, where a repeated year is a data issue.
pub fn first_per_year<T, F>(series: &str, records: &[RawRecord], year_field: &str, extract: F) -> (YearSeries<T>, usize)
where
    F: Fn(&RawRecord) -> Result<T, RecordError>,
{
    let mut out = YearSeries::new();
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        let parsed = crate::records::year(record, year_field)
            .and_then(|year| extract(record).map(|value| (year, value)));

        match parsed {
            Ok((year, value)) => {
                if out.contains_key(&year) {
                    warn!(series, %year, index, "Duplicate year ignored");
                } else {
                    out.insert(year, value);
                }
            }
            Err(e) => {
                skipped += 1;
                if skipped <= SKIP_LOG_LIMIT {
                    debug!(series, index, error = %e, "Skipping malformed record");
                }
            }
        }
    }

    if skipped > 0 {
        warn!(series, skipped, total = records.len(), "Malformed records skipped");
    }

    (out, skipped)
}
