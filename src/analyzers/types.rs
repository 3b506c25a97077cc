//! Data types used by the aggregation pipeline.

use crate::records::Year;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One derived metric per year.
pub type YearSeries<T> = BTreeMap<Year, T>;

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

/// Joined output row. Every metric except the anchor population is `None`
/// when its series has no value for the year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRow {
    pub year: Year,
    pub population: u64,
    pub non_citizen_population: Option<u64>,
    pub median_age: Option<u32>,
    pub average_tuition: Option<f64>,
    pub average_aid: Option<f64>,
}

/// Malformed-record counts for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecords {
    pub dataset: &'static str,
    pub skipped: usize,
}
