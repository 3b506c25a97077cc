//! Per-year aggregation and joining.
//!
//! Raw records are grouped by year, reduced to one metric per year (weighted
//! median age, averages, totals), and joined onto the population series to
//! produce the report rows.

pub mod aggregate;
pub mod join;
pub mod median;
pub mod types;
pub mod utility;
