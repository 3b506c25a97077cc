use crate::analyzers::types::{UnifiedRow, YearSeries};
use tracing::warn;

/// The secondary series joined onto the population anchor.
pub struct SecondarySeries<'a> {
    pub non_citizen: &'a YearSeries<u64>,
    pub median_age: &'a YearSeries<u32>,
    pub tuition: &'a YearSeries<f64>,
    pub aid: &'a YearSeries<f64>,
}

/// Emits one row per anchor year, newest first, looking every other metric
/// up by year. Years that only secondary series know about are logged and
/// dropped.
pub fn join_rows(population: &YearSeries<u64>, secondary: &SecondarySeries<'_>) -> Vec<UnifiedRow> {
    warn_unanchored("non_citizen", population, secondary.non_citizen);
    warn_unanchored("age", population, secondary.median_age);
    warn_unanchored("tuition", population, secondary.tuition);
    warn_unanchored("aid", population, secondary.aid);

    population
        .iter()
        .rev()
        .map(|(&year, &pop)| UnifiedRow {
            year,
            population: pop,
            non_citizen_population: secondary.non_citizen.get(&year).copied(),
            median_age: secondary.median_age.get(&year).copied(),
            average_tuition: secondary.tuition.get(&year).copied(),
            average_aid: secondary.aid.get(&year).copied(),
        })
        .collect()
}

fn warn_unanchored<T>(series: &str, anchor: &YearSeries<u64>, other: &YearSeries<T>) {
    let missing: Vec<i32> = other
        .keys()
        .filter(|y| !anchor.contains_key(y))
        .map(|y| y.0)
        .collect();
    if !missing.is_empty() {
        warn!(series, years = ?missing, "Years absent from population series not reported");
    }
}
