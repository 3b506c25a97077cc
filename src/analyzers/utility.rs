/// Arithmetic mean rounded to two decimals. `None` when there is nothing to
/// average, so a real zero average stays distinguishable from no data.
pub fn average(sum: f64, count: u64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(round2(sum / count as f64))
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
