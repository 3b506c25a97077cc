use anyhow::ensure;
use tracing::debug;

/// Weighted median by cumulative distribution.
///
/// Returns the first age bucket at which the running weight reaches half of
/// the total weight, scanning in ascending age order. Buckets that arrive out
/// of order are stably sorted first. Returns `Ok(None)` when the total weight
/// is zero.
///
/// # Errors
///
/// Returns an error if `ages` and `weights` differ in length.
pub fn weighted_median(ages: &[u32], weights: &[u64]) -> anyhow::Result<Option<u32>> {
    ensure!(
        ages.len() == weights.len(),
        "age/weight length mismatch: {} ages, {} weights",
        ages.len(),
        weights.len()
    );

    let total: u128 = weights.iter().map(|&w| w as u128).sum();
    if total == 0 {
        return Ok(None);
    }

    let mut pairs: Vec<(u32, u64)> = ages.iter().copied().zip(weights.iter().copied()).collect();
    if !pairs.windows(2).all(|w| w[0].0 <= w[1].0) {
        debug!(buckets = pairs.len(), "Age buckets out of order, sorting");
        pairs.sort_by_key(|&(age, _)| age);
    }

    // cumulative >= total / 2, kept in integers
    let mut cumulative: u128 = 0;
    Ok(pairs.into_iter().find_map(|(age, weight)| {
        cumulative += weight as u128;
        (cumulative * 2 >= total).then_some(age)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_skewed_distribution() {
        // cumulative 10, 20, 100; first to reach 50 is 40
        assert_eq!(weighted_median(&[20, 30, 40], &[10, 10, 80]).unwrap(), Some(40));
    }

    #[test]
    fn test_zero_total_is_none() {
        assert_eq!(weighted_median(&[1, 2, 3], &[0, 0, 0]).unwrap(), None);
        assert_eq!(weighted_median(&[], &[]).unwrap(), None);
    }

    #[test]
    fn test_exact_half_takes_lower_bucket() {
        assert_eq!(weighted_median(&[10, 20], &[5, 5]).unwrap(), Some(10));
    }

    #[test]
    fn test_single_bucket() {
        assert_eq!(weighted_median(&[33], &[7]).unwrap(), Some(33));
    }

    #[test]
    fn test_leading_zero_weights_are_passed_over() {
        assert_eq!(weighted_median(&[0, 1, 2], &[0, 0, 4]).unwrap(), Some(2));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        assert_eq!(weighted_median(&[40, 20, 30], &[80, 10, 10]).unwrap(), Some(40));
        assert_eq!(weighted_median(&[50, 10], &[1, 3]).unwrap(), Some(10));
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(weighted_median(&[1, 2], &[1]).is_err());
    }

    #[test]
    fn test_cumulative_property_holds() {
        let cases: Vec<(Vec<u32>, Vec<u64>)> = vec![
            (
                (0..20).collect(),
                vec![3, 0, 7, 1, 1, 9, 2, 0, 0, 5, 8, 1, 1, 1, 6, 0, 2, 4, 3, 1],
            ),
            (vec![5, 15, 25, 35], vec![4, 4, 4, 4]),
            (vec![1, 2, 3], vec![0, 0, 1]),
            (vec![1, 2, 3, 4], vec![1, 0, 0, 1]),
            (vec![60, 10, 40, 25, 90], vec![12, 3, 0, 7, 12]),
            (vec![70, 30, 50], vec![1, 1, 1]),
            (vec![18], vec![u64::MAX]),
            (vec![9, 3, 6, 0], vec![u64::MAX, 2, u64::MAX, 0]),
        ];

        for (ages, weights) in cases {
            let total: u128 = weights.iter().map(|&w| w as u128).sum();
            let m = weighted_median(&ages, &weights).unwrap().unwrap();

            let through: u128 = ages
                .iter()
                .zip(&weights)
                .filter(|&(&a, _)| a <= m)
                .map(|(_, &w)| w as u128)
                .sum();
            let before: u128 = ages
                .iter()
                .zip(&weights)
                .filter(|&(&a, _)| a < m)
                .map(|(_, &w)| w as u128)
                .sum();

            assert!(through * 2 >= total, "ages {ages:?} weights {weights:?}");
            assert!(before * 2 < total, "ages {ages:?} weights {weights:?}");
        }
    }
}
