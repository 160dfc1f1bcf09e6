//! Numeric helpers shared across all detector modules
//!
//! Every helper works on the raw price list. Relative comparisons divide by the
//! baseline (earlier or reference) value and return `None` when that baseline is
//! within `f64::EPSILON` of zero.

/// A local extremum found by a windowed scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub index: usize,
}

/// Highest value of a non-empty slice. `None` when empty.
#[inline]
pub fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Lowest value of a non-empty slice. `None` when empty.
#[inline]
pub fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Arithmetic mean. `None` when empty.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `max - min` of a non-empty slice
#[inline]
pub fn price_range(values: &[f64]) -> Option<f64> {
    Some(max_of(values)? - min_of(values)?)
}

/// True when `value` is farther than `f64::EPSILON` from zero, so it can be used
/// as a denominator
#[inline]
pub fn is_nonzero(value: f64) -> bool {
    value.abs() > f64::EPSILON
}

/// `|value - baseline| / baseline`, `None` for a zero baseline
#[inline]
pub fn relative_diff(baseline: f64, value: f64) -> Option<f64> {
    is_nonzero(baseline).then(|| (baseline - value).abs() / baseline)
}

/// `(value - baseline) / baseline`, `None` for a zero baseline
#[inline]
pub fn relative_change(baseline: f64, value: f64) -> Option<f64> {
    is_nonzero(baseline).then(|| (value - baseline) / baseline)
}

/// Split at `len / 2`; the second half gets the odd point.
#[inline]
pub fn halves(prices: &[f64]) -> (&[f64], &[f64]) {
    prices.split_at(prices.len() / 2)
}

/// First quarter `[0, n/4)` and last quarter `[3n/4, n)`
#[inline]
pub fn outer_quarters(prices: &[f64]) -> (&[f64], &[f64]) {
    let n = prices.len();
    (&prices[..n / 4], &prices[n * 3 / 4..])
}

/// Maximum over `[start, end)` (clamped to the slice) whose index is strictly
/// inside the window: not `start` and not `end - 1`.
///
/// Ties keep the earliest index, so a flat window never qualifies.
pub fn find_local_max(prices: &[f64], start: usize, end: usize) -> Option<Extremum> {
    let mut best = Extremum {
        value: *prices.get(start)?,
        index: start,
    };
    for (index, &value) in prices.iter().enumerate().take(end).skip(start) {
        if value > best.value {
            best = Extremum { value, index };
        }
    }
    (best.index > start && best.index + 1 < end).then_some(best)
}

/// Indices whose price is within `tolerance` (relative to `reference`) of `reference`
pub fn indices_near(prices: &[f64], reference: f64, tolerance: f64) -> Vec<usize> {
    if !is_nonzero(reference) {
        return Vec::new();
    }
    prices
        .iter()
        .enumerate()
        .filter(|&(_, &p)| (p - reference).abs() / reference < tolerance)
        .map(|(i, _)| i)
        .collect()
}

/// Pad `[first, last]` by `pad` on both sides, clamped into `[0, len - 1]`
#[inline]
pub fn padded_span(first: usize, last: usize, pad: usize, len: usize) -> (usize, usize) {
    let end = (last + pad).min(len.saturating_sub(1));
    (first.saturating_sub(pad), end)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_max_must_be_interior() {
        let prices = [1.0, 3.0, 2.0, 2.5, 1.0];
        assert_eq!(
            find_local_max(&prices, 0, 5),
            Some(Extremum { value: 3.0, index: 1 })
        );
        // Maximum sits on the window's first point
        assert_eq!(find_local_max(&[5.0, 1.0, 2.0], 0, 3), None);
        // Maximum sits on the window's last point
        assert_eq!(find_local_max(&[1.0, 2.0, 5.0], 0, 3), None);
        // Flat window keeps the first index
        assert_eq!(find_local_max(&[2.0; 5], 0, 5), None);
    }

    #[test]
    fn test_local_max_window_clamped_to_slice() {
        let prices = [1.0, 2.0, 4.0, 3.0];
        // end - 1 = 5 is beyond the slice, so index 2 counts as interior
        assert_eq!(
            find_local_max(&prices, 1, 6),
            Some(Extremum { value: 4.0, index: 2 })
        );
        assert_eq!(find_local_max(&prices, 4, 9), None);
    }

    #[test]
    fn test_relative_helpers_guard_zero_baseline() {
        assert_eq!(relative_diff(0.0, 1.0), None);
        assert_eq!(relative_change(0.0, 1.0), None);
        assert!((relative_diff(100.0, 95.0).unwrap() - 0.05).abs() < 1e-12);
        assert!((relative_change(100.0, 95.0).unwrap() + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_nonzero_threshold_is_epsilon() {
        assert!(!is_nonzero(0.0));
        assert!(!is_nonzero(-0.0));
        assert!(!is_nonzero(f64::EPSILON / 2.0));
        assert!(is_nonzero(1e-9));
        assert!(is_nonzero(-1e-9));
        assert_eq!(relative_diff(1e-17, 1.0), None);
    }

    #[test]
    fn test_relative_diff_divides_by_baseline() {
        let a = relative_diff(100.0, 105.0).unwrap();
        let b = relative_diff(105.0, 100.0).unwrap();
        assert!(a > b);
    }

    #[test]
    fn test_splits() {
        let prices: Vec<f64> = (0..11).map(f64::from).collect();
        let (first, second) = halves(&prices);
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 6);

        let (head, tail) = outer_quarters(&prices);
        assert_eq!(head, &[0.0, 1.0]);
        assert_eq!(tail, &[8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_padded_span_clamps() {
        assert_eq!(padded_span(2, 17, 5, 25), (0, 22));
        assert_eq!(padded_span(7, 17, 5, 20), (2, 19));
    }

    #[test]
    fn test_indices_near() {
        let prices = [100.0, 99.0, 90.0, 98.5, 100.0];
        assert_eq!(indices_near(&prices, 100.0, 0.02), vec![0, 1, 3, 4]);
        assert!(indices_near(&[0.0, 0.0], 0.0, 0.02).is_empty());
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(max_of(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(price_range(&[4.0, 1.0, 3.0]), Some(3.0));
    }
}
