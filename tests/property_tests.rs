//! Property-based tests for detection and price-action analysis.

use proptest::prelude::*;

use chart_patterns::prelude::*;

// ==================== Test Data Generators ====================

/// Random positive price series
fn arb_price_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..=max_len)
}

/// Strictly monotonic series compounding by `1 ± step` per point
fn arb_monotonic(rising: bool) -> impl Strategy<Value = Vec<f64>> {
    (6usize..=40, 0.01..0.1_f64, 1.0..1000.0_f64).prop_map(move |(len, step, start)| {
        let factor = if rising { 1.0 + step } else { 1.0 - step };
        (0..len).map(|i| start * factor.powi(i as i32)).collect()
    })
}

// ==================== Detection Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fewer than ten points never yields a pattern
    #[test]
    fn prop_short_series_is_empty(data in arb_price_series(0, 9)) {
        prop_assert!(detect_patterns(&data).is_empty());
    }

    /// Spans stay in bounds and every field is the kind's constant
    #[test]
    fn prop_patterns_are_well_formed(data in arb_price_series(10, 80)) {
        let patterns = detect_patterns(&data);
        for p in &patterns {
            prop_assert!(p.start_index <= p.end_index);
            prop_assert!(p.end_index < data.len());
            prop_assert_eq!(p.confidence, p.kind.confidence());
            prop_assert_eq!(p.signal, p.kind.signal());
            prop_assert_eq!(p.description, p.kind.description());
        }
    }

    /// At most one result per kind, ordered as the detectors run
    #[test]
    fn prop_results_follow_kind_order(data in arb_price_series(10, 80)) {
        let positions: Vec<usize> = detect_patterns(&data)
            .iter()
            .map(|p| PatternKind::ALL.iter().position(|k| *k == p.kind).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    /// Volume does not affect any heuristic
    #[test]
    fn prop_volume_is_ignored(
        data in arb_price_series(10, 60),
        seed in 0u64..1_000_000,
    ) {
        let quiet: Vec<PricePoint> = data
            .iter()
            .map(|&p| PricePoint::new("", p, 0))
            .collect();
        let noisy: Vec<PricePoint> = data
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new("", p, seed.wrapping_mul(i as u64 + 1) % 50_000))
            .collect();
        prop_assert_eq!(detect_patterns(&quiet), detect_patterns(&noisy));
    }

    /// Same input, same output
    #[test]
    fn prop_detection_is_deterministic(data in arb_price_series(10, 60)) {
        prop_assert_eq!(detect_patterns(&data), detect_patterns(&data));
        prop_assert_eq!(analyze_price_action(&data), analyze_price_action(&data));
    }

    /// A constant series has no shape at all
    #[test]
    fn prop_flat_series(constant in 1.0..1000.0_f64, len in 5usize..40) {
        let data = vec![constant; len];
        prop_assert!(detect_patterns(&data).is_empty());

        let action = analyze_price_action(&data);
        prop_assert!(action.support_levels.is_empty());
        prop_assert!(action.resistance_levels.is_empty());
        prop_assert_eq!(action.trend, Trend::Sideways);
        prop_assert_eq!(action.volatility, Volatility::Low);
    }
}

// ==================== Price Action Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Fewer than five points yields the default summary
    #[test]
    fn prop_short_series_default_action(data in arb_price_series(0, 4)) {
        prop_assert_eq!(analyze_price_action(&data), PriceAction::default());
    }

    /// Level lists are capped and ordered
    #[test]
    fn prop_levels_capped_and_sorted(data in arb_price_series(5, 100)) {
        let action = analyze_price_action(&data);
        prop_assert!(action.support_levels.len() <= 3);
        prop_assert!(action.resistance_levels.len() <= 3);
        prop_assert!(action.support_levels.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(action.resistance_levels.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Every level is a price that occurs in the series
    #[test]
    fn prop_levels_come_from_series(data in arb_price_series(5, 100)) {
        let action = analyze_price_action(&data);
        for level in action.support_levels.iter().chain(&action.resistance_levels) {
            prop_assert!(data.contains(level));
        }
    }

    /// No price is reported as both support and resistance
    #[test]
    fn prop_levels_disjoint(data in arb_price_series(5, 100)) {
        let action = analyze_price_action(&data);
        prop_assert!(!action
            .support_levels
            .iter()
            .any(|s| action.resistance_levels.contains(s)));
    }

    #[test]
    fn prop_rising_series_is_uptrend(data in arb_monotonic(true)) {
        prop_assert_eq!(analyze_price_action(&data).trend, Trend::Uptrend);
    }

    #[test]
    fn prop_falling_series_is_downtrend(data in arb_monotonic(false)) {
        prop_assert_eq!(analyze_price_action(&data).trend, Trend::Downtrend);
    }

    /// Monotonic series have no interior extrema
    #[test]
    fn prop_monotonic_series_has_no_levels(data in arb_monotonic(true)) {
        let action = analyze_price_action(&data);
        prop_assert!(action.support_levels.is_empty());
        prop_assert!(action.resistance_levels.is_empty());
    }
}
