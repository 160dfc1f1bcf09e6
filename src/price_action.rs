//! Price-action summary: support and resistance levels, trend, volatility bucket
//!
//! Independent of the pattern detectors; shares only the [`PriceBar`] input.

use crate::detectors::helpers::{is_nonzero, mean, price_range, relative_change};
use crate::{PatternError, PriceBar, Result};

/// Overall direction of a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
    #[default]
    Sideways,
}

impl Trend {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Trend::Uptrend)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Trend::Downtrend)
    }
}

/// Bucket of the mean absolute period-over-period return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

/// Summary of a series. `PriceAction::default()` is the fallback for short input.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAction {
    /// Ascending
    pub support_levels: Vec<f64>,
    /// Descending
    pub resistance_levels: Vec<f64>,
    pub trend: Trend,
    pub volatility: Volatility,
}

// ============================================================
// CONFIG
// ============================================================

/// Thresholds for [`PriceActionAnalyzer`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PriceActionConfig {
    /// Below this many points the default summary is returned
    pub min_points: usize,
    /// Two levels closer than this share of the full price range are merged
    pub level_merge_ratio: f64,
    /// Levels reported per side
    pub max_levels: usize,
    /// Relative change of the outer-third means that counts as a trend
    pub trend_threshold: f64,
    /// Mean absolute return below which volatility is low
    pub low_volatility: f64,
    /// Mean absolute return above which volatility is high
    pub high_volatility: f64,
}

impl Default for PriceActionConfig {
    fn default() -> Self {
        Self {
            min_points: 5,
            level_merge_ratio: 0.05,
            max_levels: 3,
            trend_threshold: 0.02,
            low_volatility: 0.01,
            high_volatility: 0.03,
        }
    }
}

impl PriceActionConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("level_merge_ratio", self.level_merge_ratio),
            ("trend_threshold", self.trend_threshold),
            ("low_volatility", self.low_volatility),
            ("high_volatility", self.high_volatility),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PatternError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: f64::MAX,
                });
            }
        }
        if self.low_volatility > self.high_volatility {
            return Err(PatternError::InvalidConfig(format!(
                "low_volatility {} exceeds high_volatility {}",
                self.low_volatility, self.high_volatility
            )));
        }
        if self.min_points < 3 {
            return Err(PatternError::InvalidConfig(format!(
                "min_points must be at least 3, got {}",
                self.min_points
            )));
        }
        Ok(())
    }
}

// ============================================================
// ANALYZER
// ============================================================

/// Which neighbour comparison marks a local extremum
#[derive(Debug, Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

#[derive(Debug, Clone, Default)]
pub struct PriceActionAnalyzer {
    config: PriceActionConfig,
}

impl PriceActionAnalyzer {
    pub fn new(config: PriceActionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PriceActionConfig {
        &self.config
    }

    pub fn analyze<T: PriceBar>(&self, series: &[T]) -> PriceAction {
        let prices: Vec<f64> = series.iter().map(PriceBar::price).collect();
        self.analyze_prices(&prices)
    }

    pub fn analyze_prices(&self, prices: &[f64]) -> PriceAction {
        if prices.len() < self.config.min_points {
            tracing::trace!(points = prices.len(), "series too short for price action");
            return PriceAction::default();
        }

        let action = PriceAction {
            support_levels: self.support_levels(prices),
            resistance_levels: self.resistance_levels(prices),
            trend: self.trend(prices),
            volatility: self.volatility(prices),
        };
        tracing::debug!(
            supports = action.support_levels.len(),
            resistances = action.resistance_levels.len(),
            trend = ?action.trend,
            volatility = ?action.volatility,
            "price action analyzed"
        );
        action
    }

    /// Distinct local minima, sorted ascending, keeping the last `max_levels`
    pub fn support_levels(&self, prices: &[f64]) -> Vec<f64> {
        let mut levels = self.distinct_extremes(prices, Extreme::Min);
        levels.sort_by(f64::total_cmp);
        let skip = levels.len().saturating_sub(self.config.max_levels);
        levels.split_off(skip)
    }

    /// Distinct local maxima, sorted descending, keeping the first `max_levels`
    pub fn resistance_levels(&self, prices: &[f64]) -> Vec<f64> {
        let mut levels = self.distinct_extremes(prices, Extreme::Max);
        levels.sort_by(|a, b| b.total_cmp(a));
        levels.truncate(self.config.max_levels);
        levels
    }

    /// Compare the mean of the first third with the mean of the last third
    pub fn trend(&self, prices: &[f64]) -> Trend {
        let n = prices.len();
        let (Some(first), Some(last)) = (mean(&prices[..n / 3]), mean(&prices[n * 2 / 3..]))
        else {
            return Trend::Sideways;
        };
        match relative_change(first, last) {
            Some(c) if c > self.config.trend_threshold => Trend::Uptrend,
            Some(c) if c < -self.config.trend_threshold => Trend::Downtrend,
            _ => Trend::Sideways,
        }
    }

    /// Bucket the mean of `|Δp / p_prev|`. Pairs with a zero previous price are skipped.
    pub fn volatility(&self, prices: &[f64]) -> Volatility {
        let returns: Vec<f64> = prices
            .windows(2)
            .filter(|w| is_nonzero(w[0]))
            .map(|w| ((w[1] - w[0]) / w[0]).abs())
            .collect();

        match mean(&returns) {
            Some(avg) if avg < self.config.low_volatility => Volatility::Low,
            Some(avg) if avg > self.config.high_volatility => Volatility::High,
            _ => Volatility::Medium,
        }
    }

    /// Strict local extrema at `1..=n-2`, first-seen of each near-duplicate cluster
    fn distinct_extremes(&self, prices: &[f64], extreme: Extreme) -> Vec<f64> {
        let threshold = price_range(prices).unwrap_or(0.0) * self.config.level_merge_ratio;
        let mut levels: Vec<f64> = Vec::new();

        for w in prices.windows(3) {
            let (prev, p, next) = (w[0], w[1], w[2]);
            let is_extreme = match extreme {
                Extreme::Min => p < prev && p < next,
                Extreme::Max => p > prev && p > next,
            };
            if is_extreme && !levels.iter().any(|l| (l - p).abs() < threshold) {
                levels.push(p);
            }
        }
        levels
    }
}

/// Analyze price action with the default thresholds.
///
/// Fewer than 5 points yields [`PriceAction::default()`].
pub fn analyze_price_action<T: PriceBar>(series: &[T]) -> PriceAction {
    PriceActionAnalyzer::default().analyze(series)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_returns_default() {
        let action = analyze_price_action(&[100.0, 101.0, 99.0, 102.0]);
        assert_eq!(action, PriceAction::default());
        assert_eq!(action.trend, Trend::Sideways);
        assert_eq!(action.volatility, Volatility::Medium);
    }

    #[test]
    fn test_supports_keep_highest_three_after_sort() {
        let prices = [110.0, 100.0, 112.0, 90.0, 115.0, 95.0, 118.0, 105.0, 120.0, 80.0, 125.0];
        let analyzer = PriceActionAnalyzer::default();
        assert_eq!(analyzer.support_levels(&prices), vec![95.0, 100.0, 105.0]);
    }

    #[test]
    fn test_resistances_merge_near_duplicates_first_seen() {
        // range 45, merge threshold 2.25: 120 is within 2 of 118 and is dropped
        let prices = [110.0, 100.0, 112.0, 90.0, 115.0, 95.0, 118.0, 105.0, 120.0, 80.0, 125.0];
        let analyzer = PriceActionAnalyzer::default();
        assert_eq!(analyzer.resistance_levels(&prices), vec![118.0, 115.0, 112.0]);
    }

    #[test]
    fn test_merge_clusters() {
        let prices = [100.0, 90.0, 110.0, 90.5, 112.0, 91.0, 111.0, 70.0, 130.0];
        let action = analyze_price_action(&prices);
        assert_eq!(action.support_levels, vec![70.0, 90.0]);
        assert_eq!(action.resistance_levels, vec![110.0]);
    }

    #[test]
    fn test_volatility_buckets() {
        let analyzer = PriceActionAnalyzer::default();
        assert_eq!(analyzer.volatility(&[100.0, 101.0, 100.0, 101.0, 100.0]), Volatility::Low);
        assert_eq!(analyzer.volatility(&[100.0, 102.0, 100.0, 102.0, 100.0]), Volatility::Medium);
        assert_eq!(analyzer.volatility(&[100.0, 110.0, 100.0, 110.0, 100.0]), Volatility::High);
    }

    #[test]
    fn test_zero_prices_degrade_to_default() {
        let action = analyze_price_action(&[0.0; 12]);
        assert_eq!(action, PriceAction::default());
    }

    #[test]
    fn test_config_validation() {
        let inverted = PriceActionConfig {
            low_volatility: 0.05,
            high_volatility: 0.01,
            ..Default::default()
        };
        assert!(PriceActionAnalyzer::new(inverted).is_err());

        let negative = PriceActionConfig {
            trend_threshold: -0.1,
            ..Default::default()
        };
        assert!(PriceActionAnalyzer::new(negative).is_err());

        assert!(PriceActionAnalyzer::new(PriceActionConfig::default()).is_ok());
    }

    #[test]
    fn test_custom_max_levels() {
        let analyzer = PriceActionAnalyzer::new(PriceActionConfig {
            max_levels: 1,
            ..Default::default()
        })
        .unwrap();
        let prices = [110.0, 100.0, 112.0, 90.0, 115.0, 95.0, 118.0, 105.0, 120.0, 80.0, 125.0];
        let action = analyzer.analyze_prices(&prices);
        assert_eq!(action.support_levels, vec![105.0]);
        assert_eq!(action.resistance_levels, vec![118.0]);
    }
}
