//! Multi-instrument screening
//!
//! Runs the pattern engine and the price-action analyzer over many instruments
//! in parallel and filters the results by pattern, trend and volatility.

use rayon::prelude::*;
use serde::Deserialize;

use crate::price_action::{PriceAction, PriceActionAnalyzer, Trend, Volatility};
use crate::{ChartPattern, PatternEngine, PatternError, PatternKind, PriceBar, Signal};

/// Result of scanning a single instrument
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<ChartPattern>,
    pub price_action: PriceAction,
}

impl ScanResult {
    pub fn has_pattern(&self, kind: PatternKind) -> bool {
        self.patterns.iter().any(|p| p.kind == kind)
    }

    /// Count of patterns with the given signal
    pub fn signal_count(&self, signal: Signal) -> usize {
        self.patterns.iter().filter(|p| p.signal == signal).count()
    }
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    analyzer: &PriceActionAnalyzer,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: PriceBar + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, series)| {
            engine
                .scan(series)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                    price_action: analyzer.analyze(series),
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => {
                tracing::debug!(symbol = %e.symbol, error = %e.error, "instrument rejected");
                errors.push(e);
            }
        }
    }

    (successes, errors)
}

/// Criteria an instrument must meet. Unset criteria accept everything.
///
/// An empty string deserializes as unset, matching an "All" choice in a form.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenFilter {
    #[serde(rename = "chartPattern", deserialize_with = "empty_as_none")]
    pub pattern: Option<PatternKind>,
    #[serde(rename = "priceTrend", deserialize_with = "empty_as_none")]
    pub trend: Option<Trend>,
    #[serde(deserialize_with = "empty_as_none")]
    pub volatility: Option<Volatility>,
}

/// `null` and `""` become `None`, anything else goes through `T`'s own names
fn empty_as_none<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::de::IntoDeserializer;

    match Option::<String>::deserialize(d)? {
        Some(s) if !s.trim().is_empty() => {
            T::deserialize(s.as_str().into_deserializer()).map(Some)
        }
        _ => Ok(None),
    }
}

impl ScreenFilter {
    pub fn pattern(mut self, kind: PatternKind) -> Self {
        self.pattern = Some(kind);
        self
    }

    pub fn trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn volatility(mut self, volatility: Volatility) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn matches(&self, result: &ScanResult) -> bool {
        if let Some(kind) = self.pattern {
            if !result.has_pattern(kind) {
                return false;
            }
        }
        if let Some(trend) = self.trend {
            if result.price_action.trend != trend {
                return false;
            }
        }
        if let Some(volatility) = self.volatility {
            if result.price_action.volatility != volatility {
                return false;
            }
        }
        true
    }

    /// Keep the results that match, preserving order
    pub fn apply<'r>(&self, results: &'r [ScanResult]) -> Vec<&'r ScanResult> {
        results.iter().filter(|r| self.matches(r)).collect()
    }
}
