//! # chart-patterns
//!
//! Chart formation detection and price-action analysis over price/volume series.
//!
//! ## Quick Start
//!
//! ```rust
//! use chart_patterns::prelude::*;
//!
//! let series: Vec<PricePoint> = (0..30)
//!     .map(|i| PricePoint::new(format!("day {i}"), 100.0 + i as f64, 1_000))
//!     .collect();
//!
//! // One-shot helpers with the default thresholds
//! let patterns = detect_patterns(&series);
//! let action = analyze_price_action(&series);
//! assert_eq!(action.trend, Trend::Uptrend);
//!
//! // Or build an engine with filters
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .min_confidence(0.7)
//!     .build()
//!     .unwrap();
//! let strong = engine.scan(&series).unwrap();
//! assert!(strong.len() <= patterns.len());
//! ```

pub mod detectors;
pub mod params;
pub mod price_action;
pub mod screen;

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // Parameters
        params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Price action
        price_action::{
            analyze_price_action, PriceAction, PriceActionAnalyzer, PriceActionConfig, Trend,
            Volatility,
        },
        // Screening
        screen::{scan_parallel, ScanError, ScanResult, ScreenFilter},
        // Engine
        detect_patterns,
        BuiltinDetector,
        ChartPattern,
        EngineBuilder,
        EngineConfig,
        PatternDetector,
        PatternEngine,
        // Errors
        PatternError,
        PatternKind,
        Period,
        // Core traits
        PriceBar,
        PricePoint,
        Ratio,
        Result,
        Signal,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised by configuration and input validation.
///
/// Detection itself never fails: an unmet precondition simply yields no pattern.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid price point at index {index}: {reason}")]
    InvalidPoint { index: usize, reason: &'static str },

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// PRICE DATA
// ============================================================

/// Core price observation trait
pub trait PriceBar {
    fn price(&self) -> f64;

    fn volume(&self) -> u64 {
        0
    }

    /// Display label (usually a date)
    fn label(&self) -> Option<&str> {
        None
    }
}

/// One observation of a price series
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    pub volume: u64,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64, volume: u64) -> Self {
        Self {
            date: date.into(),
            price,
            volume,
        }
    }
}

impl PriceBar for PricePoint {
    #[inline]
    fn price(&self) -> f64 {
        self.price
    }

    #[inline]
    fn volume(&self) -> u64 {
        self.volume
    }

    fn label(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl PriceBar for f64 {
    #[inline]
    fn price(&self) -> f64 {
        *self
    }
}

impl<T: PriceBar + ?Sized> PriceBar for &T {
    fn price(&self) -> f64 {
        (**self).price()
    }

    fn volume(&self) -> u64 {
        (**self).volume()
    }

    fn label(&self) -> Option<&str> {
        (**self).label()
    }
}

/// Check that every price is finite and non-negative.
pub fn validate_series<T: PriceBar>(series: &[T]) -> Result<()> {
    for (index, point) in series.iter().enumerate() {
        let price = point.price();
        if price.is_nan() {
            return Err(PatternError::InvalidPoint {
                index,
                reason: "NaN price",
            });
        }
        if price.is_infinite() {
            return Err(PatternError::InvalidPoint {
                index,
                reason: "Infinite price",
            });
        }
        if price < 0.0 {
            return Err(PatternError::InvalidPoint {
                index,
                reason: "Negative price",
            });
        }
    }
    Ok(())
}

// ============================================================
// PATTERN KINDS
// ============================================================

/// Fixed confidence per pattern kind. These are constants, not computed scores.
pub mod confidence {
    pub const HEAD_AND_SHOULDERS: f64 = 0.75;
    pub const DOUBLE_TOP: f64 = 0.70;
    pub const DOUBLE_BOTTOM: f64 = 0.70;
    pub const ASCENDING_TRIANGLE: f64 = 0.65;
    pub const DESCENDING_TRIANGLE: f64 = 0.65;
    pub const SYMMETRICAL_TRIANGLE: f64 = 0.60;
    pub const BULLISH_FLAG: f64 = 0.68;
    pub const BEARISH_FLAG: f64 = 0.68;
    pub const CUP_AND_HANDLE: f64 = 0.72;
    pub const RISING_WEDGE: f64 = 0.65;
    pub const FALLING_WEDGE: f64 = 0.65;
}

/// Signal polarity of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

impl Signal {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Signal::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Signal::Bearish)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Bullish => "bullish",
            Signal::Bearish => "bearish",
            Signal::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chart formations this crate recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PatternKind {
    #[serde(rename = "Head and Shoulders")]
    HeadAndShoulders,
    #[serde(rename = "Double Top")]
    DoubleTop,
    #[serde(rename = "Double Bottom")]
    DoubleBottom,
    #[serde(rename = "Ascending Triangle")]
    AscendingTriangle,
    #[serde(rename = "Descending Triangle")]
    DescendingTriangle,
    #[serde(rename = "Symmetrical Triangle")]
    SymmetricalTriangle,
    #[serde(rename = "Bullish Flag")]
    BullishFlag,
    #[serde(rename = "Bearish Flag")]
    BearishFlag,
    #[serde(rename = "Cup and Handle")]
    CupAndHandle,
    #[serde(rename = "Rising Wedge")]
    RisingWedge,
    #[serde(rename = "Falling Wedge")]
    FallingWedge,
}

impl PatternKind {
    /// All kinds, in evaluation order
    pub const ALL: [PatternKind; 11] = [
        PatternKind::HeadAndShoulders,
        PatternKind::DoubleTop,
        PatternKind::DoubleBottom,
        PatternKind::AscendingTriangle,
        PatternKind::DescendingTriangle,
        PatternKind::SymmetricalTriangle,
        PatternKind::BullishFlag,
        PatternKind::BearishFlag,
        PatternKind::CupAndHandle,
        PatternKind::RisingWedge,
        PatternKind::FallingWedge,
    ];

    /// Display name, e.g. "Head and Shoulders"
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "Head and Shoulders",
            PatternKind::DoubleTop => "Double Top",
            PatternKind::DoubleBottom => "Double Bottom",
            PatternKind::AscendingTriangle => "Ascending Triangle",
            PatternKind::DescendingTriangle => "Descending Triangle",
            PatternKind::SymmetricalTriangle => "Symmetrical Triangle",
            PatternKind::BullishFlag => "Bullish Flag",
            PatternKind::BearishFlag => "Bearish Flag",
            PatternKind::CupAndHandle => "Cup and Handle",
            PatternKind::RisingWedge => "Rising Wedge",
            PatternKind::FallingWedge => "Falling Wedge",
        }
    }

    pub fn signal(self) -> Signal {
        match self {
            PatternKind::DoubleBottom
            | PatternKind::AscendingTriangle
            | PatternKind::BullishFlag
            | PatternKind::CupAndHandle
            | PatternKind::FallingWedge => Signal::Bullish,
            PatternKind::HeadAndShoulders
            | PatternKind::DoubleTop
            | PatternKind::DescendingTriangle
            | PatternKind::BearishFlag
            | PatternKind::RisingWedge => Signal::Bearish,
            PatternKind::SymmetricalTriangle => Signal::Neutral,
        }
    }

    pub fn confidence(self) -> f64 {
        match self {
            PatternKind::HeadAndShoulders => confidence::HEAD_AND_SHOULDERS,
            PatternKind::DoubleTop => confidence::DOUBLE_TOP,
            PatternKind::DoubleBottom => confidence::DOUBLE_BOTTOM,
            PatternKind::AscendingTriangle => confidence::ASCENDING_TRIANGLE,
            PatternKind::DescendingTriangle => confidence::DESCENDING_TRIANGLE,
            PatternKind::SymmetricalTriangle => confidence::SYMMETRICAL_TRIANGLE,
            PatternKind::BullishFlag => confidence::BULLISH_FLAG,
            PatternKind::BearishFlag => confidence::BEARISH_FLAG,
            PatternKind::CupAndHandle => confidence::CUP_AND_HANDLE,
            PatternKind::RisingWedge => confidence::RISING_WEDGE,
            PatternKind::FallingWedge => confidence::FALLING_WEDGE,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => {
                "Bearish reversal pattern - indicates potential downward trend"
            }
            PatternKind::DoubleTop => {
                "Bearish reversal pattern - two peaks at similar resistance level"
            }
            PatternKind::DoubleBottom => {
                "Bullish reversal pattern - two troughs at similar support level"
            }
            PatternKind::AscendingTriangle => {
                "Bullish continuation pattern - resistance level with rising support"
            }
            PatternKind::DescendingTriangle => {
                "Bearish continuation pattern - support level with falling resistance"
            }
            PatternKind::SymmetricalTriangle => {
                "Neutral pattern - price consolidation, breakout direction uncertain"
            }
            PatternKind::BullishFlag => {
                "Bullish continuation pattern - brief consolidation after strong uptrend"
            }
            PatternKind::BearishFlag => {
                "Bearish continuation pattern - brief consolidation after strong downtrend"
            }
            PatternKind::CupAndHandle => {
                "Bullish continuation pattern - rounded bottom followed by consolidation"
            }
            PatternKind::RisingWedge => {
                "Bearish reversal pattern - upward trend with converging lines"
            }
            PatternKind::FallingWedge => {
                "Bullish reversal pattern - downward trend with converging lines"
            }
        }
    }

    /// Shortest series the heuristic for this kind will look at
    pub fn min_points(self) -> usize {
        match self {
            PatternKind::HeadAndShoulders | PatternKind::CupAndHandle => 15,
            PatternKind::BullishFlag | PatternKind::BearishFlag => 8,
            _ => 10,
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PatternError::UnknownPattern(s.to_string()))
    }
}

// ============================================================
// CHART PATTERN - result of detection (Copy, no allocations)
// ============================================================

/// A detected formation. `start_index..=end_index` indexes the input series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub confidence: f64,
    pub description: &'static str,
    pub signal: Signal,
    pub start_index: usize,
    pub end_index: usize,
}

impl ChartPattern {
    /// Build a pattern with the fixed confidence, signal and description of `kind`.
    pub fn new(kind: PatternKind, start_index: usize, end_index: usize) -> Self {
        Self {
            kind,
            confidence: kind.confidence(),
            description: kind.description(),
            signal: kind.signal(),
            start_index,
            end_index,
        }
    }

    /// Number of points the pattern spans. An inverted span counts as one point.
    #[inline]
    pub fn span_len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// A single shape heuristic over the price (and volume) channels.
///
/// Object safe: engines hold custom implementations as `Box<dyn PatternDetector>`.
pub trait PatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;

    fn min_points(&self) -> usize {
        self.kind().min_points()
    }

    /// Returns at most one candidate. `prices` and `volumes` have equal length.
    fn detect(&self, prices: &[f64], volumes: &[u64]) -> Option<ChartPattern>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect(&self, prices: &[f64], volumes: &[u64]) -> Option<ChartPattern> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, prices, volumes)),*
                }
            }

            #[inline]
            pub fn kind(&self) -> PatternKind {
                match self {
                    $(Self::$variant(d) => PatternDetector::kind(d)),*
                }
            }

            #[inline]
            pub fn min_points(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_points(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

// Evaluation order is the declaration order of `with_all_defaults`
define_builtin_detectors! {
    // Reversal
    HeadAndShoulders(HeadAndShouldersDetector),
    DoubleTop(DoubleTopDetector),
    DoubleBottom(DoubleBottomDetector),

    // Triangles
    AscendingTriangle(AscendingTriangleDetector),
    DescendingTriangle(DescendingTriangleDetector),
    SymmetricalTriangle(SymmetricalTriangleDetector),

    // Continuation
    BullishFlag(BullishFlagDetector),
    BearishFlag(BearishFlagDetector),
    CupAndHandle(CupAndHandleDetector),

    // Wedges
    RisingWedge(RisingWedgeDetector),
    FallingWedge(FallingWedgeDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Global floor on series length below which no detector runs
pub const DEFAULT_MIN_POINTS: usize = 10;

/// Engine configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_confidence: Option<f64>,
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<PatternKind>>,
    pub min_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: None,
            validate_data: false,
            pattern_filter: None,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_confidence {
            if min.is_nan() || !(0.0..=1.0).contains(&min) {
                return Err(PatternError::OutOfRange {
                    field: "min_confidence",
                    value: min,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        Ok(())
    }
}

/// Main pattern detection engine
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: EngineConfig,
}

impl Default for PatternEngine {
    /// All eleven detectors with default thresholds, no filters
    fn default() -> Self {
        Self {
            builtin: BuiltinDetector::all_defaults().to_vec(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }
}

impl PatternEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detectors(&self) -> &[BuiltinDetector] {
        &self.builtin
    }

    // ===========================================
    // LOW-LEVEL: raw channels
    // ===========================================

    /// Run every detector over already extracted channels.
    pub fn detect_prices(&self, prices: &[f64], volumes: &[u64]) -> Vec<ChartPattern> {
        if prices.len() < self.config.min_points {
            tracing::trace!(
                points = prices.len(),
                min_points = self.config.min_points,
                "series below global floor, skipping detection"
            );
            return Vec::new();
        }

        let mut results = Vec::new();
        for detector in &self.builtin {
            if prices.len() < detector.min_points() {
                tracing::trace!(
                    pattern = %detector.kind(),
                    points = prices.len(),
                    min_points = detector.min_points(),
                    "series too short for detector"
                );
                continue;
            }
            if let Some(m) = detector.detect(prices, volumes) {
                self.push_match(&mut results, m);
            }
        }

        // Slow path: custom detectors (vtable)
        for detector in &self.custom {
            if prices.len() < detector.min_points() {
                continue;
            }
            if let Some(m) = detector.detect(prices, volumes) {
                self.push_match(&mut results, m);
            }
        }

        results
    }

    // ===========================================
    // HIGH-LEVEL: series input
    // ===========================================

    /// Detect patterns without input validation. Never fails.
    pub fn detect<T: PriceBar>(&self, series: &[T]) -> Vec<ChartPattern> {
        let prices: Vec<f64> = series.iter().map(PriceBar::price).collect();
        let volumes: Vec<u64> = series.iter().map(PriceBar::volume).collect();
        self.detect_prices(&prices, &volumes)
    }

    /// Detect patterns, validating the input first when `validate_data` is set.
    pub fn scan<T: PriceBar>(&self, series: &[T]) -> Result<Vec<ChartPattern>> {
        if self.config.validate_data {
            validate_series(series)?;
        }
        let patterns = self.detect(series);
        tracing::debug!(
            points = series.len(),
            patterns = patterns.len(),
            "scan complete"
        );
        Ok(patterns)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn push_match(&self, results: &mut Vec<ChartPattern>, m: ChartPattern) {
        if !self.should_include(&m) {
            return;
        }
        tracing::debug!(
            pattern = %m.kind,
            signal = %m.signal,
            start = m.start_index,
            end = m.end_index,
            "pattern detected"
        );
        results.push(m);
    }

    fn should_include(&self, m: &ChartPattern) -> bool {
        if let Some(min) = self.config.min_confidence {
            if m.confidence < min {
                return false;
            }
        }
        if let Some(ref filter) = self.config.pattern_filter {
            if !filter.contains(&m.kind) {
                return false;
            }
        }
        true
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        for d in &self.builtin {
            d.validate_config()?;
        }
        for d in &self.custom {
            d.validate_config()?;
        }
        Ok(())
    }
}

/// Detect chart patterns using the default engine.
///
/// Fewer than [`DEFAULT_MIN_POINTS`] points yields an empty list.
pub fn detect_patterns<T: PriceBar>(series: &[T]) -> Vec<ChartPattern> {
    PatternEngine::default().detect(series)
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Default)]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: EngineConfig,
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

impl BuiltinDetector {
    /// All eleven detectors with default thresholds, in evaluation order
    pub fn all_defaults() -> [BuiltinDetector; 11] {
        builtin_defaults![
            HeadAndShoulders,
            DoubleTop,
            DoubleBottom,
            AscendingTriangle,
            DescendingTriangle,
            SymmetricalTriangle,
            BullishFlag,
            BearishFlag,
            CupAndHandle,
            RisingWedge,
            FallingWedge,
        ]
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a deserialized configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add all builtin patterns with default configurations
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin.extend(BuiltinDetector::all_defaults());
        self
    }

    /// Head and shoulders, double top, double bottom
    pub fn with_reversal_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![HeadAndShoulders, DoubleTop, DoubleBottom]);
        self
    }

    /// Ascending, descending and symmetrical triangles
    pub fn with_triangle_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            AscendingTriangle,
            DescendingTriangle,
            SymmetricalTriangle,
        ]);
        self
    }

    /// Bullish flag, bearish flag, cup and handle
    pub fn with_continuation_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![BullishFlag, BearishFlag, CupAndHandle]);
        self
    }

    /// Rising and falling wedges
    pub fn with_wedge_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![RisingWedge, FallingWedge]);
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Add a custom detector (slow path, runs after every builtin)
    pub fn add_custom<D: PatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Set minimum confidence filter
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Override the global series-length floor
    pub fn min_points(mut self, points: usize) -> Self {
        self.config.min_points = points;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn points(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(format!("d{i}"), p, 1000))
            .collect()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 * 1.02_f64.powi(i as i32)).collect()
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.5).is_ok());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.1).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(100).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_pattern_kind_round_trips_display_name() {
        for kind in PatternKind::ALL {
            assert_eq!(kind.as_str().parse::<PatternKind>().unwrap(), kind);
        }
        assert_eq!(
            "cup and handle".parse::<PatternKind>().unwrap(),
            PatternKind::CupAndHandle
        );
        assert!("Triple Top".parse::<PatternKind>().is_err());
    }

    #[test]
    fn test_chart_pattern_takes_kind_constants() {
        let p = ChartPattern::new(PatternKind::SymmetricalTriangle, 0, 9);
        assert_eq!(p.signal, Signal::Neutral);
        assert_eq!(p.confidence, 0.60);
        assert_eq!(p.span_len(), 10);

        let inverted = ChartPattern::new(PatternKind::BearishFlag, 5, 3);
        assert_eq!(inverted.span_len(), 1);
    }

    #[test]
    fn test_engine_builder() {
        let engine = EngineBuilder::new().with_all_defaults().build();
        assert!(engine.is_ok());
        assert_eq!(engine.unwrap().detectors().len(), 11);
    }

    #[test]
    fn test_grouped_defaults_cover_all() {
        let engine = EngineBuilder::new()
            .with_reversal_defaults()
            .with_triangle_defaults()
            .with_continuation_defaults()
            .with_wedge_defaults()
            .build()
            .unwrap();
        let kinds: Vec<_> = engine.detectors().iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, PatternKind::ALL.to_vec());
    }

    #[test]
    fn test_empty_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let series: Vec<PricePoint> = vec![];
        assert!(engine.scan(&series).unwrap().is_empty());
    }

    #[test]
    fn test_min_confidence_filter() {
        let series = points(&rising(20));
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(0.99)
            .build()
            .unwrap();
        assert!(engine.scan(&series).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_filter() {
        let series = points(&rising(20));
        assert!(detect_patterns(&series)
            .iter()
            .any(|p| p.kind == PatternKind::BullishFlag));

        let engine = EngineBuilder::new()
            .with_all_defaults()
            .only_patterns([PatternKind::DoubleTop])
            .build()
            .unwrap();
        assert!(engine.scan(&series).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_min_confidence_rejected() {
        let result = EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(1.5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_data_reports_index() {
        let mut prices = rising(12);
        prices[7] = f64::NAN;
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .validate_data(true)
            .build()
            .unwrap();
        match engine.scan(&points(&prices)) {
            Err(PatternError::InvalidPoint { index, .. }) => assert_eq!(index, 7),
            other => panic!("expected InvalidPoint, got {other:?}"),
        }
    }

    #[test]
    fn test_min_points_override() {
        let series = points(&rising(9));
        assert!(detect_patterns(&series).is_empty());

        let engine = EngineBuilder::new()
            .with_all_defaults()
            .min_points(8)
            .build()
            .unwrap();
        let kinds: Vec<_> = engine.scan(&series).unwrap().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PatternKind::BullishFlag]);
    }

    #[test]
    fn test_plain_prices_are_price_bars() {
        let prices = rising(20);
        assert_eq!(detect_patterns(&prices), detect_patterns(&points(&prices)));
    }
}
