//! Triangle formations over the two halves of a series

use std::collections::HashMap;

use super::helpers::{halves, max_of, min_of, price_range, relative_change, relative_diff};
use crate::{
    params::{get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    ChartPattern, PatternDetector, PatternKind, Ratio, Result,
};

impl_with_defaults!(
    AscendingTriangleDetector,
    DescendingTriangleDetector,
    SymmetricalTriangleDetector,
);

/// Max and min of each half
#[derive(Debug, Clone, Copy)]
struct HalfBounds {
    first_max: f64,
    first_min: f64,
    second_max: f64,
    second_min: f64,
}

impl HalfBounds {
    /// `None` if either half is empty
    fn of(prices: &[f64]) -> Option<Self> {
        let (first, second) = halves(prices);
        Some(Self {
            first_max: max_of(first)?,
            first_min: min_of(first)?,
            second_max: max_of(second)?,
            second_min: min_of(second)?,
        })
    }
}

fn whole_series(kind: PatternKind, prices: &[f64]) -> ChartPattern {
    ChartPattern::new(kind, 0, prices.len() - 1)
}

// ============================================================
// ASCENDING TRIANGLE
// ============================================================

/// Flat resistance (half maxima close together) with rising support
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AscendingTriangleDetector {
    /// Maximum relative difference between the half maxima
    pub flat_tolerance: Ratio,
    /// Minimum relative rise of the second-half minimum
    pub min_slope: Ratio,
}

impl Default for AscendingTriangleDetector {
    fn default() -> Self {
        Self {
            flat_tolerance: Ratio::new_const(0.03),
            min_slope: Ratio::new_const(0.02),
        }
    }
}

impl PatternDetector for AscendingTriangleDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::AscendingTriangle
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let b = HalfBounds::of(prices)?;

        let flat = relative_diff(b.first_max, b.second_max)? < self.flat_tolerance.get();
        let rising = b.second_min > b.first_min
            && relative_change(b.first_min, b.second_min)? > self.min_slope.get();

        (flat && rising).then(|| whole_series(self.kind(), prices))
    }
}

// ============================================================
// DESCENDING TRIANGLE
// ============================================================

/// Flat support (half minima close together) with falling resistance
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DescendingTriangleDetector {
    /// Maximum relative difference between the half minima
    pub flat_tolerance: Ratio,
    /// Minimum relative drop of the second-half maximum
    pub min_slope: Ratio,
}

impl Default for DescendingTriangleDetector {
    fn default() -> Self {
        Self {
            flat_tolerance: Ratio::new_const(0.03),
            min_slope: Ratio::new_const(0.02),
        }
    }
}

impl PatternDetector for DescendingTriangleDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::DescendingTriangle
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let b = HalfBounds::of(prices)?;

        let flat = relative_diff(b.first_min, b.second_min)? < self.flat_tolerance.get();
        let falling = b.second_max < b.first_max
            && relative_diff(b.first_max, b.second_max)? > self.min_slope.get();

        (flat && falling).then(|| whole_series(self.kind(), prices))
    }
}

// ============================================================
// SYMMETRICAL TRIANGLE
// ============================================================

/// Second-half range contracts below `max_range_ratio` of the first-half range
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SymmetricalTriangleDetector {
    pub max_range_ratio: Ratio,
}

impl Default for SymmetricalTriangleDetector {
    fn default() -> Self {
        Self {
            max_range_ratio: Ratio::new_const(0.7),
        }
    }
}

impl PatternDetector for SymmetricalTriangleDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::SymmetricalTriangle
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (first, second) = halves(prices);
        let converging = price_range(second)? < price_range(first)? * self.max_range_ratio.get();
        converging.then(|| whole_series(self.kind(), prices))
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static TRIANGLE_PARAMS: &[ParamMeta] = &[
    ParamMeta {
        name: "flat_tolerance",
        param_type: ParamType::Ratio,
        default: 0.03,
        range: (0.01, 0.06, 0.01),
        description: "Maximum relative difference along the flat side",
    },
    ParamMeta {
        name: "min_slope",
        param_type: ParamType::Ratio,
        default: 0.02,
        range: (0.01, 0.05, 0.01),
        description: "Minimum relative move along the sloped side",
    },
];

static SYMMETRICAL_TRIANGLE_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "max_range_ratio",
    param_type: ParamType::Ratio,
    default: 0.7,
    range: (0.5, 0.9, 0.1),
    description: "Second-half range must be below this share of the first-half range",
}];

impl ParameterizedDetector for AscendingTriangleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        TRIANGLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            flat_tolerance: get_ratio(params, "flat_tolerance", 0.03)?,
            min_slope: get_ratio(params, "min_slope", 0.02)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::AscendingTriangle
    }
}

impl ParameterizedDetector for DescendingTriangleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        TRIANGLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            flat_tolerance: get_ratio(params, "flat_tolerance", 0.03)?,
            min_slope: get_ratio(params, "min_slope", 0.02)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::DescendingTriangle
    }
}

impl ParameterizedDetector for SymmetricalTriangleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        SYMMETRICAL_TRIANGLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_range_ratio: get_ratio(params, "max_range_ratio", 0.7)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::SymmetricalTriangle
    }
}
