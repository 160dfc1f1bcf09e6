//! Continuation formations: Bullish Flag, Bearish Flag, Cup and Handle

use std::collections::HashMap;

use super::helpers::{halves, is_nonzero, mean, min_of, outer_quarters, relative_diff};
use crate::{
    params::{get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    ChartPattern, PatternDetector, PatternKind, Ratio, Result,
};

impl_with_defaults!(BullishFlagDetector, BearishFlagDetector, CupAndHandleDetector);

/// Means of the first and last quarter, `None` when the first mean is zero
fn quarter_means(prices: &[f64]) -> Option<(f64, f64)> {
    let (head, tail) = outer_quarters(prices);
    let first = mean(head)?;
    let last = mean(tail)?;
    is_nonzero(first).then_some((first, last))
}

fn flag_span(kind: PatternKind, prices: &[f64]) -> ChartPattern {
    ChartPattern::new(kind, prices.len() / 4, prices.len() - 1)
}

// ============================================================
// BULLISH FLAG
// ============================================================

/// Last-quarter mean above the first-quarter mean by more than `min_move`.
///
/// Volume is accepted but does not take part in the comparison.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BullishFlagDetector {
    pub min_move: Ratio,
}

impl Default for BullishFlagDetector {
    fn default() -> Self {
        Self {
            min_move: Ratio::new_const(0.05),
        }
    }
}

impl PatternDetector for BullishFlagDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::BullishFlag
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (first, last) = quarter_means(prices)?;
        (last > first * (1.0 + self.min_move.get())).then(|| flag_span(self.kind(), prices))
    }
}

// ============================================================
// BEARISH FLAG
// ============================================================

/// Last-quarter mean below the first-quarter mean by more than `min_move`.
///
/// Volume is accepted but does not take part in the comparison.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BearishFlagDetector {
    pub min_move: Ratio,
}

impl Default for BearishFlagDetector {
    fn default() -> Self {
        Self {
            min_move: Ratio::new_const(0.05),
        }
    }
}

impl PatternDetector for BearishFlagDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::BearishFlag
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (first, last) = quarter_means(prices)?;
        (last < first * (1.0 - self.min_move.get())).then(|| flag_span(self.kind(), prices))
    }
}

// ============================================================
// CUP AND HANDLE
// ============================================================

/// First half is the cup, second half the handle.
///
/// The cup's rims must be level within `rim_tolerance` and its low must sit
/// below `depth_ratio` of the starting price.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CupAndHandleDetector {
    /// Maximum difference between cup start and end, relative to the start
    pub rim_tolerance: Ratio,
    /// Cup minimum must be below `start * depth_ratio`
    pub depth_ratio: Ratio,
}

impl Default for CupAndHandleDetector {
    fn default() -> Self {
        Self {
            rim_tolerance: Ratio::new_const(0.05),
            depth_ratio: Ratio::new_const(0.9),
        }
    }
}

/// Handle needs more than this many points
const MIN_HANDLE_POINTS: usize = 2;

impl PatternDetector for CupAndHandleDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::CupAndHandle
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (cup, handle) = halves(prices);
        let (&start, &end) = (cup.first()?, cup.last()?);

        let level_rims = relative_diff(start, end)? < self.rim_tolerance.get();
        let deep = min_of(cup)? < start * self.depth_ratio.get();

        (level_rims && deep && handle.len() > MIN_HANDLE_POINTS)
            .then(|| ChartPattern::new(self.kind(), 0, prices.len() - 1))
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static FLAG_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "min_move",
    param_type: ParamType::Ratio,
    default: 0.05,
    range: (0.02, 0.1, 0.01),
    description: "Minimum relative move between first- and last-quarter means",
}];

static CUP_AND_HANDLE_PARAMS: &[ParamMeta] = &[
    ParamMeta {
        name: "rim_tolerance",
        param_type: ParamType::Ratio,
        default: 0.05,
        range: (0.02, 0.1, 0.01),
        description: "Maximum relative difference between the cup rims",
    },
    ParamMeta {
        name: "depth_ratio",
        param_type: ParamType::Ratio,
        default: 0.9,
        range: (0.7, 0.95, 0.05),
        description: "Cup low must fall below this share of the starting price",
    },
];

impl ParameterizedDetector for BullishFlagDetector {
    fn param_meta() -> &'static [ParamMeta] {
        FLAG_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            min_move: get_ratio(params, "min_move", 0.05)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::BullishFlag
    }
}

impl ParameterizedDetector for BearishFlagDetector {
    fn param_meta() -> &'static [ParamMeta] {
        FLAG_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            min_move: get_ratio(params, "min_move", 0.05)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::BearishFlag
    }
}

impl ParameterizedDetector for CupAndHandleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        CUP_AND_HANDLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            rim_tolerance: get_ratio(params, "rim_tolerance", 0.05)?,
            depth_ratio: get_ratio(params, "depth_ratio", 0.9)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::CupAndHandle
    }
}
