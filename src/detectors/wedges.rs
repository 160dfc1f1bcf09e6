//! Wedge formations: a contracting range drifting up or down

use std::collections::HashMap;

use super::helpers::{halves, max_of, min_of, price_range};
use crate::{
    params::{get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    ChartPattern, PatternDetector, PatternKind, Ratio, Result,
};

impl_with_defaults!(RisingWedgeDetector, FallingWedgeDetector);

/// Second-half range below `max_range_ratio` of the first-half range
fn converging(first: &[f64], second: &[f64], max_range_ratio: f64) -> Option<bool> {
    Some(price_range(second)? < price_range(first)? * max_range_ratio)
}

// ============================================================
// RISING WEDGE
// ============================================================

/// Contracting range whose floor rises between the halves
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RisingWedgeDetector {
    pub max_range_ratio: Ratio,
}

impl Default for RisingWedgeDetector {
    fn default() -> Self {
        Self {
            max_range_ratio: Ratio::new_const(0.6),
        }
    }
}

impl PatternDetector for RisingWedgeDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::RisingWedge
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (first, second) = halves(prices);
        let matched = converging(first, second, self.max_range_ratio.get())?
            && min_of(second)? > min_of(first)?;
        matched.then(|| ChartPattern::new(self.kind(), 0, prices.len() - 1))
    }
}

// ============================================================
// FALLING WEDGE
// ============================================================

/// Contracting range whose ceiling falls between the halves
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FallingWedgeDetector {
    pub max_range_ratio: Ratio,
}

impl Default for FallingWedgeDetector {
    fn default() -> Self {
        Self {
            max_range_ratio: Ratio::new_const(0.6),
        }
    }
}

impl PatternDetector for FallingWedgeDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::FallingWedge
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let (first, second) = halves(prices);
        let matched = converging(first, second, self.max_range_ratio.get())?
            && max_of(second)? < max_of(first)?;
        matched.then(|| ChartPattern::new(self.kind(), 0, prices.len() - 1))
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static WEDGE_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "max_range_ratio",
    param_type: ParamType::Ratio,
    default: 0.6,
    range: (0.4, 0.8, 0.1),
    description: "Second-half range must be below this share of the first-half range",
}];

impl ParameterizedDetector for RisingWedgeDetector {
    fn param_meta() -> &'static [ParamMeta] {
        WEDGE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_range_ratio: get_ratio(params, "max_range_ratio", 0.6)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::RisingWedge
    }
}

impl ParameterizedDetector for FallingWedgeDetector {
    fn param_meta() -> &'static [ParamMeta] {
        WEDGE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_range_ratio: get_ratio(params, "max_range_ratio", 0.6)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::FallingWedge
    }
}
