//! Reversal formations: Head and Shoulders, Double Top, Double Bottom

use std::collections::HashMap;

use super::helpers::{find_local_max, indices_near, max_of, min_of, padded_span, relative_diff};
use crate::{
    params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    ChartPattern, PatternDetector, PatternError, PatternKind, Period, Ratio, Result,
};

impl_with_defaults!(
    HeadAndShouldersDetector,
    DoubleTopDetector,
    DoubleBottomDetector,
);

// ============================================================
// HEAD AND SHOULDERS
// ============================================================

/// Three consecutive windows whose interior maxima form shoulder, head, shoulder.
///
/// The first window position that satisfies the shape wins. The reported span
/// extends `window` points beyond each shoulder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeadAndShouldersDetector {
    /// Width of each of the three scan windows
    pub window: Period,
    /// Maximum shoulder mismatch, relative to the left shoulder
    pub shoulder_tolerance: Ratio,
}

impl Default for HeadAndShouldersDetector {
    fn default() -> Self {
        Self {
            window: Period::new_const(5),
            shoulder_tolerance: Ratio::new_const(0.05),
        }
    }
}

impl PatternDetector for HeadAndShouldersDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::HeadAndShoulders
    }

    fn min_points(&self) -> usize {
        PatternKind::HeadAndShoulders.min_points().max(self.window.get() * 3)
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        let n = prices.len();
        if n < self.min_points() {
            return None;
        }
        let w = self.window.get();

        for i in w..n - w {
            let Some(left) = find_local_max(prices, i - w, i) else {
                continue;
            };
            let Some(head) = find_local_max(prices, i, i + w) else {
                continue;
            };
            let Some(right) = find_local_max(prices, i + w, i + 2 * w) else {
                continue;
            };

            if head.value <= left.value || head.value <= right.value {
                continue;
            }
            let Some(mismatch) = relative_diff(left.value, right.value) else {
                continue;
            };
            if mismatch < self.shoulder_tolerance.get() {
                let (start, end) = padded_span(left.index, right.index, w, n);
                return Some(ChartPattern::new(self.kind(), start, end));
            }
        }
        None
    }

    fn validate_config(&self) -> Result<()> {
        if self.window.get() < 3 {
            return Err(PatternError::InvalidConfig(format!(
                "head and shoulders window must be at least 3, got {}",
                self.window.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// DOUBLE TOP / DOUBLE BOTTOM
// ============================================================

/// Two visits to the global maximum, separated by more than `min_separation` points.
///
/// Only the first two qualifying indices are compared. The span pads both by
/// `min_separation`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DoubleTopDetector {
    /// How close to the maximum a point must be, relative to the maximum
    pub peak_tolerance: Ratio,
    /// Required gap between the two peaks (exclusive)
    pub min_separation: Period,
}

impl Default for DoubleTopDetector {
    fn default() -> Self {
        Self {
            peak_tolerance: Ratio::new_const(0.02),
            min_separation: Period::new_const(3),
        }
    }
}

impl PatternDetector for DoubleTopDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::DoubleTop
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let peak = max_of(prices)?;
        let visits = indices_near(prices, peak, self.peak_tolerance.get());
        two_visits(self.kind(), &visits, self.min_separation.get(), prices.len())
    }
}

/// Two visits to the global minimum, mirror of [`DoubleTopDetector`]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DoubleBottomDetector {
    /// How close to the minimum a point must be, relative to the minimum
    pub trough_tolerance: Ratio,
    /// Required gap between the two troughs (exclusive)
    pub min_separation: Period,
}

impl Default for DoubleBottomDetector {
    fn default() -> Self {
        Self {
            trough_tolerance: Ratio::new_const(0.02),
            min_separation: Period::new_const(3),
        }
    }
}

impl PatternDetector for DoubleBottomDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::DoubleBottom
    }

    fn detect(&self, prices: &[f64], _volumes: &[u64]) -> Option<ChartPattern> {
        if prices.len() < self.min_points() {
            return None;
        }
        let trough = min_of(prices)?;
        let visits = indices_near(prices, trough, self.trough_tolerance.get());
        two_visits(self.kind(), &visits, self.min_separation.get(), prices.len())
    }
}

fn two_visits(
    kind: PatternKind,
    visits: &[usize],
    min_separation: usize,
    len: usize,
) -> Option<ChartPattern> {
    let (&first, &second) = (visits.first()?, visits.get(1)?);
    if second - first <= min_separation {
        return None;
    }
    let (start, end) = padded_span(first, second, min_separation, len);
    Some(ChartPattern::new(kind, start, end))
}

// ============================================================
// PARAMETERS
// ============================================================

static HEAD_AND_SHOULDERS_PARAMS: &[ParamMeta] = &[
    ParamMeta {
        name: "window",
        param_type: ParamType::Period,
        default: 5.0,
        range: (3.0, 8.0, 1.0),
        description: "Width of each shoulder/head scan window",
    },
    ParamMeta {
        name: "shoulder_tolerance",
        param_type: ParamType::Ratio,
        default: 0.05,
        range: (0.01, 0.1, 0.01),
        description: "Maximum relative difference between the shoulders",
    },
];

static DOUBLE_TOP_PARAMS: &[ParamMeta] = &[
    ParamMeta {
        name: "peak_tolerance",
        param_type: ParamType::Ratio,
        default: 0.02,
        range: (0.005, 0.05, 0.005),
        description: "Maximum relative distance from the global maximum",
    },
    ParamMeta {
        name: "min_separation",
        param_type: ParamType::Period,
        default: 3.0,
        range: (2.0, 10.0, 1.0),
        description: "Points the two peaks must be apart (exclusive)",
    },
];

static DOUBLE_BOTTOM_PARAMS: &[ParamMeta] = &[
    ParamMeta {
        name: "trough_tolerance",
        param_type: ParamType::Ratio,
        default: 0.02,
        range: (0.005, 0.05, 0.005),
        description: "Maximum relative distance from the global minimum",
    },
    ParamMeta {
        name: "min_separation",
        param_type: ParamType::Period,
        default: 3.0,
        range: (2.0, 10.0, 1.0),
        description: "Points the two troughs must be apart (exclusive)",
    },
];

impl ParameterizedDetector for HeadAndShouldersDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HEAD_AND_SHOULDERS_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            window: get_period(params, "window", 5)?,
            shoulder_tolerance: get_ratio(params, "shoulder_tolerance", 0.05)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::HeadAndShoulders
    }
}

impl ParameterizedDetector for DoubleTopDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_TOP_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            peak_tolerance: get_ratio(params, "peak_tolerance", 0.02)?,
            min_separation: get_period(params, "min_separation", 3)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::DoubleTop
    }
}

impl ParameterizedDetector for DoubleBottomDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_BOTTOM_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            trough_tolerance: get_ratio(params, "trough_tolerance", 0.02)?,
            min_separation: get_period(params, "min_separation", 3)?,
        })
    }

    fn pattern_kind() -> PatternKind {
        PatternKind::DoubleBottom
    }
}
