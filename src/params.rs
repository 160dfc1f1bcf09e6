//! Parameter metadata for pattern detectors
//!
//! This module provides metadata about detector thresholds, enabling:
//! - Grid search over tolerances
//! - Parameter documentation
//! - Configuring detectors from plain key/value maps
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use chart_patterns::prelude::*;
//!
//! for param in DoubleTopDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let params = HashMap::from([("peak_tolerance", 0.01)]);
//! let detector = DoubleTopDetector::from_checked_params(&params).unwrap();
//! assert_eq!(detector.peak_tolerance.get(), 0.01);
//! ```

use std::collections::HashMap;

use crate::{PatternError, PatternKind, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period value (positive integer)
  Period,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "shoulder_tolerance")
  pub name: &'static str,
  /// Parameter type (Ratio or Period)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Period parameter
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ok(()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
///
/// Implementing this trait enables:
/// - Discovery of available parameters
/// - Creation of detectors with custom parameter values
/// - Grid search optimization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the pattern this detector reports
  fn pattern_kind() -> PatternKind;

  /// Like [`with_params`](Self::with_params), but rejects unknown keys and
  /// values outside each parameter's documented range.
  fn from_checked_params(params: &HashMap<&str, f64>) -> Result<Self> {
    let meta = Self::param_meta();
    for (&key, &value) in params {
      let param = meta.iter().find(|m| m.name == key).ok_or_else(|| {
        PatternError::InvalidConfig(format!("{} has no parameter {key}", Self::pattern_kind()))
      })?;
      param.validate(value)?;
    }
    Self::with_params(params)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value < 0.0 || value.fract() != 0.0 {
    return Err(PatternError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;
  use crate::detectors::{DoubleTopDetector, HeadAndShouldersDetector, RisingWedgeDetector};

  #[test]
  fn test_param_meta_ratio() {
    let meta = ParamMeta::ratio("test_ratio", 0.5, (0.3, 0.7, 0.1), "Test ratio parameter");

    assert_eq!(meta.name, "test_ratio");
    assert_eq!(meta.param_type, ParamType::Ratio);
    assert_eq!(meta.default, 0.5);
  }

  #[test]
  fn test_param_meta_period() {
    let meta = ParamMeta::period("test_period", 5.0, (3.0, 8.0, 1.0), "Test period parameter");

    assert_eq!(meta.name, "test_period");
    assert_eq!(meta.param_type, ParamType::Period);
    assert_eq!(meta.default, 5.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 0.3).abs() < f64::EPSILON);
    assert!((grid[1] - 0.5).abs() < f64::EPSILON);
    assert!((grid[2] - 0.7).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 5.0, (3.0, 8.0, 1.0), "Test");

    assert!(meta.validate(5.0).is_ok());
    assert!(meta.validate(3.0).is_ok());
    assert!(meta.validate(4.5).is_err());
    assert!(meta.validate(9.0).is_err());
  }

  #[test]
  fn test_get_ratio_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 0.8);

    assert!((get_ratio(&params, "key1", 0.5).unwrap().get() - 0.8).abs() < f64::EPSILON);
    assert!((get_ratio(&params, "key2", 0.5).unwrap().get() - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_get_period_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 7.0);
    params.insert("bad", 2.5);

    assert_eq!(get_period(&params, "key1", 5).unwrap().get(), 7);
    assert_eq!(get_period(&params, "key2", 5).unwrap().get(), 5);
    assert!(get_period(&params, "bad", 5).is_err());
  }

  #[test]
  fn test_defaults_match_param_meta() {
    let hs = HeadAndShouldersDetector::with_params(&HashMap::new()).unwrap();
    assert_eq!(hs.window.get() as f64, HeadAndShouldersDetector::param_meta()[0].default);
    assert_eq!(hs.shoulder_tolerance.get(), HeadAndShouldersDetector::param_meta()[1].default);

    let wedge = RisingWedgeDetector::with_params(&HashMap::new()).unwrap();
    assert_eq!(wedge.max_range_ratio.get(), RisingWedgeDetector::param_meta()[0].default);
  }

  #[test]
  fn test_checked_params_reject_unknown_and_out_of_range() {
    let unknown = HashMap::from([("tolerance", 0.02)]);
    assert!(matches!(
      DoubleTopDetector::from_checked_params(&unknown),
      Err(PatternError::InvalidConfig(_))
    ));

    let too_loose = HashMap::from([("peak_tolerance", 0.2)]);
    assert!(matches!(
      DoubleTopDetector::from_checked_params(&too_loose),
      Err(PatternError::OutOfRange { field: "peak_tolerance", .. })
    ));

    let ok = HashMap::from([("min_separation", 5.0)]);
    assert_eq!(DoubleTopDetector::from_checked_params(&ok).unwrap().min_separation.get(), 5);
  }
}
