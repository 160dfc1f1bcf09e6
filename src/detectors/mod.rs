//! Chart formation detectors
//!
//! Every detector is an independent heuristic over the price channel: a length
//! guard, an extremum or window scan, then a tolerance comparison.
//!
//! # Pattern Categories
//!
//! - **Reversal (3)**: Head and Shoulders, Double Top, Double Bottom
//! - **Triangles (3)**: Ascending, Descending, Symmetrical
//! - **Continuation (3)**: Bullish Flag, Bearish Flag, Cup and Handle
//! - **Wedges (2)**: Rising, Falling

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod continuation;
pub mod reversal;
pub mod triangles;
pub mod wedges;

// Re-export all detectors for convenience
pub use continuation::*;
pub use reversal::*;
pub use triangles::*;
pub use wedges::*;
