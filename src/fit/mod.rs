//! Decay-constant fitting.
//!
//! Responsibilities:
//!
//! - nonlinear least squares for `(λs, λr)` with covariance (`fitter`)
//! - sigma-clipping against a preliminary fit (`outliers`)
//! - reduced chi-squared and half-life propagation (`analysis`)

pub mod analysis;
pub mod fitter;
pub mod outliers;

pub use analysis::*;
pub use fitter::*;
pub use outliers::*;
