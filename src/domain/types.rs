//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to CSV/JSON
//! - handed between the pipeline and the report/plot layers

use std::path::PathBuf;

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// Avogadro constant (mol⁻¹).
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Sr-79 nuclei present at `t = 0` (one micromole).
pub const INITIAL_STRONTIUM_NUCLEI: f64 = AVOGADRO * 1e-6;

/// Starting guess for the Sr-79 decay constant (s⁻¹).
pub const INITIAL_STRONTIUM_DECAY_CONSTANT: f64 = 0.005;

/// Starting guess for the Rb-79 decay constant (s⁻¹).
pub const INITIAL_RUBIDIUM_DECAY_CONSTANT: f64 = 0.0005;

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const BECQUERELS_PER_TERABECQUEREL: f64 = 1e12;

/// Standard gravity used by the bounce calculator (m/s²).
pub const GRAVITATIONAL_ACCELERATION: f64 = 9.807;

/// Input files read when no `--data` flag is given.
pub const DEFAULT_DATA_FILES: [&str; 2] = ["Nuclear_data_1.csv", "Nuclear_data_2.csv"];

pub const DEFAULT_PLOT_PATH: &str = "Rubidium-79 Activity Curve.svg";
pub const DEFAULT_EXPORT_PATH: &str = "final_data.csv";

/// One detector reading.
///
/// After ingest all values are SI: seconds and becquerels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub time: f64,
    pub activity: f64,
    pub activity_uncertainty: f64,
}

impl Measurement {
    pub fn new(time: f64, activity: f64, activity_uncertainty: f64) -> Self {
        Self {
            time,
            activity,
            activity_uncertainty,
        }
    }
}

/// Decay constants of the parent (Sr-79) and daughter (Rb-79), in s⁻¹.
///
/// Parameter order everywhere (vectors, covariance rows) is `[strontium, rubidium]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConstants {
    pub strontium: f64,
    pub rubidium: f64,
}

impl DecayConstants {
    pub fn new(strontium: f64, rubidium: f64) -> Self {
        Self { strontium, rubidium }
    }

    /// Fixed starting point of every fit.
    pub fn initial_guess() -> Self {
        Self::new(INITIAL_STRONTIUM_DECAY_CONSTANT, INITIAL_RUBIDIUM_DECAY_CONSTANT)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.strontium, self.rubidium]
    }

    pub fn from_array(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }

    pub fn is_finite(&self) -> bool {
        self.strontium.is_finite() && self.rubidium.is_finite()
    }
}

/// How residuals are scaled in the least-squares objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Every point counts equally; the covariance is rescaled by the
    /// residual variance (relative sigma).
    Unweighted,
    /// Residuals are divided by each point's uncertainty; the covariance is
    /// taken as-is (absolute sigma).
    Uncertainty,
}

/// Output of one nonlinear least-squares fit.
#[derive(Debug, Clone)]
pub struct DecayFit {
    pub constants: DecayConstants,
    /// Parameter covariance, order `[strontium, rubidium]`.
    pub covariance: Matrix2<f64>,
    pub weighting: Weighting,
    /// Sum of squared (weighted) residuals at the optimum.
    pub cost: f64,
    pub iterations: usize,
    pub n: usize,
}

impl DecayFit {
    pub fn strontium_std(&self) -> f64 {
        self.covariance[(0, 0)].sqrt()
    }

    pub fn rubidium_std(&self) -> f64 {
        self.covariance[(1, 1)].sqrt()
    }
}

/// A half-life and its propagated uncertainty, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfLife {
    pub seconds: f64,
    pub uncertainty_seconds: f64,
}

impl HalfLife {
    pub fn minutes(&self) -> f64 {
        self.seconds / SECONDS_PER_MINUTE
    }

    pub fn uncertainty_minutes(&self) -> f64 {
        self.uncertainty_seconds / SECONDS_PER_MINUTE
    }
}

/// What to do about the optional CSV export of the final dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Ask on stdin (`yes` saves, anything else does not).
    Ask,
    Yes,
    No,
}

/// A decay run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DecayConfig {
    pub data_files: Vec<PathBuf>,

    /// SVG output path; `None` disables the image.
    pub plot_path: Option<PathBuf>,
    pub ascii_plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Number of samples of the fitted curve drawn in the SVG.
    pub curve_points: usize,

    pub export_path: PathBuf,
    pub save: SaveMode,
    pub summary_json: Option<PathBuf>,

    /// Points further than this many uncertainties from the first fit are dropped.
    pub sigma_threshold: f64,
    /// Time (s) at which the fitted activity is reported.
    pub report_time: f64,
    pub max_iterations: usize,
}

/// Settings for synthetic dataset generation.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub output_dir: PathBuf,
    /// Rows per generated file (two files are written).
    pub points: usize,
    pub seed: u64,
    pub truth: DecayConstants,
    /// Relative 1-sigma noise on the activity.
    pub noise: f64,
    pub outlier_prob: f64,
    pub missing_prob: f64,
    /// Measurement window end (hours); readings are evenly spaced up to it.
    pub max_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_life_minutes_conversion() {
        let h = HalfLife {
            seconds: 1200.0,
            uncertainty_seconds: 30.0,
        };
        assert!((h.minutes() - 20.0).abs() < 1e-12);
        assert!((h.uncertainty_minutes() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn decay_constants_array_order() {
        let c = DecayConstants::initial_guess();
        assert_eq!(c.to_array(), [0.005, 0.0005]);
        assert_eq!(DecayConstants::from_array(c.to_array()), c);
    }
}
