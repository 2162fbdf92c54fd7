//! Shared decay pipeline used by the `decay` command.
//!
//! Keeping the workflow in one place means the command handler only deals
//! with presentation (printing, plotting, prompting):
//! ingest -> unweighted fit -> outlier rejection -> weighted refit -> statistics

use crate::domain::{DecayConfig, DecayFit, Weighting};
use crate::error::AppError;
use crate::fit::{FitOptions, HalfLives, OutlierSplit, fit_decay, fit_reduced_chi_squared, half_lives, reject_outliers};
use crate::io::ingest::{IngestedData, load_measurements};
use crate::models::rubidium_activity;

/// All computed outputs of a single `physfit decay` run.
#[derive(Debug, Clone)]
pub struct DecayRun {
    pub ingest: IngestedData,
    /// Unweighted fit over every clean row.
    pub first_fit: DecayFit,
    pub split: OutlierSplit,
    /// Uncertainty-weighted fit over the kept rows.
    pub final_fit: DecayFit,
    pub reduced_chi_squared: f64,
    pub half_lives: HalfLives,
    /// Fitted activity (Bq) at `config.report_time`.
    pub report_activity: f64,
}

/// Load the configured files and run the full pipeline.
pub fn run_decay(config: &DecayConfig) -> Result<DecayRun, AppError> {
    let ingest = load_measurements(&config.data_files)?;
    run_decay_with_data(ingest, config)
}

/// Run the pipeline on already-ingested data.
pub fn run_decay_with_data(ingest: IngestedData, config: &DecayConfig) -> Result<DecayRun, AppError> {
    if !(config.sigma_threshold.is_finite() && config.sigma_threshold > 0.0) {
        return Err(AppError::usage("Sigma threshold must be a positive number."));
    }

    // 1) Preliminary fit, every point weighted equally.
    let first_fit = fit_decay(
        &ingest.measurements,
        &FitOptions {
            weighting: Weighting::Unweighted,
            max_iterations: config.max_iterations,
            ..FitOptions::default()
        },
    )?;
    log::info!(
        "first fit: λs={:.6e} λr={:.6e} ({} iterations)",
        first_fit.constants.strontium,
        first_fit.constants.rubidium,
        first_fit.iterations
    );

    // 2) Drop rows far from the preliminary curve.
    let split = reject_outliers(&ingest.measurements, &first_fit.constants, config.sigma_threshold);
    log::info!(
        "outliers: kept {}, rejected {} (threshold {}σ)",
        split.kept.len(),
        split.rejected.len(),
        config.sigma_threshold
    );

    // 3) Refit the survivors against their uncertainties, starting from the first fit.
    let final_fit = fit_decay(
        &split.kept,
        &FitOptions {
            weighting: Weighting::Uncertainty,
            initial: first_fit.constants,
            max_iterations: config.max_iterations,
        },
    )?;
    log::info!(
        "final fit: λs={:.6e} ± {:.2e}, λr={:.6e} ± {:.2e}",
        final_fit.constants.strontium,
        final_fit.strontium_std(),
        final_fit.constants.rubidium,
        final_fit.rubidium_std()
    );

    // 4) Statistics.
    let reduced_chi_squared = fit_reduced_chi_squared(&split.kept, &final_fit)?;
    let half_lives = half_lives(&final_fit)?;
    let report_activity = rubidium_activity(config.report_time, &final_fit.constants);
    if !report_activity.is_finite() {
        return Err(AppError::numeric("Non-finite activity at the report time."));
    }

    Ok(DecayRun {
        ingest,
        first_fit,
        split,
        final_fit,
        reduced_chi_squared,
        half_lives,
        report_activity,
    })
}
