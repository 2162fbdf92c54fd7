//! Fit summary JSON files.
//!
//! The summary is the "portable" record of a decay run:
//! - fitted constants, their covariance and half-lives
//! - goodness of fit and row accounting
//! - the activity reported at the configured time

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::DecayRun;
use crate::domain::{BECQUERELS_PER_TERABECQUEREL, DecayConfig, HalfLife};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsotopeSummary {
    pub decay_constant: f64,
    pub decay_constant_std: f64,
    pub half_life: HalfLife,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowCounts {
    pub read: usize,
    pub discarded: usize,
    pub rejected_outliers: usize,
    pub used: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<String>,
    pub strontium: IsotopeSummary,
    pub rubidium: IsotopeSummary,
    /// Order `[strontium, rubidium]`, units s⁻².
    pub covariance: [[f64; 2]; 2],
    pub reduced_chi_squared: f64,
    pub iterations: usize,
    pub rows: RowCounts,
    pub report_time_s: f64,
    pub report_activity_tbq: f64,
}

impl FitSummary {
    pub fn from_run(run: &DecayRun, config: &DecayConfig) -> Self {
        let fit = &run.final_fit;
        let c = &fit.covariance;
        Self {
            tool: "physfit".to_string(),
            generated_at: Utc::now(),
            sources: run.ingest.sources.clone(),
            strontium: IsotopeSummary {
                decay_constant: fit.constants.strontium,
                decay_constant_std: fit.strontium_std(),
                half_life: run.half_lives.strontium,
            },
            rubidium: IsotopeSummary {
                decay_constant: fit.constants.rubidium,
                decay_constant_std: fit.rubidium_std(),
                half_life: run.half_lives.rubidium,
            },
            covariance: [[c[(0, 0)], c[(0, 1)]], [c[(1, 0)], c[(1, 1)]]],
            reduced_chi_squared: run.reduced_chi_squared,
            iterations: fit.iterations,
            rows: RowCounts {
                read: run.ingest.rows_read,
                discarded: run.ingest.discarded.len(),
                rejected_outliers: run.split.rejected.len(),
                used: run.split.kept.len(),
            },
            report_time_s: config.report_time,
            report_activity_tbq: run.report_activity / BECQUERELS_PER_TERABECQUEREL,
        }
    }
}

/// Write a fit summary JSON file.
pub fn write_summary_json(path: &Path, summary: &FitSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::usage(format!("Failed to write summary JSON: {e}")))?;
    log::info!("summary: wrote {}", path.display());
    Ok(())
}
