//! Synthetic detector datasets generated from the decay-chain model.
//!
//! Rows are written in the raw instrument format (hours, TBq) so the files go
//! through the same ingest path as real measurements. The generator injects the
//! defects the pipeline is built to survive:
//! - Gaussian relative noise, reported as the row's uncertainty
//! - gross outliers at ±10σ
//! - randomly blanked fields (`nan`)

use std::fs::create_dir_all;
use std::path::PathBuf;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    BECQUERELS_PER_TERABECQUEREL, DEFAULT_DATA_FILES, SECONDS_PER_HOUR, SimulateConfig,
};
use crate::error::AppError;
use crate::models::rubidium_activity;

/// Outlier displacement in units of the row's uncertainty.
const OUTLIER_SIGMAS: f64 = 10.0;

const HEADER: [&str; 3] = ["time_hours", "activity_TBq", "uncertainty_TBq"];

/// One raw row; `None` marks a blanked field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRow {
    pub fields: [Option<f64>; 3],
    pub is_outlier: bool,
}

/// Two raw tables, in the order of `DEFAULT_DATA_FILES`.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub files: [Vec<RawRow>; 2],
}

impl SampleData {
    pub fn rows(&self) -> impl Iterator<Item = &RawRow> {
        self.files.iter().flat_map(|f| f.iter())
    }
}

pub fn generate_sample(config: &SimulateConfig) -> Result<SampleData, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    let total = config.points * 2;
    let mut files: [Vec<RawRow>; 2] = [Vec::with_capacity(config.points), Vec::with_capacity(config.points)];

    for i in 0..total {
        let hours = (i + 1) as f64 * config.max_hours / total as f64;
        let a_true = rubidium_activity(hours * SECONDS_PER_HOUR, &config.truth);
        let sigma = config.noise * a_true;

        let mut activity = a_true + sigma * normal.sample(&mut rng);
        let is_outlier = rng.gen_bool(config.outlier_prob);
        if is_outlier {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            activity += sign * OUTLIER_SIGMAS * sigma;
        }

        let mut fields = [
            Some(hours),
            Some(activity / BECQUERELS_PER_TERABECQUEREL),
            Some(sigma / BECQUERELS_PER_TERABECQUEREL),
        ];
        if rng.gen_bool(config.missing_prob) {
            fields[rng.gen_range(0..fields.len())] = None;
        }

        // Alternate rows between the two files so both span the full window.
        files[i % 2].push(RawRow { fields, is_outlier });
    }

    Ok(SampleData { files })
}

/// Generate and write both files into `config.output_dir`.
pub fn write_sample(config: &SimulateConfig) -> Result<Vec<PathBuf>, AppError> {
    let sample = generate_sample(config)?;
    create_dir_all(&config.output_dir).map_err(|e| {
        AppError::usage(format!(
            "Failed to create output dir '{}': {e}",
            config.output_dir.display()
        ))
    })?;

    let mut written = Vec::with_capacity(DEFAULT_DATA_FILES.len());
    for (name, rows) in DEFAULT_DATA_FILES.iter().zip(sample.files.iter()) {
        let path = config.output_dir.join(name);
        let mut csv = csv::Writer::from_path(&path)
            .map_err(|e| AppError::usage(format!("Failed to create '{}': {e}", path.display())))?;
        csv.write_record(HEADER)
            .map_err(|e| AppError::usage(format!("Failed to write header: {e}")))?;
        for row in rows {
            let record = row.fields.map(|f| match f {
                Some(v) => format!("{v}"),
                None => "nan".to_string(),
            });
            csv.write_record(&record)
                .map_err(|e| AppError::usage(format!("Failed to write row: {e}")))?;
        }
        csv.flush()
            .map_err(|e| AppError::usage(format!("Failed to flush '{}': {e}", path.display())))?;
        log::info!("simulate: wrote {} rows to {}", rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

fn validate(config: &SimulateConfig) -> Result<(), AppError> {
    if config.points == 0 {
        return Err(AppError::usage("Point count must be > 0."));
    }
    let t = &config.truth;
    if !(t.strontium.is_finite() && t.rubidium.is_finite() && t.strontium > 0.0 && t.rubidium > 0.0) {
        return Err(AppError::usage("True decay constants must be positive."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::usage("Noise must be a non-negative fraction."));
    }
    for (name, p) in [("outlier", config.outlier_prob), ("missing", config.missing_prob)] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::usage(format!("{name} probability must be in [0, 1).")));
        }
    }
    if !(config.max_hours.is_finite() && config.max_hours > 0.0) {
        return Err(AppError::usage("Measurement window must be > 0 hours."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DecayConstants;

    fn config(dir: PathBuf) -> SimulateConfig {
        SimulateConfig {
            output_dir: dir,
            points: 50,
            seed: 7,
            truth: DecayConstants::new(0.0048, 0.00052),
            noise: 0.04,
            outlier_prob: 0.05,
            missing_prob: 0.05,
            max_hours: 3.0,
        }
    }

    #[test]
    fn same_seed_same_sample() {
        let cfg = config(PathBuf::from("."));
        let a = generate_sample(&cfg).unwrap();
        let b = generate_sample(&cfg).unwrap();
        assert_eq!(a.files, b.files);
    }

    #[test]
    fn rows_alternate_between_files() {
        let sample = generate_sample(&config(PathBuf::from("."))).unwrap();
        assert_eq!(sample.files[0].len(), 50);
        assert_eq!(sample.files[1].len(), 50);
        assert_eq!(sample.rows().count(), 100);
    }

    #[test]
    fn noiseless_sample_lies_on_the_model() {
        let mut cfg = config(PathBuf::from("."));
        cfg.noise = 0.0;
        cfg.outlier_prob = 0.0;
        cfg.missing_prob = 0.0;
        let sample = generate_sample(&cfg).unwrap();
        for row in sample.rows() {
            let [Some(h), Some(a), Some(_)] = row.fields else {
                panic!("unexpected blank field");
            };
            let expected = rubidium_activity(h * SECONDS_PER_HOUR, &cfg.truth) / BECQUERELS_PER_TERABECQUEREL;
            assert!((a - expected).abs() <= 1e-12 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn rejects_invalid_probabilities() {
        let mut cfg = config(PathBuf::from("."));
        cfg.outlier_prob = 1.0;
        assert!(generate_sample(&cfg).is_err());
    }

    #[test]
    fn write_sample_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path().join("out"));
        let paths = write_sample(&cfg).unwrap();
        assert_eq!(paths.len(), 2);
        for p in &paths {
            let text = std::fs::read_to_string(p).unwrap();
            assert!(text.starts_with("time_hours,activity_TBq,uncertainty_TBq"));
            assert_eq!(text.lines().count(), 51);
        }
    }
}
