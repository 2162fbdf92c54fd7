//! CSV ingest and cleaning.
//!
//! This module is responsible for turning the detector CSV exports into a clean
//! list of SI-unit `Measurement`s that are safe to fit.
//!
//! Input layout (per file): one header row, then `time (h), activity (TBq),
//! uncertainty (TBq)`. Files are concatenated in the order given.
//!
//! Design goals:
//! - **Row-level validation**: a row with any missing field is skipped, never fatal
//! - **Unit conversion on kept rows only** (hours → s, TBq → Bq)
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{BECQUERELS_PER_TERABECQUEREL, Measurement, SECONDS_PER_HOUR};
use crate::error::{AppError, EXIT_NO_DATA};

/// Number of numeric columns every row must provide.
pub const COLUMN_COUNT: usize = 3;

const COLUMN_NAMES: [&str; COLUMN_COUNT] = ["time", "activity", "uncertainty"];

/// A row that was skipped during ingest.
#[derive(Debug, Clone)]
pub struct DiscardedRow {
    pub source: String,
    pub line: usize,
    pub reason: String,
}

/// Ingest output: cleaned measurements + what was skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub measurements: Vec<Measurement>,
    pub discarded: Vec<DiscardedRow>,
    pub rows_read: usize,
    pub sources: Vec<String>,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.measurements.len()
    }
}

/// Load, concatenate and clean every file in `paths`.
pub fn load_measurements(paths: &[PathBuf]) -> Result<IngestedData, AppError> {
    if paths.is_empty() {
        return Err(AppError::usage("No data files given."));
    }

    let mut data = IngestedData::default();
    for path in paths {
        let file = File::open(path)
            .map_err(|e| AppError::usage(format!("Failed to open CSV '{}': {e}", path.display())))?;
        ingest_reader(file, &display_name(path), &mut data)?;
    }

    if data.measurements.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!(
                "No valid rows remain after cleaning ({} read, {} discarded).",
                data.rows_read,
                data.discarded.len()
            ),
        ));
    }

    log::info!(
        "ingest: {} rows read from {} file(s), {} kept, {} discarded",
        data.rows_read,
        data.sources.len(),
        data.rows_used(),
        data.discarded.len()
    );

    Ok(data)
}

/// Append the rows of one CSV stream to `data`.
pub fn ingest_reader<R: Read>(reader: R, source: &str, data: &mut IngestedData) -> Result<(), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Force the header row to be consumed so a missing header is a clear error.
    reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV header of '{source}': {e}")))?;

    data.sources.push(source.to_string());

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        data.rows_read += 1;

        let outcome = match result {
            Ok(record) => clean_record(&record),
            Err(e) => Err(format!("CSV parse error: {e}")),
        };

        match outcome {
            Ok(m) => data.measurements.push(m),
            Err(reason) => {
                log::debug!("{source}:{line}: discarded ({reason})");
                data.discarded.push(DiscardedRow {
                    source: source.to_string(),
                    line,
                    reason,
                });
            }
        }
    }

    Ok(())
}

/// Parse one row; any missing field rejects the whole row.
///
/// Units are converted only once the row is known to be complete.
fn clean_record(record: &StringRecord) -> Result<Measurement, String> {
    let mut values = [0.0; COLUMN_COUNT];
    for (i, slot) in values.iter_mut().enumerate() {
        *slot = parse_field(record.get(i)).ok_or_else(|| format!("missing {}", COLUMN_NAMES[i]))?;
    }

    let [hours, activity_tbq, uncertainty_tbq] = values;
    Ok(Measurement::new(
        hours * SECONDS_PER_HOUR,
        activity_tbq * BECQUERELS_PER_TERABECQUEREL,
        uncertainty_tbq * BECQUERELS_PER_TERABECQUEREL,
    ))
}

/// A field counts as present only if it parses to a finite number.
fn parse_field(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim().trim_start_matches('\u{feff}');
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}
