//! Export the final (filtered) dataset to CSV.
//!
//! Output is three comma-separated columns in SI units (`s, Bq, Bq`) with no
//! header row, so the file can be loaded back as a plain numeric table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Measurement;
use crate::error::AppError;

/// Write `data` to `path`.
pub fn write_measurements_csv(path: &Path, data: &[Measurement]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_measurements(file, data)?;
    log::info!("export: wrote {} rows to {}", data.len(), path.display());
    Ok(())
}

/// Write `data` as headerless CSV rows to any writer.
pub fn write_measurements<W: Write>(writer: W, data: &[Measurement]) -> Result<(), AppError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for m in data {
        csv.serialize(m)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }
    csv.flush()
        .map_err(|e| AppError::usage(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
