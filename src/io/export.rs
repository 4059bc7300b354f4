//! Exports: peak tables and titration sheets.
//!
//! The peak export is meant to be easy to consume in spreadsheets or downstream
//! scripts. The sheet writer produces the same layout `ingest` reads, so
//! synthetic titrations can be fed straight back into `pks calc`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Peak, SampleSheet};
use crate::error::AppError;

/// Write peaks to a CSV file.
pub fn write_peaks_csv(path: &Path, peaks: &[Peak]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create peaks CSV '{}': {e}", path.display())))?;

    writeln!(file, "peak,first_point,point_count,concentration,mean,interval")
        .map_err(|e| AppError::new(2, format!("Failed to write peaks CSV header: {e}")))?;

    for (i, p) in peaks.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{:.10e},{:.6},{:.6}",
            i + 1,
            p.first_point,
            p.point_count,
            p.concentration,
            p.mean,
            p.interval,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write peaks CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a titration sheet in the ingest layout.
pub fn write_titration_sheet(path: &Path, sheet: &SampleSheet) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sheet '{}': {e}", path.display())))?;

    let info = &sheet.info;
    let metadata = [
        info.name.clone().unwrap_or_default(),
        info.comment.clone().unwrap_or_default(),
        info.timestamp.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        info.volume.to_string(),
        info.titrant.constant().to_string(),
    ];
    for value in &metadata {
        // Pad to two columns so empty cells survive as a record.
        writer
            .write_record([value.as_str(), ""])
            .map_err(|e| AppError::new(2, format!("Failed to write sheet metadata: {e}")))?;
    }

    for p in &sheet.rows {
        writer
            .write_record([p.abscissa.to_string(), p.ph.to_string()])
            .map_err(|e| AppError::new(2, format!("Failed to write sheet row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sheet '{}': {e}", path.display())))?;
    Ok(())
}
