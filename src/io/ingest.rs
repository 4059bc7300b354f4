//! Titration sheet ingest.
//!
//! Sheets are exported from the lab spreadsheet as headerless CSV with the layout:
//!
//! ```text
//! row 1   sample name
//! row 2   comment
//! row 3   timestamp
//! row 4   sample volume
//! row 5   titrant concentration (volumetric) or current (coulometric)
//! row 6+  abscissa, pH
//! ```
//!
//! Metadata lives in the first column. Data rows are read until the first row
//! where either cell is missing or not a number; everything after it is ignored.
//! No sorting or charge-balance checks happen here.
//!
//! Spreadsheet exports pad every row to the widest column, so an empty metadata
//! cell arrives as `,`. Fully blank lines are skipped by the CSV reader and would
//! shift the metadata rows.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info};

use crate::domain::{SampleInfo, SampleSheet, SampleTimestamp, Titrant, TitrationMode, TitrationPoint};
use crate::error::AppError;

/// Number of metadata rows before the data block.
pub const METADATA_ROWS: usize = 5;

/// Ingest output: the sheet plus bookkeeping for the report.
#[derive(Debug, Clone)]
pub struct IngestedSheet {
    pub sheet: SampleSheet,
    /// Data rows accepted.
    pub rows_read: usize,
    /// 1-based line of the row that ended the data block, if any.
    pub stopped_at: Option<usize>,
}

/// Load a titration sheet from CSV.
pub fn load_titration_sheet(path: &Path, mode: TitrationMode) -> Result<IngestedSheet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open sheet '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = reader.records();
    let mut metadata = Vec::with_capacity(METADATA_ROWS);
    for line in 1..=METADATA_ROWS {
        match records.next() {
            Some(Ok(record)) => metadata.push(record),
            Some(Err(e)) => {
                return Err(AppError::new(2, format!("CSV parse error on line {line}: {e}")));
            }
            None => {
                return Err(AppError::new(
                    2,
                    format!(
                        "Sheet '{}' has only {} row(s); expected {METADATA_ROWS} metadata rows.",
                        path.display(),
                        line - 1
                    ),
                ));
            }
        }
    }

    let info = parse_metadata(&metadata, mode)?;

    let mut rows = Vec::new();
    let mut stopped_at = None;
    for (idx, result) in records.enumerate() {
        let line = METADATA_ROWS + idx + 1;
        let point = result
            .ok()
            .and_then(|record| parse_data_row(&record));
        match point {
            Some(p) => rows.push(p),
            None => {
                debug!("Data block ends at line {line}.");
                stopped_at = Some(line);
                break;
            }
        }
    }

    info!(
        "Loaded {} {} rows from '{}'",
        rows.len(),
        mode.display_name(),
        path.display()
    );

    Ok(IngestedSheet {
        rows_read: rows.len(),
        stopped_at,
        sheet: SampleSheet { info, rows },
    })
}

fn parse_metadata(rows: &[StringRecord], mode: TitrationMode) -> Result<SampleInfo, AppError> {
    let name = first_cell(&rows[0]).map(str::to_string);
    let comment = first_cell(&rows[1]).map(str::to_string);
    let timestamp = first_cell(&rows[2]).map(parse_timestamp);

    let volume = first_cell(&rows[3])
        .and_then(parse_number)
        .ok_or_else(|| AppError::new(2, "Row 4 must hold a numeric sample volume."))?;

    let constant_label = match mode {
        TitrationMode::Volumetric => "titrant concentration",
        TitrationMode::Coulometric => "current",
    };
    let constant = first_cell(&rows[4])
        .and_then(parse_number)
        .ok_or_else(|| AppError::new(2, format!("Row 5 must hold a numeric {constant_label}.")))?;

    Ok(SampleInfo {
        name,
        comment,
        timestamp,
        volume,
        titrant: Titrant::for_mode(mode, constant),
    })
}

fn parse_data_row(record: &StringRecord) -> Option<TitrationPoint> {
    let abscissa = cell(record, 0).and_then(parse_number)?;
    let ph = cell(record, 1).and_then(parse_number)?;
    Some(TitrationPoint::new(abscissa, ph))
}

fn first_cell(record: &StringRecord) -> Option<&str> {
    cell(record, 0)
}

fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    // Spreadsheet exports often start with a UTF-8 BOM.
    let s = record.get(idx)?.trim().trim_start_matches('\u{feff}');
    if s.is_empty() { None } else { Some(s) }
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_timestamp(s: &str) -> SampleTimestamp {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return SampleTimestamp::Parsed(ts.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return SampleTimestamp::Parsed(ts);
        }
    }
    if let Some(ts) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return SampleTimestamp::Parsed(ts);
    }
    SampleTimestamp::Raw(s.to_string())
}
