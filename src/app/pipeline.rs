//! Shared "calc pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sheet ingest -> dataset (sort + charge balance) -> spectrum solve -> peaks
//!
//! The front-end can then focus on presentation.

use log::info;

use crate::data::TitrationDataset;
use crate::domain::{CalcConfig, Calculation, PhysicalConstants, SpectrumGrid};
use crate::error::AppError;
use crate::io::ingest::{IngestedSheet, load_titration_sheet};

/// All computed outputs of a single `pks calc` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedSheet,
    pub dataset: TitrationDataset,
    pub calculation: Calculation,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_calc(config: &CalcConfig) -> Result<RunOutput, AppError> {
    // Reject a bad grid before touching the file system.
    config.grid.validate()?;

    let ingest = load_titration_sheet(&config.input, config.mode)?;
    run_calc_with_sheet(ingest, &config.grid)
}

/// Execute the pipeline on an already loaded sheet.
pub fn run_calc_with_sheet(ingest: IngestedSheet, grid: &SpectrumGrid) -> Result<RunOutput, AppError> {
    let dataset = TitrationDataset::from_sheet(ingest.sheet.clone(), PhysicalConstants::default())?;
    if dataset.points().is_empty() {
        return Err(AppError::new(3, "The sheet contains no numeric titration rows."));
    }

    let calculation = dataset.make_calculation(grid)?;
    match &calculation {
        Calculation::Insufficient { valid_points } => {
            info!("Calculation skipped: {valid_points} usable points.");
        }
        Calculation::Solved { peaks, error, .. } => {
            info!("Calculation done: {} peak(s), error {error:.3e}", peaks.len());
        }
    }

    Ok(RunOutput {
        ingest,
        dataset,
        calculation,
    })
}
