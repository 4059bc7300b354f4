//! Spectrum solver.
//!
//! Given the usable prefix of a titration (`pH_i`, `alpha_i`) and a pK grid, we:
//!
//! 1. build the design matrix `right[i, j] = d_pk / (1 + 10^(pK_j - pH_i))`
//!    (plus a `+1` / `-1` column pair when the integration constant is enabled)
//! 2. solve `min ||right x - alpha||` with `x >= 0`
//! 3. drop the offset columns, scale by `d_pk`, and clear isolated border spikes
//! 4. extract peaks and the fit error
//!
//! The integration constant is a signed offset, which an NNLS solve cannot
//! represent directly; it is fitted as the difference of two non-negative unknowns.
//!
//! Note that `d_pk` enters twice: once as the bin width inside the kernel and
//! once when scaling the solution. With both factors the reported value of a
//! bin is the concentration of a site whose pK sits on that bin.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::data::TitrationDataset;
use crate::domain::{Calculation, PhysicalConstants, Spectrum, SpectrumGrid};
use crate::error::SpectrumError;
use crate::fit::{extract_peaks, fit_error};
use crate::math::{kernel, nnls};

/// Fewer usable points than this and the regression is declared unreliable.
pub const MIN_VALID_POINTS: usize = 7;

/// Number of trailing unknowns used for the integration constant.
const OFFSET_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectrumSolver {
    constants: PhysicalConstants,
}

impl SpectrumSolver {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    /// Solve the pK spectrum of `dataset` on `grid`.
    ///
    /// The grid is validated first; a degenerate grid is an error regardless of
    /// the data. Too few usable points yields `Calculation::Insufficient`.
    pub fn solve(&self, dataset: &TitrationDataset, grid: &SpectrumGrid) -> Result<Calculation, SpectrumError> {
        grid.validate()?;

        let valid_points = dataset.valid_points();
        if valid_points < MIN_VALID_POINTS {
            debug!("Only {valid_points} usable points (< {MIN_VALID_POINTS}); skipping the solve.");
            return Ok(Calculation::Insufficient { valid_points });
        }

        let pk_step = grid.pk_step();
        let right = assemble_design_matrix(&dataset.valid_ph(), grid);
        let alpha = DVector::from_column_slice(dataset.alpha_values());
        debug!(
            "Design matrix {}x{} (pk_step={pk_step}, integration constant: {})",
            right.nrows(),
            right.ncols(),
            grid.use_integration_constant
        );

        let solution = nnls(&right, &alpha);
        if !solution.converged {
            warn!(
                "NNLS did not fully converge after {} iterations; using the last feasible iterate.",
                solution.iterations
            );
        } else {
            debug!("NNLS converged in {} iterations, residual {:.3e}", solution.iterations, solution.residual);
        }

        let spectrum = finish_spectrum(&solution.x, solution.residual, grid, self.constants.tolerance);
        let peaks = extract_peaks(&spectrum.values, grid);
        let error = fit_error(spectrum.residual, pk_step)?;

        Ok(Calculation::Solved {
            spectrum,
            peaks,
            error,
        })
    }
}

/// Build the `len(ph) x shape1` design matrix.
///
/// Rows are independent, so they are evaluated in parallel; the result does not
/// depend on scheduling.
pub fn assemble_design_matrix(ph: &[f64], grid: &SpectrumGrid) -> DMatrix<f64> {
    let pk_step = grid.pk_step();
    let shape1 = if grid.use_integration_constant {
        pk_step + OFFSET_COLUMNS
    } else {
        pk_step
    };

    let rows: Vec<Vec<f64>> = ph
        .par_iter()
        .map(|&ph_i| {
            let mut row = vec![0.0; shape1];
            for (j, entry) in row.iter_mut().take(pk_step).enumerate() {
                *entry = kernel(grid.pk_center(j), ph_i, grid.d_pk);
            }
            if grid.use_integration_constant {
                row[pk_step] = 1.0;
                row[pk_step + 1] = -1.0;
            }
            row
        })
        .collect();

    DMatrix::from_fn(ph.len(), shape1, |i, j| rows[i][j])
}

/// Turn the raw NNLS solution into a reported spectrum.
pub fn finish_spectrum(x: &DVector<f64>, residual: f64, grid: &SpectrumGrid, tolerance: f64) -> Spectrum {
    let pk_step = grid.pk_step();

    let offset = if grid.use_integration_constant && x.len() >= pk_step + OFFSET_COLUMNS {
        Some(x[pk_step] - x[pk_step + 1])
    } else {
        None
    };

    let mut values: Vec<f64> = x.iter().take(pk_step).map(|v| v * grid.d_pk).collect();
    let cleared = suppress_border_artifacts(&mut values, tolerance);
    if cleared > 0 {
        debug!("Cleared {cleared} isolated border bin(s).");
    }

    Spectrum {
        values,
        residual,
        offset,
    }
}

/// Zero an edge bin above `tolerance` whose inner neighbour is at or below it.
///
/// Returns how many bins were cleared (0, 1 or 2).
pub fn suppress_border_artifacts(values: &mut [f64], tolerance: f64) -> usize {
    let n = values.len();
    if n < 2 {
        return 0;
    }

    let mut cleared = 0;
    if values[0] > tolerance && values[1] <= tolerance {
        values[0] = 0.0;
        cleared += 1;
    }
    if values[n - 1] > tolerance && values[n - 2] <= tolerance {
        values[n - 1] = 0.0;
        cleared += 1;
    }
    cleared
}
