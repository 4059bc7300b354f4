//! Fit error from the solver residual.

use crate::error::SpectrumError;

/// `sqrt(residual) / sqrt(pk_step - 1)`.
///
/// `residual` is the residual norm reported by the NNLS solve.
pub fn fit_error(residual: f64, pk_step: usize) -> Result<f64, SpectrumError> {
    if pk_step <= 1 {
        return Err(SpectrumError::DegreesOfFreedom { pk_step });
    }
    Ok(residual.sqrt() / ((pk_step - 1) as f64).sqrt())
}
