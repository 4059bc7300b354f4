//! Unconstrained least squares.
//!
//! The NNLS solver repeatedly solves
//!
//! ```text
//! minimize ||A_P s - b||_2
//! ```
//!
//! where `A_P` holds only the currently passive columns of the design matrix.
//!
//! Implementation choices:
//! - SVD handles tall and wide systems alike. (Nalgebra's `QR::solve` is
//!   intended for square systems and will panic for non-square matrices.)
//! - The logistic kernel columns are strongly collinear, so singular values are
//!   cut relative to the largest one rather than at an absolute level.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }
    let base = sigma_max * f64::EPSILON * x.nrows().max(x.ncols()) as f64;

    // Try progressively looser cut-offs if the strict solve is not finite.
    for &scale in &[1.0, 1e2, 1e4] {
        if let Ok(beta) = svd.solve(y, base * scale) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_rejects_empty_or_mismatched() {
        let x = DMatrix::<f64>::zeros(3, 0);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());

        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
