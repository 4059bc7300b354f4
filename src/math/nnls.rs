//! Non-negative least squares (Lawson–Hanson active set).
//!
//! ```text
//! minimize ||A x - b||_2   subject to   x >= 0
//! ```
//!
//! Columns move between an *active* set (pinned at zero) and a *passive* set
//! (free, solved by unconstrained least squares). Each outer iteration frees the
//! active column with the largest gradient `A^T (b - A x)`; the inner loop steps
//! back towards feasibility whenever the passive solve goes non-positive.

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Result of an NNLS solve.
#[derive(Debug, Clone)]
pub struct NnlsSolution {
    /// Non-negative solution vector.
    pub x: DVector<f64>,
    /// Residual norm `||A x - b||_2`.
    pub residual: f64,
    /// Inner iterations performed.
    pub iterations: usize,
    /// `false` if the iteration cap was hit or a passive solve failed.
    pub converged: bool,
}

/// Solve `min ||A x - b|| s.t. x >= 0`.
pub fn nnls(a: &DMatrix<f64>, b: &DVector<f64>) -> NnlsSolution {
    let (m, n) = a.shape();
    let mut x = DVector::<f64>::zeros(n);

    if m == 0 || n == 0 || b.len() != m {
        let residual = if b.len() == m { b.norm() } else { f64::NAN };
        return NnlsSolution {
            x,
            residual,
            iterations: 0,
            converged: b.len() == m,
        };
    }

    let tol = 10.0 * f64::EPSILON * column_norm_max(a) * m.max(n) as f64;
    let max_iter = 3 * n;

    let mut passive = vec![false; n];
    let mut iterations = 0usize;
    let mut converged = true;

    'outer: loop {
        let gradient = a.tr_mul(&(b - a * &x));

        // Most promising column still pinned at zero.
        let mut best: Option<usize> = None;
        for j in (0..n).filter(|&j| !passive[j]) {
            if best.is_none_or(|k| gradient[j] > gradient[k]) {
                best = Some(j);
            }
        }
        let Some(entering) = best else {
            break;
        };
        if gradient[entering] <= tol {
            break;
        }
        passive[entering] = true;

        loop {
            iterations += 1;
            if iterations > max_iter {
                warn!("NNLS hit the iteration cap ({max_iter}); returning current iterate.");
                converged = false;
                break 'outer;
            }

            let cols: Vec<usize> = (0..n).filter(|&j| passive[j]).collect();
            let a_p = a.select_columns(cols.iter());
            let Some(s) = solve_least_squares(&a_p, b) else {
                warn!("NNLS passive-set solve failed with {} free columns.", cols.len());
                passive[entering] = false;
                converged = false;
                break 'outer;
            };

            if s.iter().all(|&v| v > tol) {
                for (k, &col) in cols.iter().enumerate() {
                    x[col] = s[k];
                }
                break;
            }

            // Largest step along (s - x) that keeps every passive component >= 0.
            let mut step = 1.0_f64;
            for (k, &col) in cols.iter().enumerate() {
                if s[k] <= tol {
                    let denom = x[col] - s[k];
                    if denom > 0.0 {
                        step = step.min(x[col] / denom);
                    }
                }
            }
            for (k, &col) in cols.iter().enumerate() {
                x[col] += step * (s[k] - x[col]);
            }
            for &col in &cols {
                if x[col] <= tol {
                    x[col] = 0.0;
                    passive[col] = false;
                }
            }
        }
    }

    // Clamp round-off so the invariant x >= 0 holds exactly.
    for v in x.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }

    let residual = (b - a * &x).norm();
    NnlsSolution {
        x,
        residual,
        iterations,
        converged,
    }
}

fn column_norm_max(a: &DMatrix<f64>) -> f64 {
    a.column_iter()
        .map(|c| c.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}
