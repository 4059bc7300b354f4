//! Logistic protonation kernel.
//!
//! A site with acidity constant `pK` is deprotonated to the fraction
//!
//! - `f(pK, pH) = 1 / (1 + 10^(pK - pH))`
//!
//! at a given pH. The discretized spectrum weights this by the bin width `d_pk`.
//!
//! Numerical notes:
//! - `10^(pK - pH)` is evaluated as `exp(ln10 * (pK - pH))`.
//! - Far below the pK the exponential overflows to `+inf` and the fraction
//!   correctly collapses to `0.0`; far above it underflows to `0.0` and the
//!   fraction is `1.0`. No clamping is needed.

use std::f64::consts::LN_10;

/// Deprotonated fraction of a site with the given pK at the given pH.
pub fn deprotonated_fraction(pk: f64, ph: f64) -> f64 {
    1.0 / (1.0 + (LN_10 * (pk - ph)).exp())
}

/// Design-matrix entry for a bin centred at `pk` with width `d_pk`.
pub fn kernel(pk: f64, ph: f64, d_pk: f64) -> f64 {
    d_pk / (1.0 + (LN_10 * (pk - ph)).exp())
}
