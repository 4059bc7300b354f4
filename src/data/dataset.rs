//! Validated titration data.
//!
//! A `TitrationDataset` is built once from a sheet of raw `(abscissa, pH)` rows:
//!
//! 1. rows are stably sorted by abscissa (pH travels with its abscissa)
//! 2. the charge-balance excess `alpha` is evaluated per point
//! 3. only the prefix up to the first negative `alpha` is kept for fitting
//!
//! Once the charge balance goes negative the titration has left the region the
//! model can represent, so every later point is dropped, including ones whose
//! `alpha` would be non-negative again.

use log::debug;

use crate::domain::{
    Calculation, PhysicalConstants, SampleInfo, SampleSheet, SpectrumGrid, Titrant, TitrationPoint,
};
use crate::error::SpectrumError;
use crate::fit::SpectrumSolver;

#[derive(Debug, Clone, PartialEq)]
pub struct TitrationDataset {
    info: SampleInfo,
    constants: PhysicalConstants,
    /// All points, ascending by abscissa.
    points: Vec<TitrationPoint>,
    /// Charge balance of the usable prefix of `points`.
    alpha: Vec<f64>,
}

impl TitrationDataset {
    /// Dataset for a volumetric titration with the given titrant concentration.
    pub fn volumetric(
        sample_volume: f64,
        concentration: f64,
        rows: Vec<TitrationPoint>,
        constants: PhysicalConstants,
    ) -> Result<Self, SpectrumError> {
        let info = SampleInfo::new(sample_volume, Titrant::Volumetric { concentration });
        Self::new(info, rows, constants)
    }

    /// Dataset for a coulometric titration at the given current.
    pub fn coulometric(
        sample_volume: f64,
        current: f64,
        rows: Vec<TitrationPoint>,
        constants: PhysicalConstants,
    ) -> Result<Self, SpectrumError> {
        let info = SampleInfo::new(sample_volume, Titrant::Coulometric { current });
        Self::new(info, rows, constants)
    }

    /// Dataset from a loaded sheet (metadata is kept for reporting).
    pub fn from_sheet(sheet: SampleSheet, constants: PhysicalConstants) -> Result<Self, SpectrumError> {
        Self::new(sheet.info, sheet.rows, constants)
    }

    fn new(
        info: SampleInfo,
        mut rows: Vec<TitrationPoint>,
        constants: PhysicalConstants,
    ) -> Result<Self, SpectrumError> {
        if !(info.volume.is_finite() && info.volume > 0.0) {
            return Err(SpectrumError::InvalidSample(format!(
                "sample volume must be finite and > 0, got {}",
                info.volume
            )));
        }
        let constant = info.titrant.constant();
        if !(constant.is_finite() && constant > 0.0) {
            let what = match info.titrant {
                Titrant::Volumetric { .. } => "titrant concentration",
                Titrant::Coulometric { .. } => "current",
            };
            return Err(SpectrumError::InvalidSample(format!(
                "{what} must be finite and > 0, got {constant}"
            )));
        }

        // `sort_by` is stable, so equal abscissas keep their input order.
        rows.sort_by(|a, b| a.abscissa.total_cmp(&b.abscissa));

        let mut alpha = Vec::with_capacity(rows.len());
        for point in &rows {
            let value = charge_balance(&info.titrant, info.volume, point, &constants);
            if value >= 0.0 {
                alpha.push(value);
            } else {
                break;
            }
        }

        debug!(
            "{} titration: {} points, {} usable before the charge balance turns negative",
            info.titrant.mode().display_name(),
            rows.len(),
            alpha.len()
        );

        Ok(Self {
            info,
            constants,
            points: rows,
            alpha,
        })
    }

    pub fn info(&self) -> &SampleInfo {
        &self.info
    }

    /// All points in ascending abscissa order.
    pub fn points(&self) -> &[TitrationPoint] {
        &self.points
    }

    /// pH of every point, in sorted order.
    pub fn ph_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.ph).collect()
    }

    /// pH of the usable prefix, index-aligned with `alpha_values`.
    pub fn valid_ph(&self) -> Vec<f64> {
        self.points[..self.valid_points()].iter().map(|p| p.ph).collect()
    }

    /// Charge balance of the usable prefix.
    pub fn alpha_values(&self) -> &[f64] {
        &self.alpha
    }

    /// Length of the usable prefix.
    pub fn valid_points(&self) -> usize {
        self.alpha.len()
    }

    /// Compute the pK spectrum of this dataset.
    ///
    /// Returns `Calculation::Insufficient` when fewer than seven points are usable.
    pub fn make_calculation(&self, grid: &SpectrumGrid) -> Result<Calculation, SpectrumError> {
        SpectrumSolver::new(self.constants).solve(self, grid)
    }
}

/// Proton-balance excess of a single reading.
///
/// - volumetric: `((h - Kw/h) / V) * (v + V) + C * v / V`
/// - coulometric: `h - Kw/h + I * t / F / V`
pub fn charge_balance(
    titrant: &Titrant,
    sample_volume: f64,
    point: &TitrationPoint,
    constants: &PhysicalConstants,
) -> f64 {
    let h = 10f64.powf(-point.ph);
    let excess = h - constants.kw / h;
    match *titrant {
        Titrant::Volumetric { concentration } => {
            (excess / sample_volume) * (point.abscissa + sample_volume)
                + concentration * point.abscissa / sample_volume
        }
        Titrant::Coulometric { current } => {
            excess + current * point.abscissa / constants.faraday / sample_volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(f64, f64)]) -> Vec<TitrationPoint> {
        pairs.iter().map(|&(a, ph)| TitrationPoint::new(a, ph)).collect()
    }

    #[test]
    fn rows_are_sorted_with_ph_in_lockstep() {
        let ds = TitrationDataset::volumetric(
            0.02,
            0.1,
            rows(&[(0.002, 4.0), (0.0, 3.0), (0.001, 3.5)]),
            PhysicalConstants::default(),
        )
        .unwrap();

        let abscissa: Vec<f64> = ds.points().iter().map(|p| p.abscissa).collect();
        assert_eq!(abscissa, vec![0.0, 0.001, 0.002]);
        assert_eq!(ds.ph_values(), vec![3.0, 3.5, 4.0]);
        assert_eq!(ds.valid_points(), 3);
    }

    #[test]
    fn equal_abscissas_keep_input_order() {
        let ds = TitrationDataset::volumetric(
            0.02,
            0.1,
            rows(&[(0.001, 3.6), (0.0, 3.0), (0.001, 3.4)]),
            PhysicalConstants::default(),
        )
        .unwrap();
        assert_eq!(ds.ph_values(), vec![3.0, 3.6, 3.4]);
    }

    #[test]
    fn volumetric_charge_balance_matches_formula() {
        let constants = PhysicalConstants::default();
        let point = TitrationPoint::new(0.0005, 3.5);
        let titrant = Titrant::Volumetric { concentration: 0.1 };
        let got = charge_balance(&titrant, 0.02, &point, &constants);

        let h = 10f64.powf(-3.5);
        let want = ((h - 1e-14 / h) / 0.02) * (0.0005 + 0.02) + 0.1 * 0.0005 / 0.02;
        assert!((got - want).abs() < 1e-15);
    }

    #[test]
    fn coulometric_charge_balance_matches_formula() {
        let constants = PhysicalConstants::default();
        let point = TitrationPoint::new(100.0, 3.0);
        let titrant = Titrant::Coulometric { current: 0.01 };
        let got = charge_balance(&titrant, 0.02, &point, &constants);

        let want = 1e-3 - 1e-14 / 1e-3 + 0.01 * 100.0 / 96485.0 / 0.02;
        assert!((got - want).abs() < 1e-15);
    }

    #[test]
    fn truncates_at_first_negative_alpha_and_never_resumes() {
        // The third point (pH 12 after very little base) has a negative balance;
        // the fourth is positive again but must still be dropped.
        let ds = TitrationDataset::volumetric(
            0.02,
            0.1,
            rows(&[(0.0, 3.0), (0.0005, 3.5), (0.001, 12.0), (0.002, 4.0)]),
            PhysicalConstants::default(),
        )
        .unwrap();

        assert_eq!(ds.points().len(), 4);
        assert_eq!(ds.valid_points(), 2);
        assert_eq!(ds.alpha_values().len(), 2);
        assert_eq!(ds.valid_ph(), vec![3.0, 3.5]);
        assert!(ds.alpha_values().iter().all(|&a| a >= 0.0));
    }

    #[test]
    fn permuted_rows_give_identical_alpha() {
        let base = [(0.0, 3.0), (0.0005, 3.5), (0.001, 3.9), (0.002, 4.4), (0.003, 5.2)];
        let mut shuffled = base;
        shuffled.reverse();
        shuffled.swap(1, 3);

        let a = TitrationDataset::volumetric(0.02, 0.1, rows(&base), PhysicalConstants::default())
            .unwrap();
        let b = TitrationDataset::volumetric(0.02, 0.1, rows(&shuffled), PhysicalConstants::default())
            .unwrap();

        assert_eq!(a.alpha_values(), b.alpha_values());
        assert_eq!(a.valid_points(), b.valid_points());
    }

    #[test]
    fn rejects_non_positive_metadata() {
        let c = PhysicalConstants::default();
        assert!(TitrationDataset::volumetric(0.0, 0.1, vec![], c).is_err());
        assert!(TitrationDataset::volumetric(0.02, -0.1, vec![], c).is_err());
        assert!(TitrationDataset::coulometric(0.02, f64::NAN, vec![], c).is_err());
    }

    #[test]
    fn empty_dataset_has_no_valid_points() {
        let ds = TitrationDataset::coulometric(0.02, 0.01, vec![], PhysicalConstants::default()).unwrap();
        assert_eq!(ds.valid_points(), 0);
        assert!(ds.valid_ph().is_empty());
    }
}
