//! End-to-end tests of the spectrum pipeline through the public API.

use pk_spectrum::data::{AcidSite, SimulationConfig, TitrationDataset, simulate};
use pk_spectrum::domain::{Calculation, PhysicalConstants, SpectrumGrid, Titrant, TitrationPoint};
use pk_spectrum::io::{load_titration_sheet, write_titration_sheet};

fn simulated(sites: &[(f64, f64)], titrant: Titrant, noise_sd: f64) -> TitrationDataset {
    let config = SimulationConfig {
        sites: sites
            .iter()
            .map(|&(pk, concentration)| AcidSite { pk, concentration })
            .collect(),
        titrant,
        sample_volume: 0.02,
        ph_start: 2.5,
        ph_end: 11.0,
        points: 60,
        noise_sd,
        seed: 11,
    };
    let sheet = simulate(&config, &PhysicalConstants::default()).unwrap();
    TitrationDataset::from_sheet(sheet, PhysicalConstants::default()).unwrap()
}

fn solved(calc: &Calculation) -> (&[f64], &[pk_spectrum::domain::Peak]) {
    match calc {
        Calculation::Solved { spectrum, peaks, .. } => (&spectrum.values, peaks),
        Calculation::Insufficient { valid_points } => panic!("insufficient data: {valid_points}"),
    }
}

#[test]
fn single_site_round_trip_volumetric() {
    let ds = simulated(&[(4.0, 0.01)], Titrant::Volumetric { concentration: 0.1 }, 0.0);
    let grid = SpectrumGrid::default();
    let calc = ds.make_calculation(&grid).unwrap();
    let (values, peaks) = solved(&calc);

    assert!(values.iter().all(|&v| v >= 0.0));
    assert_eq!(peaks.len(), 1);
    assert!((peaks[0].mean - 4.0).abs() <= grid.d_pk, "mean={}", peaks[0].mean);
    assert!((peaks[0].concentration - 0.01).abs() < 1e-6, "conc={}", peaks[0].concentration);
}

#[test]
fn single_site_round_trip_coulometric() {
    let ds = simulated(&[(5.0, 0.001)], Titrant::Coulometric { current: 0.01 }, 0.0);
    let grid = SpectrumGrid::default();
    let calc = ds.make_calculation(&grid).unwrap();
    let (_, peaks) = solved(&calc);

    assert_eq!(peaks.len(), 1);
    assert!((peaks[0].mean - 5.0).abs() <= grid.d_pk);
    assert!((peaks[0].concentration - 0.001).abs() < 1e-7);
}

#[test]
fn two_sites_give_two_ordered_peaks() {
    let ds = simulated(&[(4.0, 0.01), (8.0, 0.005)], Titrant::Volumetric { concentration: 0.1 }, 0.0);
    let grid = SpectrumGrid::default();
    let calc = ds.make_calculation(&grid).unwrap();
    let (_, peaks) = solved(&calc);

    assert_eq!(peaks.len(), 2);
    assert!(peaks[0].first_point < peaks[1].first_point);
    assert!((peaks[0].mean - 4.0).abs() <= grid.d_pk);
    assert!((peaks[1].mean - 8.0).abs() <= grid.d_pk);
    assert!(calc.error().is_finite());
}

#[test]
fn permuted_input_gives_identical_results() {
    let ds = simulated(&[(4.0, 0.01)], Titrant::Volumetric { concentration: 0.1 }, 0.005);
    let mut rows: Vec<TitrationPoint> = ds.points().to_vec();
    rows.reverse();
    let n = rows.len();
    rows.swap(0, n / 2);

    let shuffled = TitrationDataset::volumetric(0.02, 0.1, rows, PhysicalConstants::default()).unwrap();
    assert_eq!(shuffled.alpha_values(), ds.alpha_values());
    assert_eq!(shuffled.valid_points(), ds.valid_points());

    let grid = SpectrumGrid::default();
    assert_eq!(ds.make_calculation(&grid).unwrap(), shuffled.make_calculation(&grid).unwrap());
}

#[test]
fn repeated_solves_are_identical() {
    let ds = simulated(&[(3.5, 0.004), (7.2, 0.006)], Titrant::Volumetric { concentration: 0.1 }, 0.01);
    let grid = SpectrumGrid::new(1.0, 11.0, 0.1, true).unwrap();
    let a = ds.make_calculation(&grid).unwrap();
    let b = ds.make_calculation(&grid).unwrap();
    assert_eq!(a, b);
    assert!(a.spectrum().unwrap().values.iter().all(|&v| v >= 0.0));
}

#[test]
fn guard_holds_for_any_grid() {
    let rows: Vec<TitrationPoint> = (0..6)
        .map(|i| TitrationPoint::new(i as f64 * 2e-4, 3.0 + 0.3 * i as f64))
        .collect();
    let ds = TitrationDataset::volumetric(0.02, 0.1, rows, PhysicalConstants::default()).unwrap();

    for grid in [
        SpectrumGrid::default(),
        SpectrumGrid::new(-2.0, 14.0, 0.25, false).unwrap(),
        SpectrumGrid::new(3.0, 4.0, 0.5, true).unwrap(),
    ] {
        let calc = ds.make_calculation(&grid).unwrap();
        assert!(calc.peaks().is_none());
        assert!(calc.error().is_nan());
    }
}

#[test]
fn simulated_sheet_survives_csv_round_trip() {
    let config = SimulationConfig {
        sites: vec![AcidSite {
            pk: 6.0,
            concentration: 0.002,
        }],
        titrant: Titrant::Volumetric { concentration: 0.05 },
        sample_volume: 0.025,
        ph_start: 3.0,
        ph_end: 10.5,
        points: 40,
        noise_sd: 0.0,
        seed: 1,
    };
    let sheet = simulate(&config, &PhysicalConstants::default()).unwrap();

    let path = std::env::temp_dir().join(format!("pks_it_sheet_{}.csv", std::process::id()));
    write_titration_sheet(&path, &sheet).unwrap();
    let ingested = load_titration_sheet(&path, pk_spectrum::domain::TitrationMode::Volumetric).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(ingested.sheet.rows, sheet.rows);
    let ds = TitrationDataset::from_sheet(ingested.sheet, PhysicalConstants::default()).unwrap();
    let calc = ds.make_calculation(&SpectrumGrid::default()).unwrap();
    let (_, peaks) = solved(&calc);
    assert_eq!(peaks.len(), 1);
    assert!((peaks[0].mean - 6.0).abs() <= 0.05);
}
