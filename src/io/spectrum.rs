//! Read/write spectrum JSON files.
//!
//! Spectrum JSON is the "portable" representation of a calculation:
//! - sample metadata and grid configuration
//! - the pK bin centres and solved concentrations
//! - residual, fit error and peaks
//!
//! The schema is defined by `domain::SpectrumFile`.

use std::fs::File;
use std::path::Path;

use crate::data::TitrationDataset;
use crate::domain::{Peak, Spectrum, SpectrumFile, SpectrumGrid};
use crate::error::AppError;

/// Assemble the file contents for a solved calculation.
pub fn build_spectrum_file(
    dataset: &TitrationDataset,
    grid: &SpectrumGrid,
    spectrum: &Spectrum,
    peaks: &[Peak],
    error: f64,
) -> SpectrumFile {
    SpectrumFile {
        tool: "pks".to_string(),
        sample: dataset.info().clone(),
        valid_points: dataset.valid_points(),
        grid: *grid,
        pk: grid.centers(),
        concentration: spectrum.values.clone(),
        residual: spectrum.residual,
        offset: spectrum.offset,
        error,
        peaks: peaks.to_vec(),
    }
}

/// Write a spectrum JSON file.
pub fn write_spectrum_json(path: &Path, file: &SpectrumFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spectrum JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write spectrum JSON: {e}")))?;

    Ok(())
}

/// Read a spectrum JSON file.
pub fn read_spectrum_json(path: &Path) -> Result<SpectrumFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open spectrum JSON '{}': {e}", path.display())))?;
    let spectrum: SpectrumFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid spectrum JSON: {e}")))?;

    spectrum.grid.validate()?;
    if spectrum.pk.len() != spectrum.concentration.len() {
        return Err(AppError::new(
            2,
            format!(
                "Spectrum JSON has {} pK values but {} concentrations.",
                spectrum.pk.len(),
                spectrum.concentration.len()
            ),
        ));
    }
    for (i, p) in spectrum.peaks.iter().enumerate() {
        let in_range = p
            .first_point
            .checked_add(p.point_count)
            .is_some_and(|end| end <= spectrum.concentration.len());
        if p.point_count == 0 || !in_range {
            return Err(AppError::new(
                2,
                format!(
                    "Spectrum JSON peak {} covers bins {}+{} outside the {} stored bins.",
                    i + 1,
                    p.first_point,
                    p.point_count,
                    spectrum.concentration.len()
                ),
            ));
        }
    }
    Ok(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PhysicalConstants, TitrationPoint};

    #[test]
    fn spectrum_json_reads_back() {
        let grid = SpectrumGrid::new(2.0, 3.0, 0.5, true).unwrap();
        let ds = TitrationDataset::volumetric(
            0.02,
            0.1,
            vec![TitrationPoint::new(0.0, 3.0)],
            PhysicalConstants::default(),
        )
        .unwrap();
        let spectrum = Spectrum {
            values: vec![0.0, 0.01, 0.0],
            residual: 1e-9,
            offset: Some(-2e-4),
        };
        let peaks = vec![Peak {
            first_point: 1,
            point_count: 1,
            concentration: 0.01,
            mean: 2.5,
            interval: 0.0,
        }];
        let file = build_spectrum_file(&ds, &grid, &spectrum, &peaks, 2e-5);
        assert_eq!(file.pk, vec![2.0, 2.5, 3.0]);

        let path = std::env::temp_dir().join(format!("pks_spectrum_{}.json", std::process::id()));
        write_spectrum_json(&path, &file).unwrap();
        let back = read_spectrum_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, file);
    }

    fn write_with_peak(name: &str, first_point: usize, point_count: usize) -> std::path::PathBuf {
        let grid = SpectrumGrid::new(2.0, 3.0, 0.5, false).unwrap();
        let file = SpectrumFile {
            tool: "pks".to_string(),
            sample: crate::domain::SampleInfo::new(
                0.02,
                crate::domain::Titrant::Volumetric { concentration: 0.1 },
            ),
            valid_points: 9,
            grid,
            pk: grid.centers(),
            concentration: vec![0.0, 0.01, 0.0],
            residual: 0.0,
            offset: None,
            error: 0.0,
            peaks: vec![Peak {
                first_point,
                point_count,
                concentration: 0.01,
                mean: 2.5,
                interval: 0.0,
            }],
        };
        let path = std::env::temp_dir().join(format!("pks_spectrum_{name}_{}.json", std::process::id()));
        write_spectrum_json(&path, &file).unwrap();
        path
    }

    #[test]
    fn empty_peak_is_rejected_on_read() {
        let path = write_with_peak("empty_peak", 0, 0);
        let err = read_spectrum_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn peak_past_the_last_bin_is_rejected_on_read() {
        let path = write_with_peak("late_peak", 2, 2);
        let err = read_spectrum_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("outside the 3 stored bins"));

        let path = write_with_peak("huge_peak", usize::MAX, 1);
        assert!(read_spectrum_json(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
