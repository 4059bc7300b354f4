//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - spectrum: `#` columns, one per character cell (max over the bins it covers)
//! - peak means: `^` on the axis line

use crate::domain::{Peak, SpectrumFile};

/// Render a spectrum given bin centres and values.
pub fn render_spectrum(pk: &[f64], values: &[f64], peaks: &[Peak], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(3);

    let n = pk.len().min(values.len());
    let v_max = values[..n].iter().copied().fold(0.0, f64::max);
    if n < 2 || v_max <= 0.0 {
        return "Plot: (empty spectrum)\n".to_string();
    }
    let (pk_min, pk_max) = (pk[0], pk[n - 1]);
    if !(pk_max > pk_min) {
        return "Plot: (empty spectrum)\n".to_string();
    }

    let mut columns = vec![0.0_f64; width];
    for i in 0..n {
        let x = map_x(pk[i], pk_min, pk_max, width);
        columns[x] = columns[x].max(values[i]);
    }

    let mut grid = vec![vec![' '; width]; height];
    for (x, &v) in columns.iter().enumerate() {
        let bar = ((v / v_max) * height as f64).round() as usize;
        for row in grid.iter_mut().skip(height - bar.min(height)) {
            row[x] = '#';
        }
    }

    let mut axis = vec!['-'; width];
    for p in peaks {
        if p.mean.is_finite() {
            axis[map_x(p.mean, pk_min, pk_max, width)] = '^';
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: pK=[{pk_min:.2}, {pk_max:.2}] | max={v_max:.3e}\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&axis.into_iter().collect::<String>());
    out.push('\n');

    let left = format!("{pk_min:.2}");
    let right = format!("{pk_max:.2}");
    let gap = width.saturating_sub(left.len() + right.len()).max(1);
    out.push_str(&format!("{left}{}{right}\n", " ".repeat(gap)));

    out
}

/// Render a plot from a saved spectrum JSON file.
pub fn render_spectrum_file(file: &SpectrumFile, width: usize, height: usize) -> String {
    render_spectrum(&file.pk, &file.concentration, &file.peaks, width, height)
}

fn map_x(pk: f64, pk_min: f64, pk_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((pk - pk_min) / (pk_max - pk_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let pk = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values = [0.0, 0.0, 1.0, 0.5, 0.0];
        let peaks = vec![Peak {
            first_point: 2,
            point_count: 2,
            concentration: 1.5,
            mean: 2.0,
            interval: 0.1,
        }];

        let txt = render_spectrum(&pk, &values, &peaks, 10, 4);
        let expected = concat!(
            "Plot: pK=[0.00, 4.00] | max=1.000e0\n",
            "     #    \n",
            "     #    \n",
            "     # #  \n",
            "     # #  \n",
            "-----^----\n",
            "0.00  4.00\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn all_zero_spectrum_renders_placeholder() {
        let txt = render_spectrum(&[0.0, 1.0], &[0.0, 0.0], &[], 20, 5);
        assert_eq!(txt, "Plot: (empty spectrum)\n");
    }
}
