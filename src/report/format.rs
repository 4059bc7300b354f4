//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::data::TitrationDataset;
use crate::domain::{Calculation, Peak, SampleInfo, SpectrumGrid};
use crate::io::ingest::IngestedSheet;

/// Format the full run summary (sample, data usage, grid, fit diagnostics).
pub fn format_run_summary(
    ingest: &IngestedSheet,
    dataset: &TitrationDataset,
    grid: &SpectrumGrid,
    calc: &Calculation,
) -> String {
    let mut out = String::new();

    out.push_str("=== pks - pK Spectrum ===\n");
    out.push_str(&format_sample(dataset.info()));

    let mode = dataset.info().titrant.mode();
    out.push_str(&format!(
        "Rows: read={} | usable={} (charge balance >= 0)",
        ingest.rows_read,
        dataset.valid_points(),
    ));
    if let Some(line) = ingest.stopped_at {
        out.push_str(&format!(" | data block ended at line {line}"));
    }
    out.push('\n');

    let points = dataset.points();
    let ph = dataset.ph_values();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        out.push_str(&format!(
            "Range: {}=[{:.4}, {:.4}] | pH=[{:.3}, {:.3}]\n",
            mode.abscissa_label(),
            first.abscissa,
            last.abscissa,
            ph.iter().copied().fold(f64::INFINITY, f64::min),
            ph.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ));
    }

    out.push_str(&format!(
        "Grid: pK=[{:.2}, {:.2}] step {} ({} bins) | integration constant: {}\n",
        grid.pk_start,
        grid.pk_end,
        grid.d_pk,
        grid.pk_step(),
        if grid.use_integration_constant { "on" } else { "off" },
    ));

    match calc {
        Calculation::Insufficient { valid_points } => {
            out.push_str(&format!(
                "\nNot enough usable points for a reliable fit ({valid_points} < {}).\n",
                crate::fit::MIN_VALID_POINTS
            ));
        }
        Calculation::Solved { spectrum, error, .. } => {
            out.push_str("\nFit diagnostics:\n");
            out.push_str(&format!("- residual norm: {:.4e}\n", spectrum.residual));
            out.push_str(&format!("- error        : {error:.4e}\n"));
            if let Some(offset) = spectrum.offset {
                out.push_str(&format!("- offset       : {offset:.4e}\n"));
            }
            out.push_str(&format!("- total conc.  : {:.4e}\n", spectrum.total()));
        }
    }
    out.push('\n');

    out
}

fn format_sample(info: &SampleInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Sample: {}\n",
        info.name.as_deref().unwrap_or("(unnamed)")
    ));
    if let Some(comment) = &info.comment {
        out.push_str(&format!("Comment: {comment}\n"));
    }
    if let Some(ts) = &info.timestamp {
        out.push_str(&format!("Measured: {ts}\n"));
    }
    let (label, unit) = match info.titrant.mode() {
        crate::domain::TitrationMode::Volumetric => ("titrant", "mol/L"),
        crate::domain::TitrationMode::Coulometric => ("current", "A"),
    };
    out.push_str(&format!(
        "Mode: {} | volume={} | {label}={} {unit}\n",
        info.titrant.mode().display_name(),
        info.volume,
        info.titrant.constant(),
    ));
    out
}

/// Format the peak table.
pub fn format_peaks(peaks: &[Peak], grid: &SpectrumGrid) -> String {
    let mut out = String::new();
    if peaks.is_empty() {
        out.push_str("No peaks above 1% of the spectrum maximum.\n");
        return out;
    }

    out.push_str("Peaks:\n");
    out.push_str(
        format!(
            "{:>4} {:>8} {:>8} {:>15} {:>6} {:>14}\n",
            "#", "pK", "±95%", "pK range", "bins", "concentration"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->4} {:->8} {:->8} {:->15} {:->6} {:->14}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, p) in peaks.iter().enumerate() {
        let lo = grid.pk_center(p.first_point);
        let hi = grid.pk_center(p.first_point + p.point_count.saturating_sub(1));
        out.push_str(
            format!(
                "{:>4} {:>8.3} {:>8.3} {:>15} {:>6} {:>14.4e}\n",
                i + 1,
                p.mean,
                p.interval,
                format!("{lo:.2}-{hi:.2}"),
                p.point_count,
                p.concentration,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}
