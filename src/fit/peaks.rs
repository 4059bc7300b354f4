//! Peak segmentation and statistics.
//!
//! A peak is a maximal run of bins strictly above 1% of the spectrum maximum.
//! For each run we report:
//!
//! - `concentration`: sum of the raw bin values
//! - `mean`: weighted mean of the bin centres
//! - `interval`: `1.96 * weighted_sd / sqrt(point_count)`
//!
//! Weights are the bin values normalized over the *whole* spectrum; within a
//! peak they are renormalized by the peak's own weight mass, so the mean and
//! spread only see the peak's bins.

use crate::domain::{Peak, SpectrumGrid};

/// Fraction of the maximum a bin must exceed to count as significant.
const THRESHOLD_FRACTION: f64 = 0.01;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

/// `max(values) / 100`, or `0.0` for an empty spectrum.
pub fn significance_threshold(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max) * THRESHOLD_FRACTION
}

/// Maximal runs of bins strictly above `threshold`, as `(first, count)` pairs.
pub fn segment_runs(values: &[f64], threshold: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < values.len() {
        if values[i] > threshold {
            let first = i;
            while i < values.len() && values[i] > threshold {
                i += 1;
            }
            runs.push((first, i - first));
        } else {
            i += 1;
        }
    }
    runs
}

/// Extract peaks in ascending pK order.
pub fn extract_peaks(values: &[f64], grid: &SpectrumGrid) -> Vec<Peak> {
    let threshold = significance_threshold(values);
    let total: f64 = values.iter().sum();

    segment_runs(values, threshold)
        .into_iter()
        .map(|(first, count)| {
            let bins = first..first + count;
            let weight = |k: usize| values[k] / total;

            let mass: f64 = bins.clone().map(weight).sum();
            let mean = bins.clone().map(|k| weight(k) * grid.pk_center(k)).sum::<f64>() / mass;
            let variance = bins
                .clone()
                .map(|k| weight(k) * (grid.pk_center(k) - mean).powi(2))
                .sum::<f64>()
                / mass;

            Peak {
                first_point: first,
                point_count: count,
                concentration: values[bins].iter().sum(),
                mean,
                interval: Z_95 * variance.sqrt() / (count as f64).sqrt(),
            }
        })
        .collect()
}
