//! Histogram distributions attached to metric results.
//!
//! Distributions are heavyweight payloads: they are computed for
//! plotting, excluded from report serialization by default and only
//! surfaced when a caller opts in per metric.

// Allow precision loss casts in histogram calculations
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 20;

/// A binned view of a numeric column.
///
/// `x` holds the bin centers and `y` the number of values that fell
/// into each bin. Both vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Bin centers.
    pub x: Vec<f64>,
    /// Value counts per bin.
    pub y: Vec<u64>,
}

impl Distribution {
    /// Returns true if no bins were produced.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Total number of values counted across all bins.
    pub fn total(&self) -> u64 {
        self.y.iter().sum()
    }
}

/// Compute a histogram of `values` over the min/max range of its
/// finite values.
///
/// Non-finite values never widen the range; they are counted into the
/// nearest edge bin instead.
pub fn histogram(values: &[f64], bins: usize) -> Distribution {
    match data_range(values) {
        Some((min, max)) => histogram_in_range(values, min, max, bins),
        None => Distribution::default(),
    }
}

/// Compute histograms for a current and an optional reference column
/// over one shared set of bins.
///
/// The bin range spans the combined min/max of both inputs so the two
/// histograms are directly comparable. An empty side still gets the
/// shared bin centers with zero counts; if both sides are empty the
/// distributions are empty.
pub fn histogram_pair(
    current: &[f64],
    reference: Option<&[f64]>,
    bins: usize,
) -> (Distribution, Option<Distribution>) {
    let combined_range = match reference {
        Some(reference_values) => merge_ranges(data_range(current), data_range(reference_values)),
        None => data_range(current),
    };

    let Some((min, max)) = combined_range else {
        return (
            Distribution::default(),
            reference.map(|_| Distribution::default()),
        );
    };

    let current_distribution = histogram_in_range(current, min, max, bins);
    let reference_distribution =
        reference.map(|values| histogram_in_range(values, min, max, bins));

    (current_distribution, reference_distribution)
}

fn histogram_in_range(values: &[f64], min: f64, max: f64, bins: usize) -> Distribution {
    let bins = bins.max(1);

    // Constant data collapses to a single bin at the value itself
    if (max - min).abs() < f64::EPSILON {
        return Distribution {
            x: vec![min],
            y: vec![values.len() as u64],
        };
    }

    let bin_width = (max - min) / bins as f64;

    // Non-finite and out-of-range values clamp into the nearest edge bin
    let bin_index = |value: f64| -> usize {
        if value <= min || value.is_nan() {
            return 0;
        }
        if value >= max {
            return bins - 1;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((value - min) / bin_width) as usize;
        index.min(bins - 1)
    };

    let mut counts = vec![0u64; bins];
    for &value in values {
        counts[bin_index(value)] += 1;
    }

    let centers = (0..bins)
        .map(|i| min + (i as f64 + 0.5) * bin_width)
        .collect();

    Distribution {
        x: centers,
        y: counts,
    }
}

fn data_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }

    // min stays above max when no finite value was seen
    if min <= max {
        Some((min, max))
    } else {
        None
    }
}

fn merge_ranges(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => {
            Some((a_min.min(b_min), a_max.max(b_max)))
        }
        (Some(range), None) | (None, Some(range)) => Some(range),
        (None, None) => None,
    }
}
