//! Distribution statistics over the non-missing samples of one metric.

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation: rank = `p/100 × (n − 1)`, interpolated between the two
/// bracketing order statistics.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    let len = sorted_data.len();
    match len {
        0 => return None,
        1 => return Some(sorted_data[0]),
        _ => {}
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted_data[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Arithmetic mean, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Mean, median and P90 of one group's samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub p90: Option<f64>,
}

impl Summary {
    /// Summarise `samples`. Order does not matter; the slice is sorted in place.
    pub fn from_samples(samples: &mut [f64]) -> Self {
        samples.sort_by(f64::total_cmp);
        Self {
            samples: samples.len(),
            mean: mean(samples),
            median: percentile(samples, 50.0),
            p90: percentile(samples, 90.0),
        }
    }
}

// ── Period-over-period change ─────────────────────────────────────────────────

/// Fractional change `(current − previous) / previous`.
///
/// `None` when either side is missing or `previous` is zero.
pub fn fractional_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    let (prev, cur) = (previous?, current?);
    if prev == 0.0 {
        return None;
    }
    Some((cur - prev) / prev)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
