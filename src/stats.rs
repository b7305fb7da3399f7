//! Order statistics shared by the filters.
//!
//! All functions return `None` on empty input rather than panicking, so
//! callers can treat "no eligible values" as a no-op. Standard deviation is
//! the population form and percentiles use linear interpolation between
//! closest ranks, matching the conventions of the upstream analysis scripts.

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let var = data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    Some(var.sqrt())
}

/// Median of the values.
pub fn median(data: &[f64]) -> Option<f64> {
    percentile(data, 50.0)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `p` is in percent (0–100). Equivalent to `numpy.percentile` with the
/// default interpolation.
pub fn percentile(data: &[f64], p: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-comparable value in percentile input"));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] + weight * (sorted[hi] - sorted[lo]))
}

/// First and third quartiles with the derived 1.5·IQR outlier fences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl Quartiles {
    /// True if `value` falls outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    pub fn is_outlier(&self, value: f64) -> bool {
        value > self.q3 + 1.5 * self.iqr || value < self.q1 - 1.5 * self.iqr
    }
}

/// Compute Q1/Q3/IQR of the values.
pub fn quartiles(data: &[f64]) -> Option<Quartiles> {
    let q1 = percentile(data, 25.0)?;
    let q3 = percentile(data, 75.0)?;
    Some(Quartiles { q1, q3, iqr: q3 - q1 })
}
