//! Autocorrelation of a time series.

use crate::stats;

/// Normalized lagged inner product of a pre-centered series.
///
/// `sum_sq` is the full sum of squares of `centered` and serves as the
/// denominator at every lag, so lag 0 evaluates to exactly 1. A constant
/// series has `sum_sq == 0` and the result is NaN; that propagation is
/// deliberate (strict-mode callers reject such input up front).
pub fn autocorrelation_centered(centered: &[f64], sum_sq: f64, lag: usize) -> f64 {
    let upper = centered.len().saturating_sub(lag);
    let mut num = 0.0;
    for i in 0..upper {
        num += centered[i] * centered[i + lag];
    }
    num / sum_sq
}

/// Returns the autocorrelation of `series` at `lag`.
///
/// The series is centered by its mean before the lagged products are summed.
///
/// # Arguments
/// * `series` - Input time series
/// * `lag` - Lag value
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    let mms = stats::minmaxsum(series);
    let centered: Vec<f64> = series.iter().map(|v| v - mms.avg).collect();
    let sum_sq: f64 = centered.iter().map(|v| v * v).sum();
    autocorrelation_centered(&centered, sum_sq, lag)
}
