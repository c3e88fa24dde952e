//! Gaussian-kernel smoothing at arbitrary query points.

use std::f64::consts::PI;

use crate::error::{CharacteristicsError, Result};
use crate::series::Series;

/// Kernel-weighted average of `r` at the query point `t0`.
///
/// Only points with `|t[j] - t0| <= 6 * sigma` contribute; each carries the
/// weight `exp(-(t[j]-t0)^2 / (2 sigma^2)) / (sigma sqrt(2 pi))` and the
/// result is the weighted mean `sum(w * r) / sum(w)`. Fails with
/// `InsufficientData` when no point falls inside the window.
pub fn smooth_at(t: &[f64], r: &[f64], sigma: f64, t0: f64) -> Result<f64> {
    let lb = t0 - 6.0 * sigma;
    let ub = t0 + 6.0 * sigma;
    let norm = sigma * (2.0 * PI).sqrt();

    let mut sum = 0.0;
    let mut sum_f = 0.0;
    for (&tj, &rj) in t.iter().zip(r.iter()) {
        if tj >= lb && tj <= ub {
            let w = (-(tj - t0).powi(2) / (2.0 * sigma * sigma)).exp() / norm;
            sum += w * rj;
            sum_f += w;
        }
    }
    if sum_f == 0.0 {
        return Err(CharacteristicsError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(sum / sum_f)
}

/// Smooths `r` at every original sample point.
pub fn smooth(t: &[f64], r: &[f64], sigma: f64) -> Result<Vec<f64>> {
    t.iter().map(|&t0| smooth_at(t, r, sigma, t0)).collect()
}

/// Resamples the series onto the `t_new` axis by smoothing at each query
/// point; the usual way to move irregular samples onto a uniform grid.
pub fn smooth_to(t: &[f64], r: &[f64], sigma: f64, t_new: &[f64]) -> Result<Series> {
    let smoothed = t_new
        .iter()
        .map(|&t0| smooth_at(t, r, sigma, t0))
        .collect::<Result<Vec<f64>>>()?;
    Series::new(t_new.to_vec(), smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==================== smooth ====================

    #[test]
    fn smooth_reference_values() {
        let t = vec![1.0, 2.0, 3.0, 4.0];
        let r = vec![0.0, 3.0, 7.0, 0.0];
        let s = smooth(&t, &r, 2.0).unwrap();
        assert_relative_eq!(s[0], 2.449889558545865, epsilon = 1e-12);
        assert_relative_eq!(s[3], 2.8422102772677342, epsilon = 1e-12);
    }

    #[test]
    fn smooth_preserves_constant_series() {
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let r = vec![4.0; 10];
        let s = smooth(&t, &r, 1.5).unwrap();
        for v in s {
            assert_relative_eq!(v, 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn smooth_is_length_preserving() {
        let t = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let r = vec![1.0, -1.0, 1.0, -1.0, 1.0];
        assert_eq!(smooth(&t, &r, 0.5).unwrap().len(), r.len());
    }

    // ==================== smooth_at ====================

    #[test]
    fn smooth_at_tiny_sigma_recovers_sample() {
        // Window shrinks to the query sample itself.
        let t = vec![1.0, 2.0, 3.0, 4.0];
        let r = vec![0.0, 3.0, 7.0, 0.0];
        let v = smooth_at(&t, &r, 0.1, 3.0).unwrap();
        assert_relative_eq!(v, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn smooth_at_between_samples_interpolates() {
        let t = vec![0.0, 1.0];
        let r = vec![0.0, 10.0];
        // Symmetric weights around the midpoint.
        let v = smooth_at(&t, &r, 1.0, 0.5).unwrap();
        assert_relative_eq!(v, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn smooth_at_empty_window_fails() {
        let t = vec![1.0, 2.0];
        let r = vec![1.0, 2.0];
        assert_eq!(
            smooth_at(&t, &r, 0.01, 10.0),
            Err(CharacteristicsError::InsufficientData { needed: 1, got: 0 })
        );
    }

    // ==================== smooth_to ====================

    #[test]
    fn smooth_to_resamples_onto_new_grid() {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        let r = vec![0.0, 1.0, 2.0, 3.0];
        let grid = vec![0.5, 1.5, 2.5];
        let resampled = smooth_to(&t, &r, 0.8, &grid).unwrap();
        assert_eq!(resampled.t, grid);
        assert_eq!(resampled.r.len(), grid.len());
        // Symmetric window around each midpoint of a linear ramp.
        assert_relative_eq!(resampled.r[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn smooth_to_fails_when_any_query_is_out_of_reach() {
        let t = vec![0.0, 1.0];
        let r = vec![0.0, 1.0];
        assert!(smooth_to(&t, &r, 0.05, &[0.0, 50.0]).is_err());
    }
}
