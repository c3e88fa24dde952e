//! Finite-difference derivative and near-zero-crossing peak detection.

use crate::error::Result;
use crate::smoothing;
use crate::stats::{self, MinMaxSum};

/// Outcome of root/peak detection on a series.
#[derive(Debug, Clone)]
pub struct RootsResult {
    /// Forward finite-difference derivative (index 0 is fixed to 0).
    pub d: Vec<f64>,
    /// Aggregates of the derivative.
    pub d_mms: MinMaxSum,
    /// Near-zero threshold: a tenth of the derivative maximum.
    pub d_limit: f64,
    /// Series value at the center of each near-zero run.
    pub peak_vals: Vec<f64>,
    /// Index of the center of each near-zero run.
    pub peak_idxs: Vec<usize>,
    /// Maximal runs of consecutive near-zero derivative indices.
    pub groups: Vec<Vec<usize>>,
}

/// Forward finite-difference derivative of `r` with respect to `t`.
///
/// `res[0]` is fixed to 0. Repeated time values divide by zero and the
/// resulting `Inf`/`NaN` propagates downstream unguarded.
pub fn derivative(t: &[f64], r: &[f64]) -> Vec<f64> {
    let mut res = Vec::with_capacity(r.len());
    res.push(0.0);
    for i in 1..r.len() {
        res.push((r[i] - r[i - 1]) / (t[i] - t[i - 1]));
    }
    res
}

/// Locates flat spots of `r`: indices whose derivative lies strictly inside
/// `(-d_limit, d_limit)`, grouped into maximal runs of consecutive indices
/// and reduced to the run centers. A run center marks a local extremum or
/// plateau of the series.
pub fn roots(t: &[f64], r: &[f64]) -> RootsResult {
    let d = derivative(t, r);
    detect(r, d)
}

/// Same detection as [`roots`], applied to a Gaussian-smoothed copy of `r`.
///
/// Smoothing with a small sigma (1 is a reasonable choice for unit-spaced
/// time axes) suppresses sample noise that would otherwise fragment the
/// near-zero runs. Peak values are read from the smoothed series.
pub fn roots_smoothed(t: &[f64], r: &[f64], sigma: f64) -> Result<RootsResult> {
    let s = smoothing::smooth(t, r, sigma)?;
    let d = derivative(t, &s);
    Ok(detect(&s, d))
}

fn detect(r: &[f64], d: Vec<f64>) -> RootsResult {
    let d_mms = stats::minmaxsum(&d);
    let d_limit = d_mms.max * 0.1;

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, &v) in d.iter().enumerate() {
        if !(v > -d_limit && v < d_limit) {
            continue;
        }
        match groups.last_mut() {
            Some(group) if idx > 0 && group.last() == Some(&(idx - 1)) => group.push(idx),
            _ => groups.push(vec![idx]),
        }
    }

    let peak_idxs: Vec<usize> = groups.iter().map(|g| g[0] + g.len() / 2).collect();
    let peak_vals: Vec<f64> = peak_idxs.iter().map(|&i| r[i]).collect();

    RootsResult {
        d,
        d_mms,
        d_limit,
        peak_vals,
        peak_idxs,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==================== derivative ====================

    #[test]
    fn derivative_known_values() {
        let d = derivative(&[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0]);
        assert_eq!(d, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn derivative_respects_uneven_spacing() {
        let d = derivative(&[0.0, 2.0, 3.0], &[0.0, 4.0, 5.0]);
        assert_eq!(d, vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn derivative_single_point() {
        assert_eq!(derivative(&[1.0], &[5.0]), vec![0.0]);
    }

    #[test]
    fn derivative_zero_dt_propagates() {
        let d = derivative(&[1.0, 1.0, 2.0], &[0.0, 1.0, 1.0]);
        assert!(d[1].is_infinite());
        assert_relative_eq!(d[2], 0.0, epsilon = 1e-12);
    }

    // ==================== roots ====================

    #[test]
    fn roots_sine_wave_extrema() {
        let t: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let r: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        let res = roots(&t, &r);
        // Flat start plus the three turning points of sin(0.1 x) on [0, 10).
        assert_eq!(res.peak_idxs, vec![0, 17, 48, 80]);
        assert_relative_eq!(res.peak_vals[0], 0.0, epsilon = 1e-12);
        assert!(res.peak_vals[1] > 0.98);
        assert!(res.peak_vals[2] < -0.98);
        assert!(res.peak_vals[3] > 0.98);
    }

    #[test]
    fn roots_spiky_series_groups() {
        let t: Vec<f64> = (0..101).map(|i| i as f64).collect();
        let mut r = vec![0.0; 101];
        for (idx, v) in [
            (14, 1.0),
            (16, 1.0),
            (18, 3.0),
            (19, 4.0),
            (21, 5.0),
            (22, 2.0),
            (23, 5.0),
            (24, 4.0),
            (25, 2.0),
            (26, 4.0),
            (27, 5.0),
            (28, 8.0),
            (29, 6.0),
            (30, 6.0),
            (31, 3.0),
            (32, 1.0),
            (33, 4.0),
            (34, 2.0),
            (35, 1.0),
            (39, 1.0),
        ] {
            r[idx] = v;
        }
        let res = roots(&t, &r);
        // Leading flat run, the plateau at 29..30, the dip at 36..38, and the
        // flat tail.
        assert_eq!(res.peak_idxs, vec![7, 30, 38, 71]);
        assert_eq!(res.groups.len(), 4);
        assert_relative_eq!(res.d_limit, 0.5, epsilon = 1e-12);
        assert_relative_eq!(res.peak_vals[1], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn roots_groups_are_consecutive_runs() {
        let t: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let r: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        let res = roots(&t, &r);
        for group in &res.groups {
            for pair in group.windows(2) {
                assert_eq!(pair[1], pair[0] + 1);
            }
        }
    }

    #[test]
    fn roots_monotone_decreasing_has_no_peaks() {
        // The derivative maximum is the fixed leading zero, so the open
        // near-zero band collapses and nothing qualifies.
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let r: Vec<f64> = (0..10).map(|i| -2.0 * i as f64).collect();
        let res = roots(&t, &r);
        assert_relative_eq!(res.d_limit, 0.0, epsilon = 1e-12);
        assert!(res.peak_idxs.is_empty());
        assert!(res.groups.is_empty());
    }

    // ==================== roots_smoothed ====================

    #[test]
    fn roots_smoothed_finds_sine_extrema_too() {
        let t: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let r: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        let res = roots_smoothed(&t, &r, 1.0).unwrap();
        // The smoothed signal keeps its turning points near the raw ones.
        for expected in [17_i64, 48, 80] {
            assert!(
                res.peak_idxs
                    .iter()
                    .any(|&i| (i as i64 - expected).abs() <= 2),
                "no peak near {}: {:?}",
                expected,
                res.peak_idxs
            );
        }
    }

    #[test]
    fn roots_smoothed_reads_values_from_smoothed_series() {
        let t: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let r: Vec<f64> = (0..60)
            .map(|i| (i as f64 * 0.15).sin() + if i % 2 == 0 { 0.02 } else { -0.02 })
            .collect();
        let res = roots_smoothed(&t, &r, 1.0).unwrap();
        let s = crate::smoothing::smooth(&t, &r, 1.0).unwrap();
        for (&idx, &val) in res.peak_idxs.iter().zip(res.peak_vals.iter()) {
            assert_relative_eq!(val, s[idx], epsilon = 1e-12);
        }
    }
}
