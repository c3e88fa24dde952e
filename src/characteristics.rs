//! The characteristics pipeline: one flat record of series features.

use std::f64::consts::PI;

use crate::autocorrelation::autocorrelation_centered;
use crate::error::{CharacteristicsError, Result};
use crate::fit::{fit_polynomial, levenberg_marquardt, FitOptions, FitResult, Model};
use crate::roots::{roots, RootsResult};
use crate::series::Series;
use crate::stats::{self, MinMaxSum};

/// Options for the characteristics pipeline.
#[derive(Debug, Clone, Default)]
pub struct CharacteristicsOptions {
    /// Reject inputs whose features would divide by zero (constant
    /// observations, repeated time values) with `NumericDegenerate` instead
    /// of silently propagating NaN/Inf (default: false).
    pub strict_numerics: bool,
}

/// Every feature computed from one series.
///
/// Constructed in full at the end of the pipeline and immutable afterwards;
/// each call to [`characteristics`] produces an independent record.
#[derive(Debug, Clone)]
pub struct Characteristics {
    /// Validated time axis.
    pub t: Vec<f64>,
    /// Validated observations.
    pub r: Vec<f64>,
    /// Aggregates of the raw observations.
    pub r_mms: MinMaxSum,
    /// Observations shifted by the minimum into the non-negative range.
    pub r_lift_min: Vec<f64>,
    /// Observations centered by the mean.
    pub r_lift_avg: Vec<f64>,
    /// Sum of squares of the centered observations.
    pub sum_r_lifted_sq: f64,
    /// Discrete empirical distribution: min-lifted values normalized to sum 1.
    pub f: Vec<f64>,
    /// Moment of order 0 of `t` under `f` (1 by construction).
    pub mon_0: f64,
    /// Moment of order 1: the weighted mean time.
    pub mon_1: f64,
    pub mon_2: f64,
    pub mon_3: f64,
    pub mon_4: f64,
    pub mon_5: f64,
    /// Number of observations at or above the mean.
    pub r_above_avg_cnt: usize,
    /// Number of observations below the mean.
    pub r_below_avg_cnt: usize,
    /// Autocorrelation sequence; index 0 is fixed to 1.
    pub ac: Vec<f64>,
    /// Time value reused per lag index (`ac_t[k] = t[k]`).
    pub ac_t: Vec<f64>,
    /// Lag index of the strongest autocorrelation.
    pub ac_top_1: usize,
    /// Lag index of the second strongest autocorrelation.
    pub ac_top_2: usize,
    /// Lag index of the weakest autocorrelation.
    pub ac_low_1: usize,
    /// Lag index of the second weakest autocorrelation.
    pub ac_low_2: usize,
    /// Peak detection on the autocorrelation sequence (periodicity
    /// candidates).
    pub ac_roots: RootsResult,
    /// Peak detection on the raw series.
    pub roots: RootsResult,
    /// Degree-1 polynomial fit.
    pub lm1: FitResult,
    /// Degree-2 polynomial fit, warm-started from `lm1`.
    pub lm2: FitResult,
    /// Degree-3 polynomial fit.
    pub lm3: FitResult,
    /// Gaussian peak-shape fit, seeded by moment matching.
    pub lm_gaussian: FitResult,
    /// Asymmetric Lorentzian peak-shape fit, seeded by moment matching.
    pub lm_asym_lorentzian: FitResult,
    /// First quartile of the observations.
    pub r_q_1: f64,
    /// Median of the observations.
    pub r_q_2: f64,
    /// Third quartile of the observations.
    pub r_q_3: f64,
    /// Count of observations in the first of five equal-width bins.
    pub r_bin_1: usize,
    pub r_bin_2: usize,
    pub r_bin_3: usize,
    pub r_bin_4: usize,
    /// Count in the last bin, which includes the maximum.
    pub r_bin_5: usize,
}

/// Computes the full feature battery for the series `(t, r)`.
///
/// Fails fast on empty or mismatched input and on series too short to fit
/// (fewer than two points). Degenerate numerics propagate silently as
/// NaN/Inf; use [`characteristics_with`] for strict rejection.
pub fn characteristics(t: &[f64], r: &[f64]) -> Result<Characteristics> {
    characteristics_with(t, r, &CharacteristicsOptions::default())
}

/// Computes the full feature battery with explicit options.
pub fn characteristics_with(
    t: &[f64],
    r: &[f64],
    options: &CharacteristicsOptions,
) -> Result<Characteristics> {
    let series = Series::new(t.to_vec(), r.to_vec())?;
    Characteristics::from_series(series, options)
}

impl Characteristics {
    /// Runs the pipeline on a validated series.
    pub fn from_series(series: Series, options: &CharacteristicsOptions) -> Result<Self> {
        let Series { t, r } = series;
        let n = r.len();
        if n < 2 {
            return Err(CharacteristicsError::InsufficientData { needed: 2, got: n });
        }

        let r_mms = stats::minmaxsum(&r);

        if options.strict_numerics {
            if r_mms.max == r_mms.min {
                return Err(CharacteristicsError::NumericDegenerate(
                    "constant observations leave autocorrelation and distribution weights undefined"
                        .into(),
                ));
            }
            if t.windows(2).any(|w| w[1] == w[0]) {
                return Err(CharacteristicsError::NumericDegenerate(
                    "repeated time values divide by zero in the derivative".into(),
                ));
            }
        }

        let r_lift_min: Vec<f64> = r.iter().map(|v| v - r_mms.min).collect();
        let r_lift_avg: Vec<f64> = r.iter().map(|v| v - r_mms.avg).collect();
        let sum_r_lifted_sq: f64 = r_lift_avg.iter().map(|v| v * v).sum();

        // Empirical distribution over the min-lifted observations. A constant
        // series divides zero by zero here and the NaN carries through every
        // moment.
        let sum_lifted: f64 = r_lift_min.iter().sum();
        let f: Vec<f64> = r_lift_min.iter().map(|v| v / sum_lifted).collect();

        let mon_0 = stats::weighted_moment(&t, &f, 0);
        let mon_1 = stats::weighted_moment(&t, &f, 1);
        let mon_2 = stats::weighted_moment(&t, &f, 2);
        let mon_3 = stats::weighted_moment(&t, &f, 3);
        let mon_4 = stats::weighted_moment(&t, &f, 4);
        let mon_5 = stats::weighted_moment(&t, &f, 5);

        let r_above_avg_cnt = r.iter().filter(|&&v| v >= r_mms.avg).count();
        let r_below_avg_cnt = n - r_above_avg_cnt;

        // Lag 0 is 1 by convention; further lags run while lag < 0.9 n.
        let mut ac = vec![1.0];
        let mut ac_t = vec![t[0]];
        let mut lag = 1;
        while (lag as f64) < 0.9 * n as f64 {
            ac.push(autocorrelation_centered(&r_lift_avg, sum_r_lifted_sq, lag));
            ac_t.push(t[lag]);
            lag += 1;
        }

        let ac_extremes = stats::extreme_indices(&ac, 2);
        let ac_top_1 = ac_extremes.highest[0];
        let ac_top_2 = ac_extremes.highest[1];
        let ac_low_1 = ac_extremes.lowest[0];
        let ac_low_2 = ac_extremes.lowest[1];

        let ac_roots = roots(&ac_t, &ac);
        let series_roots = roots(&t, &r);

        let lm1 = fit_polynomial(
            &t,
            &r,
            1,
            &FitOptions {
                damping: 1.5,
                initial_values: Some(vec![1.0, 1.0]),
                ..FitOptions::default()
            },
        )?;
        let lm2 = fit_polynomial(
            &t,
            &r,
            2,
            &FitOptions {
                damping: 1.5,
                initial_values: Some(vec![
                    lm1.parameter_values[0],
                    lm1.parameter_values[1],
                    1.0,
                ]),
                ..FitOptions::default()
            },
        )?;
        let lm3 = fit_polynomial(
            &t,
            &r,
            3,
            &FitOptions {
                damping: 1.5,
                initial_values: Some(vec![1.0, 1.0, 1.0, 1.0]),
                ..FitOptions::default()
            },
        )?;

        // Moment-matched seeds: center at the weighted mean time, spread from
        // the second moment, amplitude scaled so the model peak matches the
        // observed lifted maximum.
        let center = mon_1;
        let spread = (mon_2 - mon_1 * mon_1).sqrt();
        let height = r_mms.max - r_mms.min;
        let lm_gaussian = levenberg_marquardt(
            &t,
            &r,
            Model::Gaussian,
            &FitOptions {
                damping: 1.5,
                initial_values: Some(vec![height * spread * (2.0 * PI).sqrt(), center, spread]),
                ..FitOptions::default()
            },
        )?;
        let lm_asym_lorentzian = levenberg_marquardt(
            &t,
            &r,
            Model::AsymLorentzian,
            &FitOptions {
                damping: 1.5,
                initial_values: Some(vec![height / 2.0, center, spread, spread]),
                ..FitOptions::default()
            },
        )?;

        let r_q_1 = stats::quantile(&r, 0.25);
        let r_q_2 = stats::quantile(&r, 0.50);
        let r_q_3 = stats::quantile(&r, 0.75);

        let bins = stats::bin_counts(&r, &r_mms);

        Ok(Self {
            t,
            r,
            r_mms,
            r_lift_min,
            r_lift_avg,
            sum_r_lifted_sq,
            f,
            mon_0,
            mon_1,
            mon_2,
            mon_3,
            mon_4,
            mon_5,
            r_above_avg_cnt,
            r_below_avg_cnt,
            ac,
            ac_t,
            ac_top_1,
            ac_top_2,
            ac_low_1,
            ac_low_2,
            ac_roots,
            roots: series_roots,
            lm1,
            lm2,
            lm3,
            lm_gaussian,
            lm_asym_lorentzian,
            r_q_1,
            r_q_2,
            r_q_3,
            r_bin_1: bins[0],
            r_bin_2: bins[1],
            r_bin_3: bins[2],
            r_bin_4: bins[3],
            r_bin_5: bins[4],
        })
    }
}
