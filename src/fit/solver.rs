//! Damped least-squares curve fitting (Levenberg-Marquardt).

use nalgebra::{DMatrix, DVector};

use super::model::Model;
use crate::error::{CharacteristicsError, Result};

/// Configuration for a Levenberg-Marquardt fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Damping factor; must be positive. The damped normal matrix uses
    /// `lambda = damping * gradient_difference^2`.
    pub damping: f64,
    /// Forward-difference step for the Jacobian approximation (default: 0.1).
    pub gradient_difference: f64,
    /// Starting parameter vector; all ones when absent.
    pub initial_values: Option<Vec<f64>>,
    /// Iteration cap (default: 100).
    pub max_iterations: usize,
    /// L1 error at or below which the fit stops (default: 0.01).
    pub error_tolerance: f64,
    /// Per-parameter lower clamp; unbounded when absent.
    pub min_values: Option<Vec<f64>>,
    /// Per-parameter upper clamp; unbounded when absent.
    pub max_values: Option<Vec<f64>>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            damping: 0.0,
            gradient_difference: 0.1,
            initial_values: None,
            max_iterations: 100,
            error_tolerance: 0.01,
            min_values: None,
            max_values: None,
        }
    }
}

/// Outcome of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Final parameter vector, in model order.
    pub parameter_values: Vec<f64>,
    /// Final sum of absolute residuals.
    pub parameter_error: f64,
    /// Number of completed iterations.
    pub iterations: usize,
}

/// Sum of absolute residuals of the model against the data.
fn l1_error(x: &[f64], y: &[f64], model: Model, params: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (yi - model.eval(params, xi)).abs())
        .sum()
}

/// One damped Gauss-Newton step. Returns `None` when the damped normal
/// matrix has lost rank and cannot be inverted.
fn step(
    x: &[f64],
    y: &[f64],
    params: &[f64],
    damping: f64,
    gradient_difference: f64,
    model: Model,
) -> Option<Vec<f64>> {
    let n = params.len();
    let m = x.len();
    let lambda = damping * gradient_difference * gradient_difference;

    let evaluated: Vec<f64> = x.iter().map(|&xi| model.eval(params, xi)).collect();

    // Forward-difference Jacobian, one row per parameter. The rows hold
    // f(p) - f(p + h), so the update below multiplies by the step rather
    // than dividing.
    let mut jacobian = DMatrix::zeros(n, m);
    for param in 0..n {
        let mut perturbed = params.to_vec();
        perturbed[param] += gradient_difference;
        for point in 0..m {
            jacobian[(param, point)] = evaluated[point] - model.eval(&perturbed, x[point]);
        }
    }

    let residuals = DVector::from_fn(m, |point, _| y[point] - evaluated[point]);

    let damped = DMatrix::identity(n, n) * lambda + &jacobian * jacobian.transpose();
    let inverse = damped.try_inverse()?;

    let delta = inverse * jacobian * residuals * gradient_difference;
    Some(
        params
            .iter()
            .zip(delta.iter())
            .map(|(p, d)| p - d)
            .collect(),
    )
}

/// Fits `model` to `(x, y)` by iteratively damped least squares.
///
/// Each iteration evaluates the residuals, approximates the Jacobian by
/// forward differences, solves the damped normal equations
/// `(lambda I + J J^T) delta = J res`, clamps the parameters into their
/// bounds, and re-measures the L1 error. Iteration stops on convergence
/// (`error <= error_tolerance`), on the iteration cap, or as soon as the
/// error turns NaN or the normal matrix loses rank; the divergence cases
/// return the last computed state rather than an error, so callers judge fit
/// quality from `parameter_error` and `iterations`.
///
/// The solver is fully deterministic: identical data, model, and options
/// reproduce identical results.
pub fn levenberg_marquardt(
    x: &[f64],
    y: &[f64],
    model: Model,
    options: &FitOptions,
) -> Result<FitResult> {
    if options.damping <= 0.0 {
        return Err(CharacteristicsError::InvalidOption(
            "damping must be a positive number".into(),
        ));
    }
    if x.len() < 2 || y.len() < 2 {
        return Err(CharacteristicsError::InsufficientData {
            needed: 2,
            got: x.len().min(y.len()),
        });
    }
    if x.len() != y.len() {
        return Err(CharacteristicsError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }

    let n = model.param_count();
    let mut parameters = options
        .initial_values
        .clone()
        .unwrap_or_else(|| vec![1.0; n]);
    if parameters.len() != n {
        return Err(CharacteristicsError::InvalidOption(format!(
            "expected {} initial values, got {}",
            n,
            parameters.len()
        )));
    }

    let min_values = options
        .min_values
        .clone()
        .unwrap_or_else(|| vec![f64::NEG_INFINITY; n]);
    let max_values = options
        .max_values
        .clone()
        .unwrap_or_else(|| vec![f64::INFINITY; n]);
    if min_values.len() != n || max_values.len() != n {
        return Err(CharacteristicsError::InvalidOption(
            "min and max bounds must match the parameter count".into(),
        ));
    }
    if min_values
        .iter()
        .zip(max_values.iter())
        .any(|(lo, hi)| !(lo <= hi))
    {
        return Err(CharacteristicsError::InvalidOption(
            "every min bound must be a number not exceeding its max bound".into(),
        ));
    }

    let mut error = l1_error(x, y, model, &parameters);
    let mut converged = error <= options.error_tolerance;

    let mut iteration = 0;
    while iteration < options.max_iterations && !converged {
        let next = match step(
            x,
            y,
            &parameters,
            options.damping,
            options.gradient_difference,
            model,
        ) {
            Some(next) => next,
            None => break,
        };
        parameters = next;
        // clamp keeps NaN parameters NaN, so divergence stays visible in the
        // error check below.
        for (k, p) in parameters.iter_mut().enumerate() {
            *p = p.clamp(min_values[k], max_values[k]);
        }

        error = l1_error(x, y, model, &parameters);
        if error.is_nan() {
            break;
        }
        converged = error <= options.error_tolerance;
        iteration += 1;
    }

    Ok(FitResult {
        parameter_values: parameters,
        parameter_error: error,
        iterations: iteration,
    })
}

/// Fits a polynomial of the given degree (1 to 5) to `(x, y)`.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize, options: &FitOptions) -> Result<FitResult> {
    if !(1..=5).contains(&degree) {
        return Err(CharacteristicsError::InvalidOption(format!(
            "polynomial degree must be between 1 and 5, got {}",
            degree
        )));
    }
    levenberg_marquardt(x, y, Model::Polynomial(degree), options)
}
