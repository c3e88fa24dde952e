//! Parametric model families evaluated by the solver.

use std::f64::consts::PI;

/// A parametric curve family. A family plus a parameter vector defines a
/// function of the independent variable, evaluated through [`Model::eval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// `p0 + p1 x + ... + pd x^d` with `degree + 1` coefficients, constant
    /// term first.
    Polynomial(usize),
    /// Scaled normal density `a exp(-(x-t0)^2 / (2 s^2)) / (s sqrt(2 pi))`
    /// with parameters `[a, t0, s]`.
    Gaussian,
    /// Two-sided Lorentzian `2a / (1 + ((x-t0)/s)^2)` with parameters
    /// `[a, t0, s_left, s_right]`; the left half-width applies below `t0`.
    AsymLorentzian,
}

impl Model {
    /// Number of parameters the family expects.
    pub fn param_count(&self) -> usize {
        match self {
            Model::Polynomial(degree) => degree + 1,
            Model::Gaussian => 3,
            Model::AsymLorentzian => 4,
        }
    }

    /// Evaluates the family at `x` under the given parameter vector.
    ///
    /// `params` must hold [`param_count`](Self::param_count) values.
    pub fn eval(&self, params: &[f64], x: f64) -> f64 {
        match self {
            Model::Polynomial(_) => {
                let mut acc = 0.0;
                let mut power = 1.0;
                for &p in params {
                    acc += p * power;
                    power *= x;
                }
                acc
            }
            Model::Gaussian => {
                let (a, t0, s) = (params[0], params[1], params[2]);
                a * (-(x - t0).powi(2) / (2.0 * s * s)).exp() / (s * (2.0 * PI).sqrt())
            }
            Model::AsymLorentzian => {
                let (a, t0) = (params[0], params[1]);
                let s = if x < t0 { params[2] } else { params[3] };
                2.0 * a / (1.0 + ((x - t0) / s).powi(2))
            }
        }
    }
}
