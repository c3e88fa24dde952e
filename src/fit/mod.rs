//! Parametric curve fitting: model families plus a damped least-squares
//! solver.

pub mod model;
pub mod solver;

pub use model::Model;
pub use solver::{fit_polynomial, levenberg_marquardt, FitOptions, FitResult};
