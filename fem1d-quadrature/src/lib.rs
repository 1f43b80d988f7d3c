//! Quadrature rules for the one-dimensional reference domain `[-1, 1]`.
//!
//! The main purpose of this crate is to support the `fem1d` library. However, the rules
//! available here may be used completely independently of `fem1d`.
//!
//! All rules are returned as a pair `(weights, points)`, with one entry per quadrature point.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(
                    f,
                    "There is no quadrature rule satisfying the requirements available"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// A one-dimensional point.
pub type Point1 = [f64; 1];

/// A one-dimensional quadrature rule, given as `(weights, points)`.
pub type Rule1d = (Vec<f64>, Vec<Point1>);

/// Approximates the integral of `f` over the reference domain with the given rule.
pub fn integrate(rule: &Rule1d, f: impl Fn(&Point1) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}
