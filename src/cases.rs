//! Predefined benchmark problems on $(0, 1)$ with $\mu \equiv 1$.
use crate::config::{DirichletData, ProblemConfig};
use crate::function::{ExactSolution, ScalarFunction};
use std::f64::consts::PI;

/// Default resolution of the predefined cases.
const DEFAULT_RESOLUTION: usize = 10;

fn smooth_forcing(x: f64) -> f64 {
    4.0 * PI * PI * (2.0 * PI * x).sin()
}

fn smooth_solution(x: f64) -> f64 {
    (2.0 * PI * x).sin()
}

fn smooth_solution_derivative(x: f64) -> f64 {
    2.0 * PI * (2.0 * PI * x).cos()
}

/// $-u'' = 4 \pi^2 \sin(2 \pi x)$ with exact solution $u^* = \sin(2 \pi x)$.
///
/// Dirichlet data is taken from the exact solution, which vanishes at both end points.
pub fn smooth(degree: usize) -> ProblemConfig {
    ProblemConfig::new(
        degree,
        DEFAULT_RESOLUTION,
        1.0,
        smooth_forcing as fn(f64) -> f64,
    )
    .with_exact_solution(ExactSolution::new(
        ScalarFunction::ClosedForm(smooth_solution),
        ScalarFunction::ClosedForm(smooth_solution_derivative),
    ))
    .with_dirichlet(DirichletData::ExactSolution)
}

const NON_SMOOTH_SLOPE: f64 = -4.0 / 15.0 * 0.176_776_695_296_636_9;

fn non_smooth_forcing(x: f64) -> f64 {
    if x < 0.5 {
        0.0
    } else {
        -(x - 0.5).sqrt()
    }
}

fn non_smooth_solution(x: f64) -> f64 {
    if x < 0.5 {
        NON_SMOOTH_SLOPE * x
    } else {
        NON_SMOOTH_SLOPE * x + 4.0 / 15.0 * (x - 0.5).powf(2.5)
    }
}

fn non_smooth_solution_derivative(x: f64) -> f64 {
    if x < 0.5 {
        NON_SMOOTH_SLOPE
    } else {
        NON_SMOOTH_SLOPE + 2.0 / 3.0 * (x - 0.5).powf(1.5)
    }
}

/// $-u'' = f$ with $f = 0$ for $x < 1/2$ and $f = -\sqrt{x - 1/2}$ otherwise.
///
/// The exact solution $u^* = A x + \frac{4}{15} (x - 1/2)_+^{5/2}$, with
/// $A = -\frac{4}{15} (1/2)^{5/2}$, satisfies homogeneous Dirichlet conditions and has limited
/// regularity at $x = 1/2$.
pub fn non_smooth(degree: usize) -> ProblemConfig {
    ProblemConfig::new(
        degree,
        DEFAULT_RESOLUTION,
        1.0,
        non_smooth_forcing as fn(f64) -> f64,
    )
    .with_exact_solution(ExactSolution::new(
        ScalarFunction::ClosedForm(non_smooth_solution),
        ScalarFunction::ClosedForm(non_smooth_solution_derivative),
    ))
    .with_dirichlet(DirichletData::Homogeneous)
}

fn piecewise_forcing_term(x: f64) -> f64 {
    if x > 0.125 && x <= 0.25 {
        -1.0
    } else {
        0.0
    }
}

/// $-u'' = f$ with $f = -1$ on $(1/8, 1/4]$ and zero elsewhere, homogeneous Dirichlet conditions.
///
/// No exact solution is configured.
pub fn piecewise_forcing(degree: usize) -> ProblemConfig {
    ProblemConfig::new(
        degree,
        DEFAULT_RESOLUTION,
        1.0,
        piecewise_forcing_term as fn(f64) -> f64,
    )
}
