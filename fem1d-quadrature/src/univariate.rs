//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::{Error, Rule1d};
use std::f64::consts::PI;

/// Upper bound on Newton iterations used when locating roots of Legendre polynomials.
///
/// The initial guesses are accurate enough that convergence happens in a handful of iterations,
/// so hitting this bound means we are oscillating at the level of round-off.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Recurrence relation for Legendre polynomials.
///
/// Note: we use a formula for which derivatives are *not* defined at |x| == 1, so it is only
/// suitable for evaluation in the open interval (-1, 1).
#[derive(Debug, Default)]
struct LegendreRecurrence {
    n: usize,
    x: f64,
    // The current value, i.e. p_n(x)
    p1: f64,
    // The previous value in the recurrence, i.e. p_{n - 1}(x)
    p2: f64,
}

impl LegendreRecurrence {
    pub fn evaluate(n: usize, x: f64) -> Self {
        // Use recurrence relation
        //  m P_m(x) = (2m - 1) * x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p1 = 1.0;
        let mut p2 = 0.0;
        let mut p3;
        for m in 1..=n {
            let m = m as f64;
            p3 = p2;
            p2 = p1;
            p1 = ((2.0 * m - 1.0) * x * p2 - (m - 1.0) * p3) / m;
        }

        Self { n, x, p1, p2 }
    }

    fn value(&self) -> f64 {
        self.p1
    }

    fn derivative(&self) -> f64 {
        let Self { n, x, p1, p2 } = &self;
        let n = *n as f64;
        // Use the standard recurrence relation
        // dp_n/dx (x) = n * (x * p_n(x) - p_{n - 1}(x)) / (x^2 - 1)
        n * (x * p1 - p2) / (x * x - 1.0)
    }

    /// Second derivative, obtained from Legendre's differential equation
    ///  (1 - x^2) p_n'' - 2 x p_n' + n (n + 1) p_n = 0.
    fn second_derivative(&self) -> f64 {
        let n = self.n as f64;
        let x = self.x;
        (2.0 * x * self.derivative() - n * (n + 1.0) * self.value()) / (1.0 - x * x)
    }

    fn value_and_derivative(&self) -> (f64, f64) {
        (self.value(), self.derivative())
    }
}

/// Gauss quadrature for the reference interval [-1, 1].
///
/// Returns the [Gauss quadrature rule] with the given number of points. Given `n` points,
/// the rule integrates polynomials of order up to `2 n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
///
/// [Gauss quadrature rule]: https://en.wikipedia.org/wiki/Gaussian_quadrature
pub fn gauss(num_points: usize) -> Rule1d {
    let n = num_points;
    assert!(n > 0, "number of points must be positive");

    // Loosely based on the procedure used in
    // Numerical Recipes, The art of Scientific Computing, Third Edition (2007)
    let num_roots = n;
    let m = (num_roots + 1) / 2;

    let mut points = Vec::with_capacity(num_roots);
    let mut weights = Vec::with_capacity(num_roots);

    // Only find the first m roots. The remaining roots can be found by symmetry
    for i in 0..m {
        // Compute a fairly accurate initial guess
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let (mut p, mut dp) = LegendreRecurrence::evaluate(n, x).value_and_derivative();

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -p / dp;
            x += dx;
            let (p_new, dp_new) = LegendreRecurrence::evaluate(n, x).value_and_derivative();
            p = p_new;
            dp = dp_new;
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        // Once a root is known, its corresponding weight is given explicitly by a standard
        // formula
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        points.push([x]);
        weights.push(w);
    }

    // Recover the remaining points and weights by symmetry
    for i in m..n {
        let mirror_idx = n - i - 1;
        points.push([-points[mirror_idx][0]]);
        weights.push(weights[mirror_idx]);
    }

    assert_eq!(points.len(), weights.len());
    assert_eq!(points.len(), n, "Internal error: incorrect number of points produced");

    (weights, points)
}

/// Same as [`gauss`], but returns an error instead of panicking when zero points are requested.
pub fn try_gauss(num_points: usize) -> Result<Rule1d, Error> {
    if num_points == 0 {
        Err(Error::NoRuleAvailable)
    } else {
        Ok(gauss(num_points))
    }
}

/// Gauss-Lobatto quadrature for the reference interval [-1, 1].
///
/// The rule with `n` points contains both endpoints and integrates polynomials of order up to
/// `2 n - 3` exactly. The interior points are the roots of the derivative of the Legendre
/// polynomial of degree `n - 1`. Points are returned in ascending order.
///
/// Returns `None` if fewer than two points are requested.
pub fn try_gauss_lobatto(num_points: usize) -> Option<Rule1d> {
    let n = num_points;
    if n < 2 {
        return None;
    }

    let m = n - 1;
    let endpoint_weight = 2.0 / (n as f64 * m as f64);
    let mut points = vec![0.0; n];
    let mut weights = vec![0.0; n];
    points[0] = -1.0;
    points[n - 1] = 1.0;
    weights[0] = endpoint_weight;
    weights[n - 1] = endpoint_weight;

    // Compute the roots in the lower half and mirror them. The Chebyshev-Gauss-Lobatto points
    // serve as initial guesses.
    let half = n / 2;
    for i in 1..half {
        let mut x = -(PI * i as f64 / m as f64).cos();
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let recurrence = LegendreRecurrence::evaluate(m, x);
            let dx = -recurrence.derivative() / recurrence.second_derivative();
            x += dx;
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let p = LegendreRecurrence::evaluate(m, x).value();
        let w = endpoint_weight / (p * p);
        points[i] = x;
        weights[i] = w;
        points[n - 1 - i] = -x;
        weights[n - 1 - i] = w;
    }

    if n % 2 == 1 {
        let p = LegendreRecurrence::evaluate(m, 0.0).value();
        points[half] = 0.0;
        weights[half] = endpoint_weight / (p * p);
    }

    Some((weights, points.into_iter().map(|x| [x]).collect()))
}
