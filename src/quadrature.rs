//! Quadrature on the reference segment and tabulated basis data.
use crate::element::LagrangeBasis1d;
use crate::Error;
use fem1d_quadrature::univariate;
use itertools::izip;

/// A quadrature rule on the reference segment $[-1, 1]$.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    weights: Vec<f64>,
    points: Vec<f64>,
}

impl QuadratureRule {
    /// The Gauss-Legendre rule with `num_points` points, exact for polynomials of degree
    /// $2n - 1$.
    pub fn gauss(num_points: usize) -> Result<Self, Error> {
        let (weights, points) = univariate::try_gauss(num_points).map_err(|err| {
            Error::configuration(format!("Failed to construct Gauss rule with {} points: {}", num_points, err))
        })?;
        Ok(Self {
            weights,
            points: points.into_iter().map(|[xi]| xi).collect(),
        })
    }

    /// # Panics
    ///
    /// Panics if the number of weights and points differ.
    pub fn from_points_and_weights(points: Vec<f64>, weights: Vec<f64>) -> Self {
        assert_eq!(points.len(), weights.len(), "Number of points and weights must match");
        Self { weights, points }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Approximates $\int_{-1}^1 f(\xi) \, d\xi$.
    pub fn integrate(&self, f: impl Fn(f64) -> f64) -> f64 {
        izip!(&self.weights, &self.points)
            .map(|(w, xi)| w * f(*xi))
            .sum()
    }
}

/// A quadrature rule together with the values and reference gradients of a basis at each
/// quadrature point.
///
/// Tabulating the basis once per space means that neither assembly nor error estimation
/// evaluates the basis functions per element.
#[derive(Debug, Clone)]
pub struct QuadratureTable {
    rule: QuadratureRule,
    num_basis_functions: usize,
    // Row-major: entry (q, j) is stored at q * num_basis_functions + j
    basis_values: Vec<f64>,
    basis_gradients: Vec<f64>,
}

impl QuadratureTable {
    pub fn from_basis_and_rule(basis: &LagrangeBasis1d, rule: QuadratureRule) -> Self {
        let n = basis.num_nodes();
        let mut basis_values = vec![0.0; n * rule.len()];
        let mut basis_gradients = vec![0.0; n * rule.len()];
        for (q, &xi) in rule.points().iter().enumerate() {
            basis.populate_basis(&mut basis_values[q * n..(q + 1) * n], xi);
            basis.populate_basis_gradients(&mut basis_gradients[q * n..(q + 1) * n], xi);
        }
        Self {
            rule,
            num_basis_functions: n,
            basis_values,
            basis_gradients,
        }
    }

    pub fn rule(&self) -> &QuadratureRule {
        &self.rule
    }

    pub fn num_points(&self) -> usize {
        self.rule.len()
    }

    pub fn num_basis_functions(&self) -> usize {
        self.num_basis_functions
    }

    /// Values $\phi_j(\xi_q)$ of all basis functions at quadrature point `q`.
    pub fn basis_values(&self, q: usize) -> &[f64] {
        let n = self.num_basis_functions;
        &self.basis_values[q * n..(q + 1) * n]
    }

    /// Reference gradients $d\phi_j / d\xi (\xi_q)$ of all basis functions at quadrature point `q`.
    pub fn basis_gradients(&self, q: usize) -> &[f64] {
        let n = self.num_basis_functions;
        &self.basis_gradients[q * n..(q + 1) * n]
    }

    /// Iterates over `(weight, point, basis values, basis gradients)` for each quadrature point.
    pub fn iter(&self) -> impl '_ + Iterator<Item = (f64, f64, &[f64], &[f64])> {
        (0..self.num_points()).map(move |q| {
            (
                self.rule.weights[q],
                self.rule.points[q],
                self.basis_values(q),
                self.basis_gradients(q),
            )
        })
    }
}
