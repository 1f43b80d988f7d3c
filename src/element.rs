//! Segment elements and one-dimensional Lagrange bases.
use crate::Error;
use fem1d_quadrature::univariate::try_gauss_lobatto;
use serde::{Deserialize, Serialize};

/// A segment $[x_a, x_b]$ in one dimension.
///
/// The reference domain is $[-1, 1]$, mapped affinely by
/// $x = x_a + (\xi + 1) (x_b - x_a) / 2$.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentElement {
    vertices: [f64; 2],
}

impl SegmentElement {
    pub fn from_interval(interval: [f64; 2]) -> Self {
        Self { vertices: interval }
    }

    pub fn vertices(&self) -> &[f64; 2] {
        &self.vertices
    }

    /// The (constant) derivative $dx / d\xi$ of the reference map.
    pub fn reference_jacobian(&self) -> f64 {
        let [a, b] = self.vertices;
        (b - a) / 2.0
    }

    pub fn map_reference_coords(&self, xi: f64) -> f64 {
        let [a, b] = self.vertices;
        let phi_1 = (1.0 - xi) / 2.0;
        let phi_2 = (1.0 + xi) / 2.0;
        phi_1 * a + phi_2 * b
    }

    /// Inverse of [`map_reference_coords`](Self::map_reference_coords).
    pub fn map_physical_coords(&self, x: f64) -> f64 {
        let [a, b] = self.vertices;
        2.0 * (x - a) / (b - a) - 1.0
    }

    pub fn diameter(&self) -> f64 {
        let [a, b] = self.vertices;
        (b - a).abs()
    }
}

/// Placement of the interpolation nodes of a Lagrange basis on the reference segment.
///
/// Both distributions include the end points $\pm 1$.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeDistribution {
    /// Gauss-Lobatto-Legendre points, which keep the basis well-conditioned for high degrees.
    #[default]
    GaussLobatto,
    Equispaced,
}

/// The nodal Lagrange basis of degree $r$ on the reference segment $[-1, 1]$.
///
/// The $r + 1$ nodes are sorted in increasing order, so that local basis function $0$ belongs
/// to $\xi = -1$ and local basis function $r$ to $\xi = 1$.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeBasis1d {
    nodes: Vec<f64>,
    /// $1 / \prod_{m \neq j} (\xi_j - \xi_m)$ for each node $j$.
    denominators: Vec<f64>,
}

impl LagrangeBasis1d {
    pub fn new(degree: usize, distribution: NodeDistribution) -> Result<Self, Error> {
        if degree < 1 {
            return Err(Error::configuration(format!(
                "Polynomial degree must be at least 1, got {}",
                degree
            )));
        }

        let n = degree + 1;
        let nodes: Vec<f64> = match distribution {
            NodeDistribution::Equispaced => (0..n)
                .map(|j| -1.0 + 2.0 * j as f64 / degree as f64)
                .collect(),
            NodeDistribution::GaussLobatto => {
                let (_, points) = try_gauss_lobatto(n).ok_or_else(|| {
                    Error::configuration(format!("No Gauss-Lobatto points available for degree {}", degree))
                })?;
                points.into_iter().map(|[xi]| xi).collect()
            }
        };

        let denominators = (0..n)
            .map(|j| {
                let product: f64 = (0..n)
                    .filter(|&m| m != j)
                    .map(|m| nodes[j] - nodes[m])
                    .product();
                1.0 / product
            })
            .collect();

        Ok(Self { nodes, denominators })
    }

    pub fn degree(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Reference coordinates of the interpolation nodes.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Evaluates all basis functions at `xi`.
    ///
    /// # Panics
    ///
    /// Panics if `output.len()` does not equal the number of nodes.
    pub fn populate_basis(&self, output: &mut [f64], xi: f64) {
        let n = self.num_nodes();
        assert_eq!(output.len(), n, "Output length must match number of nodes");
        for (j, phi_j) in output.iter_mut().enumerate() {
            let product: f64 = (0..n)
                .filter(|&m| m != j)
                .map(|m| xi - self.nodes[m])
                .product();
            *phi_j = product * self.denominators[j];
        }
    }

    /// Evaluates the derivatives $d\phi_j / d\xi$ of all basis functions at `xi`.
    ///
    /// # Panics
    ///
    /// Panics if `output.len()` does not equal the number of nodes.
    pub fn populate_basis_gradients(&self, output: &mut [f64], xi: f64) {
        let n = self.num_nodes();
        assert_eq!(output.len(), n, "Output length must match number of nodes");
        // Product rule, written out so that no division by (xi - xi_m) is needed
        // and evaluation at the nodes themselves is exact
        for (j, dphi_j) in output.iter_mut().enumerate() {
            let mut sum = 0.0;
            for k in (0..n).filter(|&k| k != j) {
                let product: f64 = (0..n)
                    .filter(|&m| m != j && m != k)
                    .map(|m| xi - self.nodes[m])
                    .product();
                sum += product;
            }
            *dphi_j = sum * self.denominators[j];
        }
    }
}
