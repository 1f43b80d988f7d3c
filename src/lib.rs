//! Finite element solution of one-dimensional stationary diffusion-reaction problems
//!
//! $$ -(\mu u')' + \sigma u = f \quad \text{in } (0, 1), $$
//!
//! with Dirichlet boundary conditions at $x = 0$ and $x = 1$, discretized with continuous
//! Lagrange elements of arbitrary degree, together with tools for mesh-refinement convergence
//! studies against known exact solutions.
//!
//! The pipeline for a single resolution consists of
//! [`Mesh1d`](mesh::Mesh1d) → [`DiscretizationSpace`](space::DiscretizationSpace) →
//! [`DofMap`](dof::DofMap) → assembly ([`assembly`]) → Conjugate Gradient solve ([`solve`])
//! → error estimation ([`error`]). [`DiffusionReactionProblem`](problem::DiffusionReactionProblem)
//! runs this chain for an immutable [`ProblemConfig`](config::ProblemConfig), and
//! [`ConvergenceStudy`](convergence::ConvergenceStudy) repeats it over a sequence of resolutions.
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod assembly;
pub mod cases;
pub mod config;
pub mod convergence;
pub mod dof;
pub mod element;
pub mod error;
pub mod function;
pub mod io;
pub mod mesh;
pub mod problem;
pub mod quadrature;
pub mod solve;
pub mod space;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
pub extern crate vtkio;

/// Library-wide error type.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid discretization or solver parameters.
    Configuration(String),
    /// A parameter could not be parsed as an expression.
    Expression {
        parameter: String,
        source: expr_parse::ParseError,
    },
    /// The mesh, DoF map or boundary conditions are structurally inconsistent.
    Assembly(String),
    /// The linear solver failed to reach the prescribed tolerance.
    SolverNonConvergence {
        iterations: usize,
        relative_residual: f64,
        reason: String,
    },
    /// Error norms were requested, but no exact solution is configured.
    MissingExactSolution,
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn assembly(message: impl Into<String>) -> Self {
        Self::Assembly(message.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Invalid configuration: {}", message),
            Self::Expression { parameter, source } => {
                write!(f, "Failed to parse expression for parameter '{}': {}", parameter, source)
            }
            Self::Assembly(message) => write!(f, "Assembly failed: {}", message),
            Self::SolverNonConvergence {
                iterations,
                relative_residual,
                reason,
            } => write!(
                f,
                "Linear solver did not converge after {} iterations (relative residual {:e}): {}",
                iterations, relative_residual, reason
            ),
            Self::MissingExactSolution => {
                write!(f, "Cannot compute errors without an exact solution")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Expression { source, .. } => Some(source),
            _ => None,
        }
    }
}
