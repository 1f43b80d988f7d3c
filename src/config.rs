//! Problem configuration.
//!
//! [`ProblemParameters`] holds raw, serializable parameters as they appear in parameter files.
//! [`ProblemConfig::from_parameters`] parses and validates them into an immutable
//! [`ProblemConfig`], which is what the solution pipeline consumes.
use crate::element::NodeDistribution;
use crate::function::{ExactSolution, ScalarFunction};
use crate::mesh::Mesh1d;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Choice of Dirichlet data at $x = 0$ and $x = 1$.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirichletData {
    /// $u(0) = u(1) = 0$.
    Homogeneous,
    /// The end point values of the configured exact solution.
    ExactSolution,
    Values { left: f64, right: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preconditioner {
    None,
    /// Diagonal (Jacobi) preconditioning.
    #[default]
    Jacobi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Tolerance for the true relative residual $\norm{b - A u} / \norm{b}$.
    ///
    /// The default of $10^{-10}$ stays above the accuracy to which the residual can be evaluated
    /// in double precision for the standard refinement sequence up to degree 3.
    pub tolerance: f64,
    /// Iteration budget. Defaults to $\max(1000, 10 n)$ for a system with $n$ unknowns.
    pub max_iterations: Option<usize>,
    pub preconditioner: Preconditioner,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: None,
            preconditioner: Preconditioner::default(),
        }
    }
}

impl SolverSettings {
    pub fn max_iterations_for(&self, num_unknowns: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| usize::max(1000, 10 * num_unknowns))
    }
}

/// Raw problem parameters.
///
/// Defaults correspond to the smooth benchmark problem $-u'' = 4 \pi^2 \sin(2 \pi x)$ with
/// exact solution $\sin(2 \pi x)$, linear elements and resolution $N = 10$.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemParameters {
    /// Polynomial degree $r \geq 1$.
    pub degree: usize,
    /// Resolution $N \geq 1$, giving $N + 1$ elements.
    #[serde(alias = "N")]
    pub resolution: usize,
    /// Custom mesh vertices. Overrides `resolution` if present.
    pub vertices: Option<Vec<f64>>,
    pub node_distribution: NodeDistribution,
    /// Diffusion coefficient $\mu(x)$.
    pub mu: String,
    /// Forcing term $f(x)$.
    pub f: String,
    /// Reaction coefficient $\sigma(x)$, zero if absent.
    pub sigma: Option<String>,
    pub exact_solution: Option<String>,
    /// Derivative of the exact solution. Determined by symbolic differentiation if absent.
    pub exact_derivative: Option<String>,
    /// Defaults to [`DirichletData::ExactSolution`] if an exact solution is given,
    /// and [`DirichletData::Homogeneous`] otherwise.
    pub dirichlet: Option<DirichletData>,
    /// Number of Gauss points per element used for error estimation. Defaults to $r + 2$.
    pub error_quadrature_points: Option<usize>,
    pub solver: SolverSettings,
}

impl Default for ProblemParameters {
    fn default() -> Self {
        Self {
            degree: 1,
            resolution: 10,
            vertices: None,
            node_distribution: NodeDistribution::default(),
            mu: "1.0".to_string(),
            f: "4*pi*pi*sin(2*pi*x)".to_string(),
            sigma: None,
            exact_solution: Some("sin(2*pi*x)".to_string()),
            exact_derivative: None,
            dirichlet: None,
            error_quadrature_points: None,
            solver: SolverSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshLayout {
    /// $N + 1$ elements of equal size.
    Uniform { resolution: usize },
    Vertices(Vec<f64>),
}

/// Immutable configuration of a single diffusion-reaction problem.
#[derive(Debug, Clone)]
pub struct ProblemConfig {
    degree: usize,
    mesh: MeshLayout,
    node_distribution: NodeDistribution,
    diffusion: ScalarFunction,
    forcing: ScalarFunction,
    reaction: Option<ScalarFunction>,
    exact_solution: Option<ExactSolution>,
    dirichlet: DirichletData,
    error_quadrature_points: Option<usize>,
    solver: SolverSettings,
}

impl ProblemConfig {
    /// Creates a configuration on a uniform mesh with homogeneous Dirichlet conditions.
    ///
    /// The configuration is validated when it is used to set up a problem.
    pub fn new(
        degree: usize,
        resolution: usize,
        diffusion: impl Into<ScalarFunction>,
        forcing: impl Into<ScalarFunction>,
    ) -> Self {
        Self {
            degree,
            mesh: MeshLayout::Uniform { resolution },
            node_distribution: NodeDistribution::default(),
            diffusion: diffusion.into(),
            forcing: forcing.into(),
            reaction: None,
            exact_solution: None,
            dirichlet: DirichletData::Homogeneous,
            error_quadrature_points: None,
            solver: SolverSettings::default(),
        }
    }

    /// Parses and validates raw parameters.
    pub fn from_parameters(parameters: &ProblemParameters) -> Result<Self, Error> {
        let diffusion = ScalarFunction::parse("mu", &parameters.mu)?;
        let forcing = ScalarFunction::parse("f", &parameters.f)?;
        let reaction = parameters
            .sigma
            .as_deref()
            .map(|sigma| ScalarFunction::parse("sigma", sigma))
            .transpose()?;

        let exact_solution = match (&parameters.exact_solution, &parameters.exact_derivative) {
            (Some(u), Some(du)) => Some(ExactSolution::new(
                ScalarFunction::parse("exact_solution", u)?,
                ScalarFunction::parse("exact_derivative", du)?,
            )),
            (Some(u), None) => Some(ExactSolution::from_function(ScalarFunction::parse(
                "exact_solution",
                u,
            )?)?),
            (None, Some(_)) => {
                return Err(Error::configuration(
                    "exact_derivative is given, but exact_solution is not",
                ))
            }
            (None, None) => None,
        };

        let dirichlet = parameters.dirichlet.unwrap_or(if exact_solution.is_some() {
            DirichletData::ExactSolution
        } else {
            DirichletData::Homogeneous
        });

        let mesh = match &parameters.vertices {
            Some(vertices) => MeshLayout::Vertices(vertices.clone()),
            None => MeshLayout::Uniform {
                resolution: parameters.resolution,
            },
        };

        let config = Self {
            degree: parameters.degree,
            mesh,
            node_distribution: parameters.node_distribution,
            diffusion,
            forcing,
            reaction,
            exact_solution,
            dirichlet,
            error_quadrature_points: parameters.error_quadrature_points,
            solver: parameters.solver.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a well-posed discrete problem.
    pub fn validate(&self) -> Result<(), Error> {
        if self.degree < 1 {
            return Err(Error::configuration(format!(
                "Polynomial degree must be at least 1, got {}",
                self.degree
            )));
        }
        match &self.mesh {
            MeshLayout::Uniform { resolution } if *resolution < 1 => {
                return Err(Error::configuration(format!(
                    "Mesh resolution must be at least 1, got {}",
                    resolution
                )));
            }
            MeshLayout::Uniform { .. } => {}
            MeshLayout::Vertices(vertices) => {
                Mesh1d::from_vertices(vertices.clone())?;
            }
        }
        if !(self.solver.tolerance > 0.0 && self.solver.tolerance.is_finite()) {
            return Err(Error::configuration(format!(
                "Solver tolerance must be positive and finite, got {}",
                self.solver.tolerance
            )));
        }
        if self.solver.max_iterations == Some(0) {
            return Err(Error::configuration("Solver iteration budget must be positive"));
        }
        if self.error_quadrature_points == Some(0) {
            return Err(Error::configuration(
                "Error quadrature must have at least one point",
            ));
        }
        // Also covers exact solutions that are singular at an end point
        let [left, right] = self.boundary_values()?;
        if !(left.is_finite() && right.is_finite()) {
            return Err(Error::configuration(format!(
                "Dirichlet values must be finite, got u(0) = {} and u(1) = {}",
                left, right
            )));
        }
        Ok(())
    }

    pub fn with_degree(self, degree: usize) -> Self {
        Self { degree, ..self }
    }

    /// Switches to a uniform mesh with the given resolution, discarding custom vertices.
    pub fn with_resolution(self, resolution: usize) -> Self {
        Self {
            mesh: MeshLayout::Uniform { resolution },
            ..self
        }
    }

    pub fn with_vertices(self, vertices: Vec<f64>) -> Self {
        Self {
            mesh: MeshLayout::Vertices(vertices),
            ..self
        }
    }

    pub fn with_node_distribution(self, node_distribution: NodeDistribution) -> Self {
        Self {
            node_distribution,
            ..self
        }
    }

    pub fn with_reaction(self, reaction: impl Into<ScalarFunction>) -> Self {
        Self {
            reaction: Some(reaction.into()),
            ..self
        }
    }

    pub fn with_exact_solution(self, exact_solution: ExactSolution) -> Self {
        Self {
            exact_solution: Some(exact_solution),
            ..self
        }
    }

    pub fn with_dirichlet(self, dirichlet: DirichletData) -> Self {
        Self { dirichlet, ..self }
    }

    pub fn with_error_quadrature_points(self, num_points: usize) -> Self {
        Self {
            error_quadrature_points: Some(num_points),
            ..self
        }
    }

    pub fn with_solver_settings(self, solver: SolverSettings) -> Self {
        Self { solver, ..self }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn mesh_layout(&self) -> &MeshLayout {
        &self.mesh
    }

    /// The resolution $N$, i.e. the number of elements minus one.
    pub fn resolution(&self) -> usize {
        match &self.mesh {
            MeshLayout::Uniform { resolution } => *resolution,
            MeshLayout::Vertices(vertices) => vertices.len().saturating_sub(2),
        }
    }

    pub fn node_distribution(&self) -> NodeDistribution {
        self.node_distribution
    }

    pub fn diffusion(&self) -> &ScalarFunction {
        &self.diffusion
    }

    pub fn forcing(&self) -> &ScalarFunction {
        &self.forcing
    }

    pub fn reaction(&self) -> Option<&ScalarFunction> {
        self.reaction.as_ref()
    }

    pub fn exact_solution(&self) -> Option<&ExactSolution> {
        self.exact_solution.as_ref()
    }

    pub fn dirichlet(&self) -> DirichletData {
        self.dirichlet
    }

    pub fn error_quadrature_points(&self) -> usize {
        self.error_quadrature_points.unwrap_or(self.degree + 2)
    }

    pub fn solver_settings(&self) -> &SolverSettings {
        &self.solver
    }

    pub fn build_mesh(&self) -> Result<Mesh1d, Error> {
        match &self.mesh {
            MeshLayout::Uniform { resolution } => Mesh1d::uniform(*resolution),
            MeshLayout::Vertices(vertices) => Mesh1d::from_vertices(vertices.clone()),
        }
    }

    /// The prescribed values $[u(0), u(1)]$.
    pub fn boundary_values(&self) -> Result<[f64; 2], Error> {
        match self.dirichlet {
            DirichletData::Homogeneous => Ok([0.0, 0.0]),
            DirichletData::Values { left, right } => Ok([left, right]),
            DirichletData::ExactSolution => {
                let u = self.exact_solution.as_ref().ok_or_else(|| {
                    Error::configuration(
                        "Dirichlet data is taken from the exact solution, but no exact solution is configured",
                    )
                })?;
                Ok([u.value(0.0), u.value(1.0)])
            }
        }
    }
}
