//! The solution pipeline for a single configuration.
use crate::assembly::global::{apply_dirichlet_bc_csr, CsrAssembler, VectorAssembler};
use crate::assembly::local::{ElementDiffusionReactionAssembler, ElementSourceAssembler};
use crate::config::ProblemConfig;
use crate::error::{compute_errors, ErrorNorms};
use crate::solve::solve_linear_system;
use crate::space::DiscretizationSpace;
use crate::Error;
use fem1d_sparse::CsrMatrix;
use log::info;
use nalgebra::DVector;
use serde::Serialize;

/// The assembled linear system, with Dirichlet conditions applied.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub matrix: CsrMatrix<f64>,
    pub rhs: DVector<f64>,
    /// Constrained DoFs and their prescribed values.
    pub boundary_values: Vec<(usize, f64)>,
}

/// A converged discrete solution.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    /// DoF coefficients of $u_h$ in global DoF order.
    pub coefficients: DVector<f64>,
    pub iterations: usize,
    /// True relative residual $\norm{b - A u} / \norm{b}$ of `coefficients`.
    pub relative_residual: f64,
}

/// A diffusion-reaction problem discretized on a fixed mesh.
#[derive(Debug, Clone)]
pub struct DiffusionReactionProblem {
    config: ProblemConfig,
    space: DiscretizationSpace,
}

impl DiffusionReactionProblem {
    /// Validates the configuration and sets up the mesh and discretization space.
    pub fn new(config: &ProblemConfig) -> Result<Self, Error> {
        config.validate()?;
        let mesh = config.build_mesh()?;
        let space = DiscretizationSpace::new(mesh, config.degree(), config.node_distribution())?;
        Ok(Self {
            config: config.clone(),
            space,
        })
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn space(&self) -> &DiscretizationSpace {
        &self.space
    }

    /// Assembles the system matrix and load vector and applies the Dirichlet conditions.
    pub fn assemble_system(&self) -> Result<LinearSystem, Error> {
        let space = &self.space;
        let matrix_assembler =
            ElementDiffusionReactionAssembler::new(space, self.config.diffusion()).with_reaction(self.config.reaction());
        let source_assembler = ElementSourceAssembler::new(space, self.config.forcing());

        let mut matrix = CsrAssembler::default().assemble(&matrix_assembler)?;
        let mut rhs = VectorAssembler::default().assemble_vector(&source_assembler)?;

        let [left, right] = self.config.boundary_values()?;
        let [left_dof, right_dof] = space.dof_map().boundary_dofs();
        let boundary_values = vec![(left_dof, left), (right_dof, right)];
        apply_dirichlet_bc_csr(&mut matrix, &mut rhs, &boundary_values)?;

        Ok(LinearSystem {
            matrix,
            rhs,
            boundary_values,
        })
    }

    pub fn solve(&self) -> Result<Solution, Error> {
        let system = self.assemble_system()?;
        let (coefficients, output) = solve_linear_system(
            &system.matrix,
            &system.rhs,
            &system.boundary_values,
            self.config.solver_settings(),
        )?;
        info!(
            "Solved problem with degree {} and {} elements ({} DoFs) in {} CG iterations",
            self.space.degree(),
            self.space.mesh().num_elements(),
            self.space.num_dofs(),
            output.num_iterations
        );
        Ok(Solution {
            coefficients,
            iterations: output.num_iterations,
            relative_residual: output.relative_residual(),
        })
    }

    /// Computes the error norms of the solution against the configured exact solution.
    pub fn compute_errors(&self, solution: &Solution) -> Result<ErrorNorms, Error> {
        compute_errors(
            &self.space,
            self.config.exact_solution(),
            &solution.coefficients,
            self.config.error_quadrature_points(),
        )
    }
}
