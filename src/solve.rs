//! Solution of the assembled linear system by the Conjugate Gradient method.
use crate::config::{Preconditioner, SolverSettings};
use crate::Error;
use fem1d_sparse::cg::{CgOutput, ConjugateGradient, DiagonalOperator, RelativeResidualCriterion, SolveError};
use fem1d_sparse::CsrMatrix;
use log::debug;
use nalgebra::DVector;

/// Solves $A u = b$ for a symmetric positive definite system with Dirichlet constraints already
/// applied.
///
/// The initial guess is zero, except at the constrained DoFs where it takes the prescribed
/// values. After convergence, the constrained entries are set exactly to the prescribed values.
/// The solve succeeds only if the true relative residual $\norm{b - A u} / \norm{b}$ of the
/// returned vector is at most the configured tolerance.
pub fn solve_linear_system(
    matrix: &CsrMatrix<f64>,
    rhs: &DVector<f64>,
    constraints: &[(usize, f64)],
    settings: &SolverSettings,
) -> Result<(DVector<f64>, CgOutput<f64>), Error> {
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(Error::assembly(format!(
            "cannot solve {}x{} system with right-hand side of length {}",
            n,
            matrix.ncols(),
            rhs.len()
        )));
    }

    let mut u = DVector::zeros(n);
    for &(dof, value) in constraints {
        *u.get_mut(dof)
            .ok_or_else(|| Error::assembly(format!("boundary DoF {} is out of range", dof)))? = value;
    }

    let max_iter = settings.max_iterations_for(n);
    let criterion = RelativeResidualCriterion::new(settings.tolerance);
    let result = match settings.preconditioner {
        Preconditioner::Jacobi => {
            let jacobi = DiagonalOperator::jacobi(matrix).map_err(|kind| Error::SolverNonConvergence {
                iterations: 0,
                relative_residual: f64::NAN,
                reason: format!("cannot construct Jacobi preconditioner: {}", kind),
            })?;
            ConjugateGradient::new()
                .with_operator(matrix)
                .with_preconditioner(&jacobi)
                .with_stopping_criterion(criterion)
                .with_max_iter(max_iter)
                .solve_with_guess(rhs, &mut u)
        }
        Preconditioner::None => ConjugateGradient::new()
            .with_operator(matrix)
            .with_stopping_criterion(criterion)
            .with_max_iter(max_iter)
            .solve_with_guess(rhs, &mut u),
    };

    let mut output = result.map_err(|SolveError { output, kind, .. }| Error::SolverNonConvergence {
        iterations: output.num_iterations,
        relative_residual: output.relative_residual(),
        reason: kind.to_string(),
    })?;

    for &(dof, value) in constraints {
        u[dof] = value;
    }

    // Report the true residual of the vector that is actually returned
    output.residual_norm = (rhs - matrix * &u).norm();
    if !(output.relative_residual() <= settings.tolerance) {
        return Err(Error::SolverNonConvergence {
            iterations: output.num_iterations,
            relative_residual: output.relative_residual(),
            reason: "residual exceeds tolerance after imposing boundary values".to_string(),
        });
    }

    debug!(
        "CG converged in {} iterations (relative residual {:e}, {} unknowns)",
        output.num_iterations,
        output.relative_residual(),
        n
    );
    Ok((u, output))
}
