use crate::export_solution_vtk;
use fem1d::config::{DirichletData, Preconditioner, ProblemConfig, SolverSettings};
use fem1d::function::{ExactSolution, ScalarFunction};
use fem1d::problem::DiffusionReactionProblem;
use fem1d::solve::solve_linear_system;
use fem1d::cases;
use fem1d::Error;
use fem1d_sparse::csr::max_symmetry_defect;
use matrixcompare::assert_scalar_eq;
use util::assert_scalar_approx_eq;

fn expression(text: &str) -> ScalarFunction {
    ScalarFunction::parse("test", text).unwrap()
}

fn exact(u: &str) -> ExactSolution {
    ExactSolution::from_function(expression(u)).unwrap()
}

#[test]
fn homogeneous_problem_without_forcing_has_trivial_solution() {
    let config = ProblemConfig::new(1, 9, 1.0, 0.0);
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();
    assert_eq!(solution.coefficients.len(), 11);
    assert!(solution.coefficients.iter().all(|&u| u == 0.0));
}

#[test]
fn quadratic_solution_is_reproduced_by_quadratic_elements() {
    // -u'' = -2 with u = 1 + x^2, so u(0) = 1 and u(1) = 2
    for degree in 2..=4 {
        let config = ProblemConfig::new(degree, 5, 1.0, -2.0)
            .with_exact_solution(exact("1 + x^2"))
            .with_dirichlet(DirichletData::ExactSolution);
        let problem = DiffusionReactionProblem::new(&config).unwrap();
        let solution = problem.solve().unwrap();
        let errors = problem.compute_errors(&solution).unwrap();
        assert!(errors.l2 < 1e-8, "degree {}: L2 error {:e}", degree, errors.l2);
        assert!(errors.h1_seminorm < 1e-7, "degree {}: H1 error {:e}", degree, errors.h1_seminorm);

        if degree == 2 {
            export_solution_vtk(
                "quadratic_solution_is_reproduced_by_quadratic_elements",
                "solution",
                problem.space(),
                &solution.coefficients,
            );
        }
    }
}

#[test]
fn linear_elements_are_exact_at_the_nodes() {
    // -u'' = 2 with u = x (1 - x)
    let config = ProblemConfig::new(1, 7, 1.0, 2.0);
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();
    for (x, u_h) in problem.space().dof_coordinates().iter().zip(solution.coefficients.iter()) {
        assert_scalar_eq!(*u_h, x * (1.0 - x), comp = abs, tol = 1e-10);
    }
}

#[test]
fn reaction_term_with_polynomial_solution() {
    // -u'' + (1 + x) u = f with u = x^2 - x / 2
    let u = "x^2 - x / 2";
    let f = "-2 + (1 + x) * (x^2 - x / 2)";
    let config = ProblemConfig::new(2, 4, 1.0, expression(f))
        .with_reaction(expression("1 + x"))
        .with_exact_solution(exact(u))
        .with_dirichlet(DirichletData::ExactSolution);
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();
    let errors = problem.compute_errors(&solution).unwrap();
    assert!(errors.l2 < 1e-8);
    assert!(errors.h1_seminorm < 1e-7);
}

#[test]
fn variable_diffusion_with_linear_solution() {
    // -((1 + x) u')' = -1 with u = x
    let config = ProblemConfig::new(1, 6, expression("1 + x"), -1.0)
        .with_exact_solution(exact("x"))
        .with_dirichlet(DirichletData::ExactSolution);
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();
    let errors = problem.compute_errors(&solution).unwrap();
    assert!(errors.l2 < 1e-8);
    assert!(errors.h1_seminorm < 1e-7);
}

#[test]
fn boundary_dofs_equal_prescribed_values_after_solve() {
    let config = ProblemConfig::new(3, 12, 1.0, expression("sin(3 * x)"))
        .with_dirichlet(DirichletData::Values { left: 0.3, right: -2.5 });
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();
    let u = &solution.coefficients;
    assert_eq!(u[0], 0.3);
    assert_eq!(u[u.len() - 1], -2.5);
}

#[test]
fn system_after_boundary_conditions_is_symmetric_positive_definite() {
    let config = ProblemConfig::new(4, 9, expression("2 + cos(x)"), 1.0).with_reaction(expression("x"));
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let system = problem.assemble_system().unwrap();
    assert_eq!(max_symmetry_defect(&system.matrix), 0.0);

    let (_, output) = solve_linear_system(
        &system.matrix,
        &system.rhs,
        &system.boundary_values,
        &SolverSettings::default(),
    )
    .unwrap();
    assert!(output.relative_residual() <= SolverSettings::default().tolerance);
}

#[test]
fn unpreconditioned_and_jacobi_solutions_agree() {
    let base = ProblemConfig::new(2, 19, expression("1 + x^2"), expression("exp(x)"));
    let jacobi = DiffusionReactionProblem::new(&base).unwrap().solve().unwrap();
    let unpreconditioned = DiffusionReactionProblem::new(&base.clone().with_solver_settings(SolverSettings {
        preconditioner: Preconditioner::None,
        ..Default::default()
    }))
    .unwrap()
    .solve()
    .unwrap();
    for (a, b) in jacobi.coefficients.iter().zip(unpreconditioned.coefficients.iter()) {
        assert_scalar_approx_eq!(*a, *b, abstol = 1e-8);
    }
}

#[test]
fn exceeding_iteration_budget_is_reported() {
    let config = ProblemConfig::new(1, 50, 1.0, 1.0).with_solver_settings(SolverSettings {
        max_iterations: Some(2),
        ..Default::default()
    });
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    match problem.solve() {
        Err(Error::SolverNonConvergence {
            iterations,
            relative_residual,
            ..
        }) => {
            assert_eq!(iterations, 2);
            assert!(relative_residual > 1e-12);
        }
        other => panic!("expected solver failure, got {:?}", other),
    }
}

#[test]
fn returned_solution_satisfies_tolerance_on_true_residual() {
    for (degree, resolution) in [(1, 639), (2, 319), (3, 159)] {
        for preconditioner in [Preconditioner::Jacobi, Preconditioner::None] {
            let settings = SolverSettings {
                preconditioner,
                ..Default::default()
            };
            let config = cases::smooth(degree)
                .with_resolution(resolution)
                .with_solver_settings(settings.clone());
            let problem = DiffusionReactionProblem::new(&config).unwrap();
            let system = problem.assemble_system().unwrap();
            let solution = problem.solve().unwrap();

            let residual = &system.rhs - &system.matrix * &solution.coefficients;
            let relative_residual = residual.norm() / system.rhs.norm();
            assert!(
                relative_residual <= settings.tolerance,
                "degree {}, N = {}, {:?}: relative residual {:e}",
                degree,
                resolution,
                preconditioner,
                relative_residual
            );
            assert_scalar_approx_eq!(solution.relative_residual, relative_residual, reltol = 1e-6);
        }
    }
}

#[test]
fn unattainable_tolerance_is_reported_as_non_convergence() {
    let config = cases::smooth(3)
        .with_resolution(319)
        .with_solver_settings(SolverSettings {
            tolerance: 1e-15,
            max_iterations: Some(5000),
            ..Default::default()
        });
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    assert!(matches!(problem.solve(), Err(Error::SolverNonConvergence { .. })));
}
