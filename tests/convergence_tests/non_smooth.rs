//! Convergence for a problem whose exact solution has limited regularity at x = 1/2.
use super::{assert_errors_decrease_monotonically, export_table};
use fem1d::cases;
use fem1d::config::SolverSettings;
use fem1d::convergence::{ConvergenceStudy, SweepPolicy};
use fem1d::Error;

#[test]
fn non_smooth_linear_elements() {
    let table = ConvergenceStudy::new(cases::non_smooth(1)).run().unwrap();
    export_table("non_smooth_degree_1", &table);
    assert_errors_decrease_monotonically(&table);

    let l2_rate = *table.l2_rates().last().unwrap();
    let h1_rate = *table.h1_rates().last().unwrap();
    assert!(l2_rate > 1.8, "L2 rate {}", l2_rate);
    assert!(h1_rate > 0.9, "H1 rate {}", h1_rate);
}

#[test]
fn non_smooth_quadratic_elements() {
    let table = ConvergenceStudy::new(cases::non_smooth(2))
        .with_resolutions(vec![9, 19, 39, 79])
        .run()
        .unwrap();
    assert_errors_decrease_monotonically(&table);
}

#[test]
fn failed_resolutions_are_skipped_or_abort_the_study() {
    let config = cases::non_smooth(1).with_solver_settings(SolverSettings {
        max_iterations: Some(30),
        ..Default::default()
    });

    let study = ConvergenceStudy::new(config).with_resolutions(vec![9, 79]);
    match study.run() {
        Err(Error::SolverNonConvergence { iterations, .. }) => assert_eq!(iterations, 30),
        other => panic!("expected solver failure, got {:?}", other),
    }

    let table = study.with_policy(SweepPolicy::SkipFailed).run().unwrap();
    assert_eq!(table.records().len(), 1);
    assert_eq!(table.records()[0].resolution, 9);
    assert_eq!(table.skipped().len(), 1);
    assert_eq!(table.skipped()[0].resolution, 79);
    assert_eq!(table.skipped()[0].iterations, 30);
    assert!(table.to_string().contains("skipped"));
}

#[test]
fn study_without_exact_solution_is_rejected() {
    let result = ConvergenceStudy::new(cases::piecewise_forcing(1)).run();
    assert!(matches!(result, Err(Error::MissingExactSolution)));
}
