//! Convergence of the smooth benchmark problem
//!   -u'' = 4 pi^2 sin(2 pi x),  u(0) = u(1) = 0,
//! with exact solution u = sin(2 pi x).
use super::{assert_errors_decrease_monotonically, export_table};
use fem1d::cases;
use fem1d::config::{ProblemConfig, ProblemParameters};
use fem1d::convergence::{ConvergenceStudy, DEFAULT_RESOLUTIONS};
use fem1d::element::NodeDistribution;

fn assert_asymptotic_rates(config: ProblemConfig, name: &str) {
    let degree = config.degree();
    let table = ConvergenceStudy::new(config).run().unwrap();
    export_table(name, &table);
    println!("{}", table);

    assert_eq!(table.records().len(), DEFAULT_RESOLUTIONS.len());
    assert!(table.skipped().is_empty());
    assert_errors_decrease_monotonically(&table);

    let l2_rates = table.l2_rates();
    let h1_rates = table.h1_rates();
    let finest_l2_rate = l2_rates[l2_rates.len() - 1];
    let finest_h1_rate = h1_rates[h1_rates.len() - 1];
    assert!(
        (finest_l2_rate - (degree as f64 + 1.0)).abs() < 0.1,
        "L2 rate {} for degree {}",
        finest_l2_rate,
        degree
    );
    assert!(
        (finest_h1_rate - degree as f64).abs() < 0.1,
        "H1 rate {} for degree {}",
        finest_h1_rate,
        degree
    );
}

#[test]
fn smooth_linear_elements() {
    assert_asymptotic_rates(cases::smooth(1), "smooth_degree_1");
}

#[test]
fn smooth_quadratic_elements() {
    assert_asymptotic_rates(cases::smooth(2), "smooth_degree_2");
}

#[test]
fn smooth_quadratic_equispaced_elements() {
    assert_asymptotic_rates(
        cases::smooth(2).with_node_distribution(NodeDistribution::Equispaced),
        "smooth_degree_2_equispaced",
    );
}

#[test]
fn smooth_cubic_elements_on_coarse_meshes() {
    let table = ConvergenceStudy::new(cases::smooth(3))
        .with_resolutions(vec![9, 19, 39])
        .run()
        .unwrap();
    assert_errors_decrease_monotonically(&table);
    let rate = table.l2_rates()[1];
    assert!((rate - 4.0).abs() < 0.3, "L2 rate {}", rate);
}

#[test]
fn smooth_problem_from_parsed_parameters() {
    // The default parameters describe the same problem as expressions
    let config = ProblemConfig::from_parameters(&ProblemParameters::default()).unwrap();
    let parsed = ConvergenceStudy::new(config).run().unwrap();
    let closed_form = ConvergenceStudy::new(cases::smooth(1)).run().unwrap();
    for (a, b) in parsed.records().iter().zip(closed_form.records()) {
        assert_eq!(a.resolution, b.resolution);
        assert!((a.l2_error - b.l2_error).abs() <= 1e-6 * b.l2_error);
        assert!((a.h1_seminorm_error - b.h1_seminorm_error).abs() <= 1e-6 * b.h1_seminorm_error);
    }
}
