use fem1d::function::{ExactSolution, ScalarFunction};
use fem1d::Error;
use matrixcompare::assert_scalar_eq;
use std::f64::consts::PI;

#[test]
fn constant_expressions_are_folded() {
    let mu = ScalarFunction::parse("mu", "2 * 3 + 1").unwrap();
    assert!(matches!(mu, ScalarFunction::Constant(c) if c == 7.0));
}

#[test]
fn expressions_evaluate_at_arbitrary_points() {
    let f = ScalarFunction::parse("f", "4*pi*pi*sin(2*pi*x)").unwrap();
    for &x in &[0.0, 0.1, 0.25, 0.6, 1.0] {
        let expected = 4.0 * PI * PI * (2.0 * PI * x).sin();
        assert_scalar_eq!(f.evaluate(x), expected, comp = abs, tol = 1e-12);
    }
}

#[test]
fn malformed_expression_is_reported_with_parameter_name() {
    let result = ScalarFunction::parse("exact_solution", "sin(2*pi*x");
    match result {
        Err(Error::Expression { parameter, .. }) => assert_eq!(parameter, "exact_solution"),
        other => panic!("expected expression error, got {:?}", other),
    }
    assert!(matches!(ScalarFunction::parse("f", "foo(x)"), Err(Error::Expression { .. })));
    assert!(matches!(ScalarFunction::parse("f", "y + 1"), Err(Error::Expression { .. })));
    assert!(matches!(ScalarFunction::parse("f", ""), Err(Error::Expression { .. })));
}

#[test]
fn evaluation_does_not_fail_for_finite_points() {
    let f = ScalarFunction::parse("f", "1 / x").unwrap();
    assert_eq!(f.evaluate(0.0), f64::INFINITY);
    let g = ScalarFunction::parse("f", "sqrt(x - 1)").unwrap();
    assert!(g.evaluate(0.0).is_nan());
}

#[test]
fn exact_solution_derivative_is_symbolic() {
    let u = ScalarFunction::parse("exact_solution", "sin(2*pi*x)").unwrap();
    let exact = ExactSolution::from_function(u).unwrap();
    for &x in &[0.0, 0.3, 0.7] {
        assert_scalar_eq!(exact.value(x), (2.0 * PI * x).sin(), comp = abs, tol = 1e-13);
        assert_scalar_eq!(exact.derivative(x), 2.0 * PI * (2.0 * PI * x).cos(), comp = abs, tol = 1e-12);
    }
}

#[test]
fn closed_form_exact_solution_needs_explicit_derivative() {
    fn u(x: f64) -> f64 {
        x * x
    }
    let result = ExactSolution::from_function(ScalarFunction::ClosedForm(u));
    assert!(matches!(result, Err(Error::Configuration(_))));
}
