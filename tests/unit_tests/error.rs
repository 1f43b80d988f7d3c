use fem1d::element::{NodeDistribution, SegmentElement};
use fem1d::error::{
    compute_errors, estimate_H1_seminorm_error, estimate_L2_error, estimate_element_H1_seminorm_error_squared,
    estimate_element_L2_error_squared,
};
use fem1d::function::{ExactSolution, ScalarFunction};
use fem1d::mesh::Mesh1d;
use fem1d::nalgebra::{DVector, DVectorView};
use fem1d::space::DiscretizationSpace;
use fem1d::Error;
use matrixcompare::assert_scalar_eq;
use std::f64::consts::PI;

fn space(resolution: usize, degree: usize) -> DiscretizationSpace {
    DiscretizationSpace::new(Mesh1d::uniform(resolution).unwrap(), degree, NodeDistribution::default()).unwrap()
}

#[test]
#[allow(non_snake_case)]
fn element_L2_error_of_linear_interpolant() {
    // u_h = 0 on [0, 2], u = x: the squared error is the integral of x^2, i.e. 8 / 3
    let space = space(1, 1);
    let element = SegmentElement::from_interval([0.0, 2.0]);
    let quadrature = space.gauss_quadrature_table(2).unwrap();
    let u_h_element = DVector::zeros(2);
    let error_squared = estimate_element_L2_error_squared(&element, |x| x, DVectorView::from(&u_h_element), &quadrature);
    assert_scalar_eq!(error_squared, 8.0 / 3.0, comp = abs, tol = 1e-14);

    // u_h = u at the vertices gives zero error
    let u_h_element = DVector::from_column_slice(&[0.0, 2.0]);
    let error_squared = estimate_element_L2_error_squared(&element, |x| x, DVectorView::from(&u_h_element), &quadrature);
    assert_scalar_eq!(error_squared, 0.0, comp = abs, tol = 1e-14);
}

#[test]
#[allow(non_snake_case)]
fn element_H1_error_uses_physical_derivatives() {
    // u_h = x on [1, 4] as a linear function, u = 0: the squared seminorm error is 3
    let space = space(1, 1);
    let element = SegmentElement::from_interval([1.0, 4.0]);
    let quadrature = space.gauss_quadrature_table(2).unwrap();
    let u_h_element = DVector::from_column_slice(&[1.0, 4.0]);
    let error_squared =
        estimate_element_H1_seminorm_error_squared(&element, |_| 0.0, DVectorView::from(&u_h_element), &quadrature);
    assert_scalar_eq!(error_squared, 3.0, comp = abs, tol = 1e-13);
}

#[test]
#[allow(non_snake_case)]
fn global_errors_of_zero_function() {
    let space = space(6, 2);
    let quadrature = space.gauss_quadrature_table(6).unwrap();
    let u_h = DVector::zeros(space.num_dofs());

    // ||sin(2 pi x)||_L2 = 1 / sqrt(2), |sin(2 pi x)|_H1 = sqrt(2) pi
    let L2_error = estimate_L2_error(&space, |x| (2.0 * PI * x).sin(), &u_h, &quadrature).unwrap();
    let H1_error = estimate_H1_seminorm_error(&space, |x| 2.0 * PI * (2.0 * PI * x).cos(), &u_h, &quadrature).unwrap();
    assert_scalar_eq!(L2_error, 0.5f64.sqrt(), comp = abs, tol = 1e-6);
    assert_scalar_eq!(H1_error, 2.0f64.sqrt() * PI, comp = abs, tol = 1e-5);
}

#[test]
fn interpolant_of_polynomial_in_space_has_no_error() {
    let space = space(4, 3);
    let u = ExactSolution::from_function(ScalarFunction::parse("u", "x^3 - 2*x + 1").unwrap()).unwrap();
    let u_h = space.interpolate(|x| u.value(x));
    let errors = compute_errors(&space, Some(&u), &u_h, 5).unwrap();
    assert!(errors.l2 < 1e-13);
    assert!(errors.h1_seminorm < 1e-12);
}

#[test]
fn error_query_without_exact_solution_fails() {
    let space = space(4, 1);
    let u_h = DVector::zeros(space.num_dofs());
    assert!(matches!(
        compute_errors(&space, None, &u_h, 3),
        Err(Error::MissingExactSolution)
    ));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let space = space(4, 2);
    let u = ExactSolution::new(ScalarFunction::Constant(1.0), ScalarFunction::Constant(0.0));
    let u_h = DVector::zeros(space.num_dofs() + 1);
    assert!(matches!(compute_errors(&space, Some(&u), &u_h, 3), Err(Error::Assembly(_))));
    let u_h = DVector::zeros(space.num_dofs());
    assert!(matches!(compute_errors(&space, Some(&u), &u_h, 0), Err(Error::Configuration(_))));
}
