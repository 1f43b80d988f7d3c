use fem1d_quadrature::integrate;
use fem1d_quadrature::univariate::{gauss, try_gauss, try_gauss_lobatto};
use fem1d_quadrature::Error;

use matrixcompare::assert_scalar_eq;

fn monomial_integral(alpha: i32) -> f64 {
    (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0)
}

#[test]
fn gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=200 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = gauss(n);

        // Also test that weights are positive
        assert!(rule.0.iter().all(|&w| w > 0.0));

        // Integrate all monomials of degree <= expected polynomial degree that can be
        // exactly integrated
        for alpha in 0..=expected_polynomial_degree as i32 {
            let estimated_integral = integrate(&rule, |x| x[0].powi(alpha));
            assert_scalar_eq!(estimated_integral, monomial_integral(alpha), comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn try_gauss_rejects_empty_rule() {
    assert_eq!(try_gauss(0), Err(Error::NoRuleAvailable));
    assert_eq!(try_gauss(3).unwrap(), gauss(3));
}

#[test]
fn gauss_lobatto_rules_satisfy_expected_accuracy() {
    assert!(try_gauss_lobatto(0).is_none());
    assert!(try_gauss_lobatto(1).is_none());

    let available_n = (2..=32).chain([48, 64]);

    for n in available_n {
        let expected_polynomial_degree = 2 * n - 3;
        let rule = try_gauss_lobatto(n).unwrap();
        assert_eq!(rule.0.len(), n);
        assert_eq!(rule.1.len(), n);

        // Check that rule contains endpoints, like Gauss-Lobatto should
        assert_eq!(rule.1.first().unwrap(), &[-1.0]);
        assert_eq!(rule.1.last().unwrap(), &[1.0]);

        // Points must be strictly ascending
        assert!(rule.1.windows(2).all(|pair| pair[0][0] < pair[1][0]));

        // Also test that weights are positive
        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=expected_polynomial_degree as i32 {
            let estimated_integral = integrate(&rule, |x| x[0].powi(alpha));
            assert_scalar_eq!(estimated_integral, monomial_integral(alpha), comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_lobatto_small_rules_match_closed_form() {
    // Trapezoidal rule
    let (weights, points) = try_gauss_lobatto(2).unwrap();
    assert_eq!(points, vec![[-1.0], [1.0]]);
    assert_eq!(weights, vec![1.0, 1.0]);

    // Simpson's rule
    let (weights, points) = try_gauss_lobatto(3).unwrap();
    assert_eq!(points, vec![[-1.0], [0.0], [1.0]]);
    assert_scalar_eq!(weights[0], 1.0 / 3.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(weights[1], 4.0 / 3.0, comp = abs, tol = 1e-15);

    // Four points: interior points at +-1/sqrt(5)
    let (weights, points) = try_gauss_lobatto(4).unwrap();
    let x = 1.0 / 5.0f64.sqrt();
    assert_scalar_eq!(points[1][0], -x, comp = abs, tol = 1e-15);
    assert_scalar_eq!(points[2][0], x, comp = abs, tol = 1e-15);
    assert_scalar_eq!(weights[1], 5.0 / 6.0, comp = abs, tol = 1e-14);
}
