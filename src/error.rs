//! Functionality for error estimation.
use crate::element::SegmentElement;
use crate::function::ExactSolution;
use crate::quadrature::QuadratureTable;
use crate::space::DiscretizationSpace;
use crate::Error;
use itertools::izip;
use nalgebra::{DVector, DVectorView};
use serde::{Deserialize, Serialize};

/// Estimate the squared $L^2$ error $\norm{u_h - u}^2_{L^2}$ on the given element, with the basis
/// tabulated at the quadrature points of the given table.
///
/// # Panics
///
/// Panics if the length of `u_h_element` does not match the number of basis functions in the table.
#[allow(non_snake_case)]
pub fn estimate_element_L2_error_squared(
    element: &SegmentElement,
    u: impl Fn(f64) -> f64,
    u_h_element: DVectorView<f64>,
    quadrature: &QuadratureTable,
) -> f64 {
    assert_eq!(u_h_element.len(), quadrature.num_basis_functions());
    let j_abs = element.reference_jacobian().abs();

    let mut result = 0.0;
    for (w, xi, phi, _) in quadrature.iter() {
        let x = element.map_reference_coords(xi);
        let u_h: f64 = izip!(phi, u_h_element.iter()).map(|(phi, u)| phi * u).sum();
        let error = u_h - u(x);
        result += w * error * error * j_abs;
    }
    result
}

/// Estimate the squared $H^1$ *seminorm* error $\seminorm{u_h - u}^2_{H^1}$ on the given element.
///
/// # Panics
///
/// Panics if the length of `u_h_element` does not match the number of basis functions in the table.
#[allow(non_snake_case)]
pub fn estimate_element_H1_seminorm_error_squared(
    element: &SegmentElement,
    u_derivative: impl Fn(f64) -> f64,
    u_h_element: DVectorView<f64>,
    quadrature: &QuadratureTable,
) -> f64 {
    assert_eq!(u_h_element.len(), quadrature.num_basis_functions());
    let j = element.reference_jacobian();
    let j_abs = j.abs();
    let j_inv = 1.0 / j;

    let mut result = 0.0;
    for (w, xi, _, phi_grad_ref) in quadrature.iter() {
        let x = element.map_reference_coords(xi);
        let du_h_dxi: f64 = izip!(phi_grad_ref, u_h_element.iter())
            .map(|(dphi, u)| dphi * u)
            .sum();
        let error = du_h_dxi * j_inv - u_derivative(x);
        result += w * error * error * j_abs;
    }
    result
}

/// Neumaier's variant of compensated summation.
#[derive(Debug, Default, Copy, Clone)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

fn sum_over_elements(
    space: &DiscretizationSpace,
    u_h: &DVector<f64>,
    element_contribution: impl Fn(&SegmentElement, DVectorView<f64>) -> f64,
) -> Result<f64, Error> {
    if u_h.len() != space.num_dofs() {
        return Err(Error::assembly(format!(
            "solution vector has length {}, but the space has {} DoFs",
            u_h.len(),
            space.num_dofs()
        )));
    }

    let mut sum = CompensatedSum::default();
    for (e, element) in space.mesh().elements().enumerate() {
        let dofs = space.dof_map().element_dofs(e);
        let u_h_element = DVectorView::from_slice(&u_h.as_slice()[dofs.clone()], dofs.len());
        sum.add(element_contribution(&element, u_h_element));
    }
    Ok(sum.total())
}

/// Estimate the $L^2$ error $\norm{u_h - u}_{L^2}$ over the whole domain.
#[allow(non_snake_case)]
pub fn estimate_L2_error(
    space: &DiscretizationSpace,
    u: impl Fn(f64) -> f64,
    u_h: &DVector<f64>,
    quadrature: &QuadratureTable,
) -> Result<f64, Error> {
    check_quadrature(space, quadrature)?;
    let squared = sum_over_elements(space, u_h, |element, u_h_element| {
        estimate_element_L2_error_squared(element, &u, u_h_element, quadrature)
    })?;
    Ok(squared.sqrt())
}

/// Estimate the $H^1$ *seminorm* error $\seminorm{u_h - u}_{H^1}$ over the whole domain.
#[allow(non_snake_case)]
pub fn estimate_H1_seminorm_error(
    space: &DiscretizationSpace,
    u_derivative: impl Fn(f64) -> f64,
    u_h: &DVector<f64>,
    quadrature: &QuadratureTable,
) -> Result<f64, Error> {
    check_quadrature(space, quadrature)?;
    let squared = sum_over_elements(space, u_h, |element, u_h_element| {
        estimate_element_H1_seminorm_error_squared(element, &u_derivative, u_h_element, quadrature)
    })?;
    Ok(squared.sqrt())
}

fn check_quadrature(space: &DiscretizationSpace, quadrature: &QuadratureTable) -> Result<(), Error> {
    if quadrature.num_basis_functions() != space.basis().num_nodes() {
        return Err(Error::assembly(format!(
            "quadrature table is tabulated for {} basis functions, but the space has {} per element",
            quadrature.num_basis_functions(),
            space.basis().num_nodes()
        )));
    }
    Ok(())
}

/// $L^2$ and $H^1$ seminorm errors of a discrete solution.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNorms {
    pub l2: f64,
    pub h1_seminorm: f64,
}

/// Computes both error norms of `u_h` against the exact solution, using a Gauss rule with
/// `num_points` points per element.
pub fn compute_errors(
    space: &DiscretizationSpace,
    exact_solution: Option<&ExactSolution>,
    u_h: &DVector<f64>,
    num_points: usize,
) -> Result<ErrorNorms, Error> {
    let exact_solution = exact_solution.ok_or(Error::MissingExactSolution)?;
    let quadrature = space.gauss_quadrature_table(num_points)?;
    Ok(ErrorNorms {
        l2: estimate_L2_error(space, |x| exact_solution.value(x), u_h, &quadrature)?,
        h1_seminorm: estimate_H1_seminorm_error(space, |x| exact_solution.derivative(x), u_h, &quadrature)?,
    })
}
