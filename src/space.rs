//! Continuous Lagrange finite element spaces on a [`Mesh1d`].
use crate::assembly::local::ElementConnectivityAssembler;
use crate::dof::DofMap;
use crate::element::{LagrangeBasis1d, NodeDistribution, SegmentElement};
use crate::mesh::Mesh1d;
use crate::quadrature::{QuadratureRule, QuadratureTable};
use crate::Error;
use nalgebra::DVector;

/// A continuous, piecewise polynomial space of degree $r$ on a mesh.
///
/// Each element carries the $r + 1$ nodal Lagrange basis functions of the reference segment,
/// mapped affinely to the element. The space also holds the quadrature table used for
/// assembly, which is a Gauss rule with $r + 1$ points (exact for polynomials of degree
/// $2r + 1$).
#[derive(Debug, Clone)]
pub struct DiscretizationSpace {
    mesh: Mesh1d,
    basis: LagrangeBasis1d,
    dof_map: DofMap,
    quadrature: QuadratureTable,
}

impl DiscretizationSpace {
    pub fn new(mesh: Mesh1d, degree: usize, distribution: NodeDistribution) -> Result<Self, Error> {
        let basis = LagrangeBasis1d::new(degree, distribution)?;
        let dof_map = DofMap::new(mesh.num_elements(), degree)?;
        let quadrature = QuadratureTable::from_basis_and_rule(&basis, QuadratureRule::gauss(degree + 1)?);
        Ok(Self {
            mesh,
            basis,
            dof_map,
            quadrature,
        })
    }

    pub fn mesh(&self) -> &Mesh1d {
        &self.mesh
    }

    pub fn basis(&self) -> &LagrangeBasis1d {
        &self.basis
    }

    pub fn dof_map(&self) -> &DofMap {
        &self.dof_map
    }

    pub fn degree(&self) -> usize {
        self.dof_map.degree()
    }

    pub fn num_dofs(&self) -> usize {
        self.dof_map.num_dofs()
    }

    /// The quadrature table used for assembly.
    pub fn quadrature_table(&self) -> &QuadratureTable {
        &self.quadrature
    }

    /// Tabulates the basis for a Gauss rule with the given number of points.
    pub fn gauss_quadrature_table(&self, num_points: usize) -> Result<QuadratureTable, Error> {
        Ok(QuadratureTable::from_basis_and_rule(
            &self.basis,
            QuadratureRule::gauss(num_points)?,
        ))
    }

    /// Returns `None` if the element index is out of bounds.
    pub fn element(&self, element_index: usize) -> Option<SegmentElement> {
        self.mesh.element(element_index)
    }

    /// Physical coordinates of all DoFs, in global DoF order.
    pub fn dof_coordinates(&self) -> Vec<f64> {
        let mut coords = vec![0.0; self.num_dofs()];
        for (e, element) in self.mesh.elements().enumerate() {
            for (global_index, &xi) in self.dof_map.element_dofs(e).zip(self.basis.nodes()) {
                coords[global_index] = element.map_reference_coords(xi);
            }
        }
        // Shared vertices are written twice; use the exact mesh vertices for those
        for (e, &vertex) in self.mesh.vertices().iter().enumerate() {
            coords[e * self.degree()] = vertex;
        }
        coords
    }

    /// Evaluates the finite element function with coefficients `u_h` at the physical point `x`.
    ///
    /// Returns `None` if `x` lies outside the mesh.
    ///
    /// # Panics
    ///
    /// Panics if the length of `u_h` does not match the number of DoFs.
    pub fn evaluate(&self, u_h: &DVector<f64>, x: f64) -> Option<f64> {
        assert_eq!(u_h.len(), self.num_dofs(), "Coefficient vector has wrong length");
        let element_index = self.mesh.find_element(x)?;
        let xi = self.element(element_index)?.map_physical_coords(x);
        let mut phi = vec![0.0; self.basis.num_nodes()];
        self.basis.populate_basis(&mut phi, xi);
        let dofs = self.dof_map.element_dofs(element_index);
        Some(phi.iter().zip(&u_h.as_slice()[dofs]).map(|(phi, u)| phi * u).sum())
    }

    /// Evaluates the derivative of the finite element function with coefficients `u_h` at `x`.
    ///
    /// At interior vertices, the derivative from the element on the right is returned.
    pub fn evaluate_derivative(&self, u_h: &DVector<f64>, x: f64) -> Option<f64> {
        assert_eq!(u_h.len(), self.num_dofs(), "Coefficient vector has wrong length");
        let element_index = self.mesh.find_element(x)?;
        let element = self.element(element_index)?;
        let xi = element.map_physical_coords(x);
        let mut dphi = vec![0.0; self.basis.num_nodes()];
        self.basis.populate_basis_gradients(&mut dphi, xi);
        let dofs = self.dof_map.element_dofs(element_index);
        let du_dxi: f64 = dphi.iter().zip(&u_h.as_slice()[dofs]).map(|(d, u)| d * u).sum();
        Some(du_dxi / element.reference_jacobian())
    }

    /// Interpolates the given function at the DoF nodes.
    pub fn interpolate(&self, u: impl Fn(f64) -> f64) -> DVector<f64> {
        DVector::from_iterator(self.num_dofs(), self.dof_coordinates().into_iter().map(u))
    }
}

impl ElementConnectivityAssembler for DiscretizationSpace {
    fn num_elements(&self) -> usize {
        self.dof_map.num_elements()
    }

    fn num_dofs(&self) -> usize {
        self.dof_map.num_dofs()
    }

    fn element_dof_count(&self, _element_index: usize) -> usize {
        self.dof_map.element_dof_count()
    }

    fn populate_element_dofs(&self, output: &mut [usize], element_index: usize) {
        for (out, global_index) in output.iter_mut().zip(self.dof_map.element_dofs(element_index)) {
            *out = global_index;
        }
    }
}
