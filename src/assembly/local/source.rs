use crate::assembly::local::{ElementConnectivityAssembler, ElementVectorAssembler};
use crate::function::ScalarFunction;
use crate::quadrature::QuadratureTable;
use crate::space::DiscretizationSpace;
use eyre::eyre;
use nalgebra::DVectorViewMut;

/// Assembles element vectors of the load functional $\ell(v) = \int f v \, dx$.
pub struct ElementSourceAssembler<'a> {
    space: &'a DiscretizationSpace,
    source: &'a ScalarFunction,
    quadrature: &'a QuadratureTable,
}

impl<'a> ElementSourceAssembler<'a> {
    /// Creates an assembler that uses the quadrature table of the space.
    pub fn new(space: &'a DiscretizationSpace, source: &'a ScalarFunction) -> Self {
        Self {
            space,
            source,
            quadrature: space.quadrature_table(),
        }
    }

    pub fn with_quadrature_table(self, quadrature: &'a QuadratureTable) -> Self {
        Self { quadrature, ..self }
    }
}

impl<'a> ElementConnectivityAssembler for ElementSourceAssembler<'a> {
    fn num_elements(&self) -> usize {
        self.space.num_elements()
    }

    fn num_dofs(&self) -> usize {
        self.space.num_dofs()
    }

    fn element_dof_count(&self, element_index: usize) -> usize {
        self.space.element_dof_count(element_index)
    }

    fn populate_element_dofs(&self, output: &mut [usize], element_index: usize) {
        self.space.populate_element_dofs(output, element_index)
    }
}

impl<'a> ElementVectorAssembler<f64> for ElementSourceAssembler<'a> {
    fn assemble_element_vector_into(&self, element_index: usize, mut output: DVectorViewMut<f64>) -> eyre::Result<()> {
        let element = self
            .space
            .mesh()
            .element(element_index)
            .ok_or_else(|| eyre!("element index {} out of bounds", element_index))?;
        let n = self.space.element_dof_count(element_index);
        if output.len() != n {
            return Err(eyre!("element vector has length {}, expected {}", output.len(), n));
        }
        if self.quadrature.num_basis_functions() != n {
            return Err(eyre!(
                "quadrature table is tabulated for {} basis functions, but element has {}",
                self.quadrature.num_basis_functions(),
                n
            ));
        }

        let j = element.reference_jacobian();
        output.fill(0.0);
        for (weight, xi, phi, _) in self.quadrature.iter() {
            let x = element.map_reference_coords(xi);
            let w_f = weight * j.abs() * self.source.evaluate(x);
            for (b_i, phi_i) in output.iter_mut().zip(phi) {
                *b_i += w_f * phi_i;
            }
        }

        Ok(())
    }
}
