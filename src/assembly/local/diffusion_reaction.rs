use crate::assembly::local::{ElementConnectivityAssembler, ElementMatrixAssembler};
use crate::function::ScalarFunction;
use crate::quadrature::QuadratureTable;
use crate::space::DiscretizationSpace;
use eyre::eyre;
use nalgebra::DMatrixViewMut;

/// Assembles element matrices of the bilinear form
/// $$ a(u, v) = \int \mu u' v' \, dx + \int \sigma u v \, dx. $$
///
/// The reaction term is omitted entirely if no reaction coefficient is given.
pub struct ElementDiffusionReactionAssembler<'a> {
    space: &'a DiscretizationSpace,
    diffusion: &'a ScalarFunction,
    reaction: Option<&'a ScalarFunction>,
    quadrature: &'a QuadratureTable,
}

impl<'a> ElementDiffusionReactionAssembler<'a> {
    /// Creates an assembler that uses the quadrature table of the space.
    pub fn new(space: &'a DiscretizationSpace, diffusion: &'a ScalarFunction) -> Self {
        Self {
            space,
            diffusion,
            reaction: None,
            quadrature: space.quadrature_table(),
        }
    }

    pub fn with_reaction(self, reaction: Option<&'a ScalarFunction>) -> Self {
        Self { reaction, ..self }
    }

    pub fn with_quadrature_table(self, quadrature: &'a QuadratureTable) -> Self {
        Self { quadrature, ..self }
    }
}

impl<'a> ElementConnectivityAssembler for ElementDiffusionReactionAssembler<'a> {
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

impl<'a> ElementMatrixAssembler<f64> for ElementDiffusionReactionAssembler<'a> {
    fn assemble_element_matrix_into(&self, element_index: usize, mut output: DMatrixViewMut<f64>) -> eyre::Result<()> {
        let element = self
            .space
            .mesh()
            .element(element_index)
            .ok_or_else(|| eyre!("element index {} out of bounds", element_index))?;
        let n = self.space.element_dof_count(element_index);
        if output.nrows() != n || output.ncols() != n {
            return Err(eyre!(
                "element matrix has dimensions {}x{}, expected {}x{}",
                output.nrows(),
                output.ncols(),
                n,
                n
            ));
        }
        if self.quadrature.num_basis_functions() != n {
            return Err(eyre!(
                "quadrature table is tabulated for {} basis functions, but element has {}",
                self.quadrature.num_basis_functions(),
                n
            ));
        }

        let j = element.reference_jacobian();
        if !(j > 0.0) {
            return Err(eyre!("element {} is degenerate", element_index));
        }
        let j_inv = 1.0 / j;

        output.fill(0.0);
        for (weight, xi, phi, phi_grad_ref) in self.quadrature.iter() {
            let x = element.map_reference_coords(xi);
            let w = weight * j;
            let mu = self.diffusion.evaluate(x);
            let sigma = self.reaction.map(|sigma| sigma.evaluate(x));

            // Only compute the upper triangle and mirror it, so that the result is exactly symmetric
            for i in 0..n {
                let dphi_i = phi_grad_ref[i] * j_inv;
                for k in i..n {
                    let dphi_k = phi_grad_ref[k] * j_inv;
                    let mut a_ik = mu * dphi_i * dphi_k;
                    if let Some(sigma) = sigma {
                        a_ik += sigma * phi[i] * phi[k];
                    }
                    output[(i, k)] += w * a_ik;
                    if k != i {
                        output[(k, i)] += w * a_ik;
                    }
                }
            }
        }

        Ok(())
    }
}
