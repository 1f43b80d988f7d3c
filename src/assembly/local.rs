use nalgebra::{DMatrixViewMut, DVectorViewMut, Scalar};

mod diffusion_reaction;
mod source;

pub use diffusion_reaction::*;
pub use source::*;

/// Describes which global DoFs each element couples.
pub trait ElementConnectivityAssembler {
    fn num_elements(&self) -> usize;

    fn num_dofs(&self) -> usize;

    fn element_dof_count(&self, element_index: usize) -> usize;

    fn populate_element_dofs(&self, output: &mut [usize], element_index: usize);
}

pub trait ElementMatrixAssembler<T: Scalar>: ElementConnectivityAssembler {
    fn assemble_element_matrix_into(&self, element_index: usize, output: DMatrixViewMut<T>) -> eyre::Result<()>;
}

pub trait ElementVectorAssembler<T: Scalar>: ElementConnectivityAssembler {
    fn assemble_element_vector_into(&self, element_index: usize, output: DVectorViewMut<T>) -> eyre::Result<()>;
}
