use crate::assembly::local::{ElementConnectivityAssembler, ElementMatrixAssembler, ElementVectorAssembler};
use crate::Error;
use fem1d_sparse::csr::{diag_iter, pattern_from_sorted_entries};
use fem1d_sparse::{CsrMatrix, CsrRowMut, SparsityPattern};
use log::debug;
use nalgebra::storage::Storage;
use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorViewMut, Dyn, Matrix, RealField, Scalar, U1};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// An assembler for CSR matrices.
#[derive(Debug, Clone)]
pub struct CsrAssembler<T: Scalar> {
    // All members are buffers that help prevent unnecessary allocations
    // when assembling multiple matrices with the same assembler
    workspace: RefCell<CsrAssemblerWorkspace<T>>,
}

impl<T: Scalar> Default for CsrAssembler<T> {
    fn default() -> Self {
        Self {
            workspace: RefCell::new(CsrAssemblerWorkspace::default()),
        }
    }
}

#[derive(Debug, Clone)]
struct CsrAssemblerWorkspace<T: Scalar> {
    connectivity_permutation: Vec<usize>,
    element_global_dofs: Vec<usize>,
    element_matrix: DMatrix<T>,
}

impl<T: Scalar> Default for CsrAssemblerWorkspace<T> {
    fn default() -> Self {
        Self {
            connectivity_permutation: Vec::new(),
            element_global_dofs: Vec::new(),
            element_matrix: DMatrix::from_row_slice(0, 0, &[]),
        }
    }
}

impl<T: Scalar> CsrAssembler<T> {
    /// Computes the sparsity pattern in which each element couples all of its DoFs.
    pub fn assemble_pattern<A>(&self, element_assembler: &A) -> Result<SparsityPattern, Error>
    where
        A: ?Sized + ElementConnectivityAssembler,
    {
        // By collecting into a BTreeSet we store each matrix entry exactly once, and obtain
        // the entries in the sorted order needed to build the pattern
        let mut matrix_entries = BTreeSet::new();
        let mut element_global_dofs = Vec::new();
        let num_dofs = element_assembler.num_dofs();
        for i in 0..element_assembler.num_elements() {
            let element_dof_count = element_assembler.element_dof_count(i);
            element_global_dofs.resize(element_dof_count, usize::MAX);
            element_assembler.populate_element_dofs(&mut element_global_dofs, i);

            if let Some(&dof) = element_global_dofs.iter().find(|&&dof| dof >= num_dofs) {
                return Err(Error::assembly(format!(
                    "element {} refers to DoF {}, but there are only {} DoFs",
                    i, dof, num_dofs
                )));
            }

            for &dof_i in &element_global_dofs {
                for &dof_j in &element_global_dofs {
                    matrix_entries.insert((dof_i, dof_j));
                }
            }
        }

        pattern_from_sorted_entries(num_dofs, num_dofs, matrix_entries)
            .map_err(|err| Error::assembly(format!("invalid sparsity pattern: {}", err)))
    }
}

impl<T: RealField + Copy> CsrAssembler<T> {
    pub fn assemble(&self, element_assembler: &dyn ElementMatrixAssembler<T>) -> Result<CsrMatrix<T>, Error> {
        let pattern = self.assemble_pattern(element_assembler)?;
        let initial_matrix_values = vec![T::zero(); pattern.nnz()];
        let mut matrix = CsrMatrix::try_from_pattern_and_values(pattern, initial_matrix_values)
            .map_err(|err| Error::assembly(format!("failed to create CSR matrix: {}", err)))?;
        self.assemble_into_csr(&mut matrix, element_assembler)?;
        debug!(
            "Assembled {}x{} CSR matrix with {} non-zeros",
            matrix.nrows(),
            matrix.ncols(),
            matrix.nnz()
        );
        Ok(matrix)
    }

    /// Adds the element contributions to the existing entries of the given matrix.
    ///
    /// The sparsity pattern of the matrix must contain all couplings between element DoFs.
    pub fn assemble_into_csr(
        &self,
        csr: &mut CsrMatrix<T>,
        element_assembler: &dyn ElementMatrixAssembler<T>,
    ) -> Result<(), Error> {
        let num_dofs = element_assembler.num_dofs();
        if csr.nrows() != num_dofs || csr.ncols() != num_dofs {
            return Err(Error::assembly(format!(
                "matrix has dimensions {}x{}, but there are {} DoFs",
                csr.nrows(),
                csr.ncols(),
                num_dofs
            )));
        }

        // Reuse previously allocated buffers
        let ws = &mut *self.workspace.borrow_mut();
        let connectivity_permutation = &mut ws.connectivity_permutation;
        let element_global_dofs = &mut ws.element_global_dofs;
        let element_matrix = &mut ws.element_matrix;

        for i in 0..element_assembler.num_elements() {
            let element_dof_count = element_assembler.element_dof_count(i);

            element_global_dofs.resize(element_dof_count, 0);
            element_matrix.resize_mut(element_dof_count, element_dof_count, T::zero());
            element_matrix.fill(T::zero());

            let matrix_view = DMatrixViewMut::from(&mut *element_matrix);
            element_assembler
                .assemble_element_matrix_into(i, matrix_view)
                .map_err(|err| Error::assembly(format!("failed to assemble element {}: {:#}", i, err)))?;
            element_assembler.populate_element_dofs(element_global_dofs, i);

            connectivity_permutation.clear();
            connectivity_permutation.extend(0..element_dof_count);
            connectivity_permutation.sort_unstable_by_key(|i| element_global_dofs[*i]);

            for (local_row_index, &global_row_index) in element_global_dofs.iter().enumerate() {
                let mut csr_row = csr.get_row_mut(global_row_index).ok_or_else(|| {
                    Error::assembly(format!("element {} refers to out-of-bounds DoF {}", i, global_row_index))
                })?;
                let a_row = element_matrix.row(local_row_index);
                add_element_row_to_csr_row(&mut csr_row, element_global_dofs, connectivity_permutation, &a_row)?;
            }
        }

        Ok(())
    }
}

/// An assembler for dense vectors.
#[derive(Debug, Clone)]
pub struct VectorAssembler<T: Scalar> {
    workspace: RefCell<VectorAssemblerWorkspace<T>>,
}

impl<T: Scalar> Default for VectorAssembler<T> {
    fn default() -> Self {
        Self {
            workspace: RefCell::new(VectorAssemblerWorkspace::default()),
        }
    }
}

#[derive(Debug, Clone)]
struct VectorAssemblerWorkspace<T: Scalar> {
    element_global_dofs: Vec<usize>,
    element_vector: DVector<T>,
}

impl<T: Scalar> Default for VectorAssemblerWorkspace<T> {
    fn default() -> Self {
        Self {
            element_global_dofs: Vec::new(),
            element_vector: DVector::from_column_slice(&[]),
        }
    }
}

impl<T: RealField + Copy> VectorAssembler<T> {
    pub fn assemble_vector(&self, element_assembler: &dyn ElementVectorAssembler<T>) -> Result<DVector<T>, Error> {
        let mut output = DVector::zeros(element_assembler.num_dofs());
        self.assemble_vector_into(&mut output, element_assembler)?;
        Ok(output)
    }

    /// Adds the element contributions to the given vector.
    pub fn assemble_vector_into<'a>(
        &self,
        output: impl Into<DVectorViewMut<'a, T>>,
        element_assembler: &dyn ElementVectorAssembler<T>,
    ) -> Result<(), Error> {
        let mut output = output.into();
        if output.len() != element_assembler.num_dofs() {
            return Err(Error::assembly(format!(
                "vector has length {}, but there are {} DoFs",
                output.len(),
                element_assembler.num_dofs()
            )));
        }

        let ws = &mut *self.workspace.borrow_mut();
        let element_global_dofs = &mut ws.element_global_dofs;
        let element_vector = &mut ws.element_vector;

        for i in 0..element_assembler.num_elements() {
            let element_dof_count = element_assembler.element_dof_count(i);
            element_global_dofs.resize(element_dof_count, 0);
            element_vector.resize_vertically_mut(element_dof_count, T::zero());
            element_vector.fill(T::zero());

            element_assembler
                .assemble_element_vector_into(i, DVectorViewMut::from(&mut *element_vector))
                .map_err(|err| Error::assembly(format!("failed to assemble element {}: {:#}", i, err)))?;
            element_assembler.populate_element_dofs(element_global_dofs, i);

            for (local_index, &global_index) in element_global_dofs.iter().enumerate() {
                let entry = output.get_mut(global_index).ok_or_else(|| {
                    Error::assembly(format!("element {} refers to out-of-bounds DoF {}", i, global_index))
                })?;
                *entry += element_vector[local_index];
            }
        }

        Ok(())
    }
}

/// Applies Dirichlet boundary conditions by symmetric elimination.
///
/// Each constraint `(k, g)` prescribes the value `g` for DoF `k`. For every unconstrained row
/// `i`, the coupling to the constrained DoF is moved to the right-hand side
/// ($b_i \leftarrow b_i - A_{ik} g$) and $A_{ik}$ is set to zero. Row $k$ is replaced by
/// $d u_k = d g$, where $d > 0$ is a representative scale of the diagonal. The resulting
/// matrix remains symmetric, and positive definite if the original operator is positive
/// definite on the unconstrained DoFs.
///
/// The sparsity pattern of the matrix must be symmetric.
pub fn apply_dirichlet_bc_csr<T>(
    matrix: &mut CsrMatrix<T>,
    rhs: &mut DVector<T>,
    constraints: &[(usize, T)],
) -> Result<(), Error>
where
    T: RealField + Copy,
{
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(Error::assembly(format!(
            "dimension mismatch between {}x{} matrix and right-hand side of length {}",
            n,
            matrix.ncols(),
            rhs.len()
        )));
    }

    let mut prescribed: Vec<Option<T>> = vec![None; n];
    for &(dof, value) in constraints {
        match prescribed.get(dof) {
            None => {
                return Err(Error::assembly(format!(
                    "boundary DoF {} is out of range for a system with {} DoFs",
                    dof, n
                )))
            }
            Some(Some(existing)) if *existing != value => {
                return Err(Error::assembly(format!("conflicting values prescribed for DoF {}", dof)));
            }
            _ => prescribed[dof] = Some(value),
        }
    }

    // Setting the diagonal to 1 would ignore the scaling of the entries of the matrix,
    // leading to potentially poor condition numbers. Use the mean magnitude of the diagonal instead
    let (diag_sum, diag_count) = diag_iter(matrix)
        .map(|a_ii| a_ii.abs())
        .filter(|a_ii| *a_ii > T::zero())
        .fold((T::zero(), T::zero()), |(sum, count), a_ii| (sum + a_ii, count + T::one()));
    let scale = if diag_count > T::zero() {
        diag_sum / diag_count
    } else {
        T::one()
    };

    // Zeroing all columns naively would require visiting every entry of the matrix. Instead,
    // by symmetry of the pattern, if row k has an entry in column i, then row i has an entry
    // in column k, so only those rows need to be visited.
    let mut rows_to_visit = vec![false; n];
    for (k, value) in prescribed.iter().enumerate() {
        if let Some(g) = *value {
            let mut row = matrix.row_mut(k);
            let (cols, values) = row.cols_and_values_mut();
            let mut has_diagonal = false;
            for (&col_idx, val) in cols.iter().zip(values) {
                if col_idx == k {
                    *val = scale;
                    has_diagonal = true;
                } else {
                    *val = T::zero();
                    rows_to_visit[col_idx] = true;
                }
            }
            if !has_diagonal {
                return Err(Error::assembly(format!(
                    "sparsity pattern has no diagonal entry for boundary DoF {}",
                    k
                )));
            }
            rhs[k] = scale * g;
        }
    }

    for i in (0..n).filter(|&i| rows_to_visit[i] && prescribed[i].is_none()) {
        let mut row = matrix.row_mut(i);
        let (cols, values) = row.cols_and_values_mut();
        for (&col_idx, val) in cols.iter().zip(values) {
            if let Some(g) = prescribed[col_idx] {
                rhs[i] -= *val * g;
                *val = T::zero();
            }
        }
    }

    Ok(())
}

/// Add a row of a local element matrix to the provided row of a CSR matrix.
///
/// `element_dofs`: The global indices of the element DoFs.
/// `sorted_permutation`: The local indices of DoFs in the element, ordered such that the
///    corresponding global indices are sorted.
/// `local_row`: The local row of the element matrix that should be added to the CSR matrix.
fn add_element_row_to_csr_row<T, S>(
    row: &mut CsrRowMut<T>,
    element_dofs: &[usize],
    sorted_permutation: &[usize],
    local_row: &Matrix<T, U1, Dyn, S>,
) -> Result<(), Error>
where
    T: RealField + Copy,
    S: Storage<T, U1, Dyn>,
{
    assert_eq!(element_dofs.len(), sorted_permutation.len());
    assert_eq!(element_dofs.len(), local_row.ncols());

    let (column_indices, values) = row.cols_and_values_mut();

    let mut csr_col_idx_iter = column_indices.iter().copied().enumerate();

    for &local_col_idx in sorted_permutation {
        let global_col_idx = element_dofs[local_col_idx];

        // Since both the CSR columns and the permuted element DoFs are sorted, a single
        // linear pass over the row finds all columns
        let (local_csr_col_idx, _) = csr_col_idx_iter
            .find(|(_, csr_col_idx)| *csr_col_idx == global_col_idx)
            .ok_or_else(|| Error::assembly(format!("column {} is not in the sparsity pattern", global_col_idx)))?;
        values[local_csr_col_idx] += local_row[local_col_idx];
    }

    Ok(())
}
