//! Helpers for CSR matrices that are not (yet) part of `nalgebra-sparse`.
use nalgebra::RealField;
use nalgebra_sparse::pattern::{SparsityPattern, SparsityPatternFormatError};
use nalgebra_sparse::{CsrMatrix, SparseEntry};

/// Iterates over the diagonal entries of a square CSR matrix.
///
/// Diagonal entries that are not explicitly stored are reported as zero.
pub fn diag_iter<'a, T>(matrix: &'a CsrMatrix<T>) -> impl 'a + Iterator<Item = T>
where
    T: RealField + Copy,
{
    matrix.row_iter().enumerate().map(|(i, row)| {
        row.get_entry(i)
            .map(SparseEntry::into_value)
            .unwrap_or_else(T::zero)
    })
}

/// Returns $\max_{ij} |A_{ij} - A_{ji}|$ over all explicitly stored entries.
///
/// A return value of zero means that the matrix is exactly symmetric.
pub fn max_symmetry_defect<T>(matrix: &CsrMatrix<T>) -> T
where
    T: RealField + Copy,
{
    matrix
        .triplet_iter()
        .map(|(i, j, &a_ij)| {
            let a_ji = matrix
                .get_entry(j, i)
                .map(SparseEntry::into_value)
                .unwrap_or_else(T::zero);
            (a_ij - a_ji).abs()
        })
        .fold(T::zero(), |max, defect| max.max(defect))
}

/// Builds a sparsity pattern from `(row, col)` entries that are sorted lexicographically and
/// contain no duplicates.
pub fn pattern_from_sorted_entries(
    num_rows: usize,
    num_cols: usize,
    entries: impl IntoIterator<Item = (usize, usize)>,
) -> Result<SparsityPattern, SparsityPatternFormatError> {
    let entries = entries.into_iter();
    let mut offsets = Vec::with_capacity(num_rows + 1);
    let mut column_indices = Vec::with_capacity(entries.size_hint().0);

    offsets.push(0);
    for (i, j) in entries {
        while i + 1 > offsets.len() {
            // This condition indicates that we have reached a new row. We need to run this
            // in a while loop to correctly handle consecutive empty rows
            offsets.push(column_indices.len());
        }
        column_indices.push(j);
    }

    // Make sure we fill out the remaining offsets if the last rows are empty
    while offsets.len() < (num_rows + 1) {
        offsets.push(column_indices.len());
    }

    SparsityPattern::try_from_offsets_and_indices(num_rows, num_cols, offsets, column_indices)
}
