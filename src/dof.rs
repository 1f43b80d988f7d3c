//! Enumeration of degrees of freedom.
use crate::Error;
use std::ops::Range;

/// Maps `(element, local index)` pairs to global degree-of-freedom indices.
///
/// For degree $r$, local index $j$ of element $e$ maps to the global index $e r + j$. The right
/// end point of element $e$ and the left end point of element $e + 1$ therefore share a single
/// global index, and the total number of DoFs is $r \cdot (\text{num elements}) + 1$.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DofMap {
    num_elements: usize,
    degree: usize,
}

impl DofMap {
    pub fn new(num_elements: usize, degree: usize) -> Result<Self, Error> {
        if num_elements == 0 {
            return Err(Error::assembly("Cannot enumerate DoFs for a mesh without elements"));
        }
        if degree == 0 {
            return Err(Error::configuration("Polynomial degree must be at least 1, got 0"));
        }
        Ok(Self { num_elements, degree })
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn num_dofs(&self) -> usize {
        self.degree * self.num_elements + 1
    }

    pub fn element_dof_count(&self) -> usize {
        self.degree + 1
    }

    /// Global index of the local DoF `local_index` of element `element_index`.
    ///
    /// Returns `None` if either index is out of bounds.
    pub fn global_index(&self, element_index: usize, local_index: usize) -> Option<usize> {
        (element_index < self.num_elements && local_index <= self.degree)
            .then(|| element_index * self.degree + local_index)
    }

    /// The contiguous range of global indices belonging to the given element.
    ///
    /// # Panics
    ///
    /// Panics if the element index is out of bounds.
    pub fn element_dofs(&self, element_index: usize) -> Range<usize> {
        assert!(element_index < self.num_elements, "Element index out of bounds");
        let first = element_index * self.degree;
        first..first + self.degree + 1
    }

    /// Global indices of the DoFs at $x = 0$ and $x = 1$.
    pub fn boundary_dofs(&self) -> [usize; 2] {
        [0, self.num_dofs() - 1]
    }
}
