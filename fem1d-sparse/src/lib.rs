//! Sparse matrix functionality for `fem1d`.
//!
//! Storage is provided by `nalgebra-sparse`. This crate adds the Conjugate Gradient solver used
//! by `fem1d` and a few CSR helpers that are needed when assembling and verifying finite
//! element systems.

pub mod cg;
pub mod csr;

pub use nalgebra_sparse::pattern::SparsityPattern;
pub use nalgebra_sparse::csr::CsrRowMut;
pub use nalgebra_sparse::CsrMatrix;
