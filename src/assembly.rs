//! Assembly of the global linear system.
//!
//! Assembly is split into *local* assembly, where element matrices and vectors are computed
//! by quadrature ([`local`]), and *global* assembly, which scatters the element contributions
//! into a CSR matrix or dense vector and applies boundary conditions ([`global`]).
pub mod global;
pub mod local;
