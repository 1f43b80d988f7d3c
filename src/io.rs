//! Readers and writers for parameter files and results.
pub mod csv;
pub mod json;
pub mod prm;
pub mod vtk;
