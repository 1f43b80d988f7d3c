mod csv;
mod vtk;
