use crate::function::ExactSolution;
use crate::space::DiscretizationSpace;
use eyre::eyre;
use nalgebra::DVector;
use std::path::Path;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType, Piece, UnstructuredGridPiece,
    Version, VertexNumbers, Vtk,
};

/// Builds a VTK unstructured grid for a finite element solution.
///
/// Every DoF becomes a point and every pair of consecutive DoFs a line cell, so that
/// higher-order solutions are displayed as piecewise linear interpolants at the DoF nodes.
pub struct SolutionDataSetBuilder<'a> {
    space: &'a DiscretizationSpace,
    u_h: &'a DVector<f64>,
    exact_solution: Option<&'a ExactSolution>,
    // Only used for exporting directly to file
    title: Option<String>,
}

impl<'a> SolutionDataSetBuilder<'a> {
    pub fn from_solution(space: &'a DiscretizationSpace, u_h: &'a DVector<f64>) -> Self {
        Self {
            space,
            u_h,
            exact_solution: None,
            title: None,
        }
    }

    /// Additionally writes the exact solution at the DoF nodes as `u_exact`.
    pub fn with_exact_solution(self, exact_solution: Option<&'a ExactSolution>) -> Self {
        Self { exact_solution, ..self }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    pub fn try_build(&self) -> eyre::Result<DataSet> {
        let num_dofs = self.space.num_dofs();
        if self.u_h.len() != num_dofs {
            return Err(eyre!(
                "solution vector has length {}, but the space has {} DoFs",
                self.u_h.len(),
                num_dofs
            ));
        }

        // Global DoFs are numbered in order of increasing coordinate
        let dof_coordinates = self.space.dof_coordinates();
        let points: Vec<f64> = dof_coordinates
            .iter()
            .flat_map(|&x| [x, 0.0, 0.0])
            .collect();

        // Vertices is laid out as follows: N, i_1, i_2, ... i_N,
        // so for lines this becomes 2 followed by the two indices making up the line
        let num_cells = num_dofs - 1;
        let mut vertices = Vec::with_capacity(3 * num_cells);
        for i in 0..num_cells {
            vertices.push(2);
            vertices.push(u32::try_from(i)?);
            vertices.push(u32::try_from(i + 1)?);
        }

        let mut point_attributes = vec![scalar_attribute("u_h", self.u_h.as_slice().to_vec())];
        if let Some(exact_solution) = self.exact_solution {
            let u_exact = dof_coordinates.iter().map(|&x| exact_solution.value(x)).collect();
            point_attributes.push(scalar_attribute("u_exact", u_exact));
        }

        let piece = UnstructuredGridPiece {
            points: points.into(),
            cells: Cells {
                cell_verts: VertexNumbers::Legacy {
                    num_cells: u32::try_from(num_cells)?,
                    vertices,
                },
                types: vec![CellType::Line; num_cells],
            },
            data: Attributes {
                point: point_attributes,
                cell: Vec::new(),
            },
        };

        Ok(DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        })
    }

    /// Convenience function for directly exporting the dataset to a file.
    pub fn try_export(&self, filename: impl AsRef<Path>) -> eyre::Result<()> {
        let filepath = filename.as_ref();
        let fallback_title = filepath
            .file_stem()
            .map(|os_str| os_str.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        if let Some(parent) = filepath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dataset = self.try_build()?;
        Vtk {
            version: Version { major: 4, minor: 1 },
            // If we don't have a title then just make the filepath the title
            title: self.title.clone().unwrap_or(fallback_title),
            byte_order: ByteOrder::BigEndian,
            data: dataset,
            file_path: None,
        }
        .export(filepath)
        .map_err(|err| eyre!("failed to export VTK file {}: {}", filepath.display(), err))
    }
}

fn scalar_attribute(name: &str, values: Vec<f64>) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.to_string(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: values.into(),
    })
}
