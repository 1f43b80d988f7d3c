use fem1d::cases;
use fem1d::io::vtk::SolutionDataSetBuilder;
use fem1d::problem::DiffusionReactionProblem;
use fem1d::vtkio::model::{Attribute, DataSet, Piece, VertexNumbers};

#[test]
fn solution_data_set_has_one_line_cell_per_dof_interval() {
    let config = cases::smooth(2).with_resolution(3);
    let problem = DiffusionReactionProblem::new(&config).unwrap();
    let solution = problem.solve().unwrap();

    let dataset = SolutionDataSetBuilder::from_solution(problem.space(), &solution.coefficients)
        .with_exact_solution(config.exact_solution())
        .try_build()
        .unwrap();

    let piece = match dataset {
        DataSet::UnstructuredGrid { pieces, .. } => match pieces.into_iter().next() {
            Some(Piece::Inline(piece)) => piece,
            _ => panic!("expected inline piece"),
        },
        _ => panic!("expected unstructured grid"),
    };

    // 4 elements of degree 2 give 9 DoFs and 8 line cells
    assert_eq!(piece.points.len(), 3 * 9);
    match &piece.cells.cell_verts {
        VertexNumbers::Legacy { num_cells, vertices } => {
            assert_eq!(*num_cells, 8);
            assert_eq!(vertices.len(), 24);
            assert_eq!(&vertices[0..6], &[2, 0, 1, 2, 1, 2]);
        }
        _ => panic!("expected legacy vertex numbers"),
    }

    let names: Vec<_> = piece
        .data
        .point
        .iter()
        .map(|attribute| match attribute {
            Attribute::DataArray(array) => array.name.clone(),
            Attribute::Field { name, .. } => name.clone(),
        })
        .collect();
    assert_eq!(names, vec!["u_h", "u_exact"]);

    SolutionDataSetBuilder::from_solution(problem.space(), &solution.coefficients)
        .with_exact_solution(config.exact_solution())
        .with_title("smooth")
        .try_export("data/unit_tests/io/smooth_degree_2.vtk")
        .unwrap();
}

#[test]
fn wrong_solution_length_is_an_error() {
    let problem = DiffusionReactionProblem::new(&cases::smooth(1)).unwrap();
    let u_h = fem1d::nalgebra::DVector::zeros(3);
    assert!(SolutionDataSetBuilder::from_solution(problem.space(), &u_h)
        .try_build()
        .is_err());
}
