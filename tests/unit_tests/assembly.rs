use fem1d::assembly::global::{apply_dirichlet_bc_csr, CsrAssembler, VectorAssembler};
use fem1d::assembly::local::{
    ElementConnectivityAssembler, ElementDiffusionReactionAssembler, ElementMatrixAssembler, ElementSourceAssembler,
};
use fem1d::element::NodeDistribution;
use fem1d::function::ScalarFunction;
use fem1d::mesh::Mesh1d;
use fem1d::nalgebra::{DMatrix, DMatrixViewMut, DVector};
use fem1d::space::DiscretizationSpace;
use fem1d::Error;
use fem1d_sparse::csr::max_symmetry_defect;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::prelude::*;

fn uniform_space(resolution: usize, degree: usize) -> DiscretizationSpace {
    let mesh = Mesh1d::uniform(resolution).unwrap();
    DiscretizationSpace::new(mesh, degree, NodeDistribution::default()).unwrap()
}

/// Strategy for meshes with a handful of randomly sized elements.
fn vertices_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.05..1.0f64, 2..8).prop_map(|lengths| {
        let total: f64 = lengths.iter().sum();
        let mut vertices = vec![0.0];
        let mut x = 0.0;
        for length in &lengths[..lengths.len() - 1] {
            x += length / total;
            vertices.push(x);
        }
        vertices.push(1.0);
        vertices
    })
}

#[test]
fn linear_element_stiffness_matrix() {
    let space = uniform_space(3, 1);
    let mu = ScalarFunction::Constant(2.0);
    let assembler = ElementDiffusionReactionAssembler::new(&space, &mu);
    let mut a_element = DMatrix::zeros(2, 2);
    assembler
        .assemble_element_matrix_into(1, DMatrixViewMut::from(&mut a_element))
        .unwrap();

    // mu / h * [1, -1; -1, 1] with h = 0.25
    let expected = DMatrix::from_row_slice(2, 2, &[8.0, -8.0, -8.0, 8.0]);
    assert_matrix_eq!(a_element, expected, comp = abs, tol = 1e-12);
}

#[test]
fn linear_element_mass_matrix_from_reaction_term() {
    let space = uniform_space(1, 1);
    let mu = ScalarFunction::Constant(0.0);
    let sigma = ScalarFunction::Constant(1.0);
    let assembler = ElementDiffusionReactionAssembler::new(&space, &mu).with_reaction(Some(&sigma));
    let mut a_element = DMatrix::zeros(2, 2);
    assembler
        .assemble_element_matrix_into(0, DMatrixViewMut::from(&mut a_element))
        .unwrap();

    // h / 6 * [2, 1; 1, 2] with h = 0.5
    let expected = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]) * (0.5 / 6.0);
    assert_matrix_eq!(a_element, expected, comp = abs, tol = 1e-14);
}

#[test]
fn element_matrix_with_wrong_dimensions_is_an_error() {
    let space = uniform_space(3, 2);
    let mu = ScalarFunction::Constant(1.0);
    let assembler = ElementDiffusionReactionAssembler::new(&space, &mu);
    let mut a_element = DMatrix::zeros(2, 2);
    assert!(assembler
        .assemble_element_matrix_into(0, DMatrixViewMut::from(&mut a_element))
        .is_err());
}

#[test]
fn sparsity_pattern_couples_element_dofs() {
    let space = uniform_space(2, 2);
    let pattern = CsrAssembler::<f64>::default().assemble_pattern(&space).unwrap();
    assert_eq!(pattern.major_dim(), 7);
    // Three 3x3 blocks that overlap in a single diagonal entry at each of the two interfaces
    assert_eq!(pattern.nnz(), 3 * 9 - 2);
    assert_eq!(pattern.lane(2), &[0, 1, 2, 3, 4]);
    assert_eq!(pattern.lane(3), &[2, 3, 4]);
}

#[test]
fn assembled_laplacian_for_linear_elements_is_tridiagonal() {
    let space = uniform_space(3, 1);
    let mu = ScalarFunction::Constant(1.0);
    let assembler = ElementDiffusionReactionAssembler::new(&space, &mu);
    let a = CsrAssembler::default().assemble(&assembler).unwrap();
    let expected = DMatrix::from_row_slice(
        5,
        5,
        &[
            4.0, -4.0, 0.0, 0.0, 0.0, //
            -4.0, 8.0, -4.0, 0.0, 0.0, //
            0.0, -4.0, 8.0, -4.0, 0.0, //
            0.0, 0.0, -4.0, 8.0, -4.0, //
            0.0, 0.0, 0.0, -4.0, 4.0,
        ],
    );
    assert_matrix_eq!(DMatrix::from(&a), expected, comp = abs, tol = 1e-12);
}

#[test]
fn load_vector_integrates_source() {
    let space = uniform_space(4, 3);
    let f = ScalarFunction::Constant(3.0);
    let assembler = ElementSourceAssembler::new(&space, &f);
    let b = VectorAssembler::default().assemble_vector(&assembler).unwrap();
    assert_eq!(b.len(), space.num_dofs());
    // The basis is a partition of unity, so the entries sum to the integral of f
    assert_scalar_eq!(b.sum(), 3.0, comp = abs, tol = 1e-13);
}

#[test]
fn vector_of_wrong_length_is_an_assembly_error() {
    let space = uniform_space(4, 1);
    let f = ScalarFunction::Constant(1.0);
    let assembler = ElementSourceAssembler::new(&space, &f);
    let mut b = DVector::zeros(3);
    assert!(matches!(
        VectorAssembler::default().assemble_vector_into(&mut b, &assembler),
        Err(Error::Assembly(_))
    ));
}

#[test]
fn dirichlet_elimination_moves_couplings_to_rhs() {
    let space = uniform_space(3, 1);
    let mu = ScalarFunction::Constant(1.0);
    let f = ScalarFunction::Constant(1.0);
    let mut a = CsrAssembler::default()
        .assemble(&ElementDiffusionReactionAssembler::new(&space, &mu))
        .unwrap();
    let mut b = VectorAssembler::default()
        .assemble_vector(&ElementSourceAssembler::new(&space, &f))
        .unwrap();
    let a_original = DMatrix::from(&a);
    let b_original = b.clone();

    let (g_left, g_right) = (2.0, -1.0);
    apply_dirichlet_bc_csr(&mut a, &mut b, &[(0, g_left), (4, g_right)]).unwrap();
    let a_dense = DMatrix::from(&a);

    assert_eq!(max_symmetry_defect(&a), 0.0);

    // The scale is the mean of the assembled diagonal
    let scale = a_original.diagonal().mean();
    assert_scalar_eq!(a_dense[(0, 0)], scale, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a_dense[(4, 4)], scale, comp = abs, tol = 1e-12);
    assert_scalar_eq!(b[0], scale * g_left, comp = abs, tol = 1e-12);
    assert_scalar_eq!(b[4], scale * g_right, comp = abs, tol = 1e-12);

    for k in [0, 4] {
        for i in 0..5 {
            if i != k {
                assert_eq!(a_dense[(i, k)], 0.0);
                assert_eq!(a_dense[(k, i)], 0.0);
            }
        }
    }

    // Interior rows keep their couplings, and only rows coupled to the boundary change the rhs
    assert_scalar_eq!(b[1], b_original[1] - a_original[(1, 0)] * g_left, comp = abs, tol = 1e-12);
    assert_eq!(b[2], b_original[2]);
    assert_scalar_eq!(b[3], b_original[3] - a_original[(3, 4)] * g_right, comp = abs, tol = 1e-12);
    for i in 1..4 {
        for j in 1..4 {
            assert_eq!(a_dense[(i, j)], a_original[(i, j)]);
        }
    }
}

#[test]
fn dirichlet_constraints_are_validated() {
    let space = uniform_space(3, 1);
    let mu = ScalarFunction::Constant(1.0);
    let a = CsrAssembler::default()
        .assemble(&ElementDiffusionReactionAssembler::new(&space, &mu))
        .unwrap();
    let b = DVector::zeros(5);

    let (mut a1, mut b1) = (a.clone(), b.clone());
    assert!(matches!(
        apply_dirichlet_bc_csr(&mut a1, &mut b1, &[(5, 0.0)]),
        Err(Error::Assembly(_))
    ));

    let (mut a2, mut b2) = (a.clone(), b.clone());
    assert!(matches!(
        apply_dirichlet_bc_csr(&mut a2, &mut b2, &[(0, 0.0), (0, 1.0)]),
        Err(Error::Assembly(_))
    ));

    let (mut a3, mut b3) = (a, DVector::zeros(4));
    assert!(matches!(
        apply_dirichlet_bc_csr(&mut a3, &mut b3, &[(0, 0.0)]),
        Err(Error::Assembly(_))
    ));
}

proptest! {
    #[test]
    fn assembled_matrix_is_symmetric(
        vertices in vertices_strategy(),
        degree in 1usize..5,
        with_reaction in proptest::bool::ANY
    ) {
        let mesh = Mesh1d::from_vertices(vertices).unwrap();
        let space = DiscretizationSpace::new(mesh, degree, NodeDistribution::default()).unwrap();
        let mu = ScalarFunction::parse("mu", "1 + x * x").unwrap();
        let sigma = ScalarFunction::parse("sigma", "exp(x)").unwrap();
        let assembler = ElementDiffusionReactionAssembler::new(&space, &mu)
            .with_reaction(with_reaction.then(|| &sigma));
        let mut a = CsrAssembler::default().assemble(&assembler).unwrap();
        prop_assert_eq!(a.nrows(), space.num_dofs());
        prop_assert_eq!(max_symmetry_defect(&a), 0.0);

        let mut b = DVector::from_element(space.num_dofs(), 1.0);
        let [left, right] = space.dof_map().boundary_dofs();
        apply_dirichlet_bc_csr(&mut a, &mut b, &[(left, 1.0), (right, 2.0)]).unwrap();
        prop_assert_eq!(max_symmetry_defect(&a), 0.0);
    }

    #[test]
    fn stiffness_matrix_annihilates_constants(resolution in 1usize..20, degree in 1usize..5) {
        let space = uniform_space(resolution, degree);
        let mu = ScalarFunction::Constant(1.0);
        let assembler = ElementDiffusionReactionAssembler::new(&space, &mu);
        let a = CsrAssembler::default().assemble(&assembler).unwrap();
        let ones = DVector::from_element(space.num_dofs(), 1.0);
        let a_ones = &a * &ones;
        prop_assert!(a_ones.amax() < 1e-9 * (resolution as f64 + 1.0));
        prop_assert_eq!(space.num_elements(), resolution + 1);
    }
}
