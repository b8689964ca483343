use approx::assert_abs_diff_eq;
use isocurv::{
    geometry::{graph_shape_operator, iso_surface_shape_operator},
    problems::test_functions::Paraboloid,
    CurvatureError,
};
use nalgebra::{DMatrix, DVector, RowDVector};

fn givens(dim: usize, i: usize, j: usize, theta: f64) -> DMatrix<f64> {
    let mut r = DMatrix::identity(dim, dim);
    let (s, c) = theta.sin_cos();
    r[(i, i)] = c;
    r[(j, j)] = c;
    r[(i, j)] = -s;
    r[(j, i)] = s;
    r
}

fn generic_problem() -> (DVector<f64>, DMatrix<f64>) {
    let g = DVector::from_vec(vec![0.3, -0.7, 0.2, 1.1]);
    let h = DMatrix::from_row_slice(
        4,
        4,
        &[
            1.0, 0.2, -0.1, 0.3, //
            0.2, -0.5, 0.4, 0.0, //
            -0.1, 0.4, 2.0, -0.2, //
            0.3, 0.0, -0.2, 0.7,
        ],
    );
    (g, h)
}

#[test]
fn graph_shape_operator_matches_closed_form() {
    let g = DVector::from_vec(vec![1.0, 2.0]);
    let h = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, -1.0]);

    let graph = graph_shape_operator(&g, &h).unwrap();

    // (I + g gᵀ)⁻¹ H = [[9, 4.5], [-3, -3]] / 6 and √(1 + ‖g‖²) = √6.
    let expected = DMatrix::from_row_slice(2, 2, &[9.0, 4.5, -3.0, -3.0]) * (-1.0 / (6.0 * 6f64.sqrt()));
    assert_abs_diff_eq!(graph.shape_operator, expected, epsilon = 1e-12);
    assert_eq!(graph.metric_tensor, DMatrix::from_row_slice(2, 2, &[2.0, 2.0, 2.0, 5.0]));
}

#[test]
fn graph_shape_operator_at_critical_point_is_negative_hessian() {
    let g = DVector::zeros(3);
    let h = DMatrix::from_row_slice(3, 3, &[1.0, 0.5, 0.0, 0.5, -2.0, 0.1, 0.0, 0.1, 3.0]);
    let graph = graph_shape_operator(&g, &h).unwrap();
    assert_abs_diff_eq!(graph.shape_operator, -h, epsilon = 1e-15);
}

#[test]
fn single_precision_inputs_are_promoted() {
    let g32 = DVector::from_vec(vec![1.0f32, 2.0]);
    let h32 = DMatrix::from_row_slice(2, 2, &[2.0f32, 0.5, 0.5, -1.0]);
    let g64 = DVector::from_vec(vec![1.0f64, 2.0]);
    let h64 = DMatrix::from_row_slice(2, 2, &[2.0f64, 0.5, 0.5, -1.0]);

    let single = graph_shape_operator(&g32, &h32).unwrap();
    let double = graph_shape_operator(&g64, &h64).unwrap();
    assert_eq!(single, double);

    let iso_single = iso_surface_shape_operator(&g32, &h32, None).unwrap();
    let iso_double = iso_surface_shape_operator(&g64, &h64, None).unwrap();
    assert_eq!(iso_single, iso_double);
}

#[test]
fn rejects_inconsistent_dimensions() {
    let g = DVector::from_vec(vec![1.0, 2.0]);
    let err = graph_shape_operator(&g, &DMatrix::zeros(2, 3)).unwrap_err();
    assert_eq!(
        err,
        CurvatureError::NotSquare {
            what: "hessian",
            rows: 2,
            cols: 3
        }
    );

    let err = iso_surface_shape_operator(&g, &DMatrix::zeros(3, 3), None).unwrap_err();
    assert_eq!(
        err,
        CurvatureError::DimensionMismatch {
            what: "hessian",
            expected: 2,
            got: 3
        }
    );

    let err = iso_surface_shape_operator(&g, &DMatrix::zeros(2, 2), Some(&DMatrix::identity(3, 3))).unwrap_err();
    assert!(matches!(
        err,
        CurvatureError::DimensionMismatch {
            what: "coordinate transform",
            ..
        }
    ));
}

#[test]
fn paraboloid_level_set_at_origin() {
    let origin = DVector::zeros(3);
    let g = Paraboloid.gradient(&origin);
    let h = Paraboloid.hessian(3);

    let iso = iso_surface_shape_operator(&g, &h, None).unwrap();

    assert_eq!(iso.shape_operator.shape(), (2, 2));
    assert_abs_diff_eq!(iso.shape_operator, DMatrix::identity(2, 2) * -2.0, epsilon = 1e-15);
    assert_abs_diff_eq!(iso.metric_tensor, DMatrix::identity(2, 2), epsilon = 1e-15);
    assert_abs_diff_eq!(
        iso.embedding_differential,
        DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
        epsilon = 1e-15
    );
    assert!(!iso.near_singular);
}

#[test]
fn exactly_zero_implicit_component_is_fatal() {
    let g = DVector::from_vec(vec![1.0, -2.0, 0.0]);
    let h = DMatrix::identity(3, 3);
    let err = iso_surface_shape_operator(&g, &h, None).unwrap_err();
    assert_eq!(err, CurvatureError::SingularGradient { component: 0.0 });

    // Same point, charted over a different axis.
    let swap = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    assert!(iso_surface_shape_operator(&g, &h, Some(&swap)).is_ok());
}

#[test]
fn tiny_implicit_component_is_flagged_but_computed() {
    let g = DVector::from_vec(vec![1.0, 1e-9]);
    let h = DMatrix::identity(2, 2);
    let iso = iso_surface_shape_operator(&g, &h, None).unwrap();
    assert!(iso.near_singular);
    assert_eq!(iso.shape_operator.shape(), (1, 1));
    assert!(iso.shape_operator[(0, 0)].is_finite());
}

#[test]
fn embedding_pulls_back_euclidean_metric() {
    let (g, h) = generic_problem();
    let rotation = givens(4, 0, 3, 0.4) * givens(4, 1, 2, -0.9) * givens(4, 0, 1, 0.3);

    for transform in [None, Some(&rotation)] {
        let iso = iso_surface_shape_operator(&g, &h, transform).unwrap();
        let e = &iso.embedding_differential;
        assert_eq!(e.shape(), (4, 3));
        assert_abs_diff_eq!(e.transpose() * e, iso.metric_tensor.clone(), epsilon = 1e-12);
        // Chart directions are tangent to the level set.
        assert_abs_diff_eq!(g.transpose() * e, RowDVector::zeros(3), epsilon = 1e-12);
    }
}

#[test]
fn negating_the_function_negates_the_shape_operator() {
    let (g, h) = generic_problem();
    let iso = iso_surface_shape_operator(&g, &h, None).unwrap();
    let negated = iso_surface_shape_operator(&(-&g), &(-&h), None).unwrap();

    assert_abs_diff_eq!(negated.shape_operator, -iso.shape_operator.clone(), epsilon = 1e-14);
    assert_eq!(negated.embedding_differential, iso.embedding_differential);
    assert_eq!(negated.metric_tensor, iso.metric_tensor);
}

#[test]
fn one_dimensional_level_set_is_a_point() {
    let g = DVector::from_vec(vec![3.0]);
    let h = DMatrix::from_element(1, 1, 1.0);
    let iso = iso_surface_shape_operator(&g, &h, None).unwrap();
    assert_eq!(iso.shape_operator.shape(), (0, 0));
    assert_eq!(iso.embedding_differential.shape(), (1, 0));
}
