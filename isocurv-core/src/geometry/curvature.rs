use std::ops::Range;

use nalgebra::{DMatrix, DVector, Scalar};

use crate::error::{CurvatureError, Result};

use super::eigen::real_eigen;
use super::linalg::{orthonormal_rows, promote_matrix};
use super::shape_operator::{graph_shape_operator, iso_surface_shape_operator};

/// Principal curvatures and directions at a point.
#[derive(Clone, Debug)]
pub struct PrincipalCurvatures {
    /// The operator that was diagonalized (restricted, if a subspace was given).
    pub shape_operator: DMatrix<f64>,
    /// Descending.
    pub curvatures: DVector<f64>,
    /// Column `i` is the direction of `curvatures[i]` in input coordinates.
    pub directions: DMatrix<f64>,
    /// Same directions in the coordinates of `shape_operator`.
    pub tangent_directions: DMatrix<f64>,
    /// Metric in the coordinates of `shape_operator`; every column `v` of
    /// `tangent_directions` has vᵀ G v = 1.
    pub metric_tensor: DMatrix<f64>,
    /// Largest imaginary part the eigensolver produced before it was dropped.
    pub max_imaginary_part: f64,
}

/// Principal curvatures of the graph of f (height field over input space).
pub fn principal_curvatures_graph<T: Scalar + Into<f64>>(
    gradient: &DVector<T>,
    hessian: &DMatrix<T>,
) -> Result<PrincipalCurvatures> {
    let graph = graph_shape_operator(gradient, hessian)?;
    let m = graph.shape_operator.nrows();
    extract(
        graph.shape_operator,
        graph.metric_tensor,
        &DMatrix::identity(m, m),
    )
}

/// Principal curvatures of the iso-response surface through the point.
///
/// `subspace_of_interest` is a k×M matrix whose rows span, in the
/// (transformed) coordinates, the directions the curvature should be
/// restricted to. Its last column lies along the implicit axis and is
/// dropped; the remaining rows are re-orthonormalized.
pub fn principal_curvatures_iso_surface<T: Scalar + Into<f64>>(
    gradient: &DVector<T>,
    hessian: &DMatrix<T>,
    subspace_of_interest: Option<&DMatrix<T>>,
    coordinate_transform: Option<&DMatrix<T>>,
) -> Result<PrincipalCurvatures> {
    let iso = iso_surface_shape_operator(gradient, hessian, coordinate_transform)?;

    let Some(subspace) = subspace_of_interest else {
        return extract(
            iso.shape_operator,
            iso.metric_tensor,
            &iso.embedding_differential,
        );
    };

    let m = iso.embedding_differential.nrows();
    let subspace = promote_matrix(subspace);
    if subspace.ncols() != m {
        return Err(CurvatureError::DimensionMismatch {
            what: "subspace of interest",
            expected: m,
            got: subspace.ncols(),
        });
    }

    // Deleting the implicit-axis column can break orthonormality.
    let projection = orthonormal_rows(&subspace.columns(0, m - 1).into_owned())?;

    // P S Pᵀ is the endomorphism of the restricted second fundamental form:
    // the restricted metric carries the matching Pᵀ.
    let shape_operator = &projection * &iso.shape_operator * projection.transpose();
    let metric = &projection * &iso.metric_tensor * projection.transpose();
    let embedding = &iso.embedding_differential * projection.transpose();
    extract(shape_operator, metric, &embedding)
}

fn extract(
    shape_operator: DMatrix<f64>,
    metric: DMatrix<f64>,
    embedding: &DMatrix<f64>,
) -> Result<PrincipalCurvatures> {
    let eigen = real_eigen(&shape_operator)?;

    let mut tangent = eigen.vectors;
    for cluster in &eigen.clusters {
        metric_orthonormalize(&mut tangent, cluster.clone(), &metric)?;
    }

    let mut directions = embedding * &tangent;
    for j in 0..directions.ncols() {
        let column = directions.column(j);
        if column[column.iamax()] < 0.0 {
            directions.column_mut(j).neg_mut();
            tangent.column_mut(j).neg_mut();
        }
    }

    Ok(PrincipalCurvatures {
        shape_operator,
        curvatures: DVector::from_vec(eigen.values),
        directions,
        tangent_directions: tangent,
        metric_tensor: metric,
        max_imaginary_part: eigen.max_imaginary_part,
    })
}

/// Gram-Schmidt under G on the columns in `range`, leaving each with vᵀGv = 1.
fn metric_orthonormalize(
    vectors: &mut DMatrix<f64>,
    range: Range<usize>,
    metric: &DMatrix<f64>,
) -> Result<()> {
    for j in range.clone() {
        let mut v = vectors.column(j).into_owned();
        for i in range.start..j {
            let u = vectors.column(i);
            let coefficient = u.dot(&(metric * &v));
            v -= u * coefficient;
        }
        let norm_squared = v.dot(&(metric * &v));
        if norm_squared.is_nan() || norm_squared <= 0.0 {
            return Err(CurvatureError::SingularMetric);
        }
        vectors.set_column(j, &v.unscale(norm_squared.sqrt()));
    }
    Ok(())
}
