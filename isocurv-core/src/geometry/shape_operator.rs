use nalgebra::{DMatrix, DVector, Scalar};

use crate::error::{CurvatureError, Result};

use super::linalg::{
    check_gradient_hessian, metric_tensor, orthogonality_defect, promote_matrix, promote_vector,
};

/// Below this magnitude the implicit-axis gradient component makes the
/// iso-surface chart numerically unreliable (but still usable).
pub const NEAR_SINGULAR_THRESHOLD: f64 = 1e-7;

/// Coordinate transforms further than this from orthogonal are reported.
const ORTHOGONALITY_TOLERANCE: f64 = 1e-6;

/// Shape operator of the graph of f over its input space.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphShapeOperator {
    /// M×M.
    pub shape_operator: DMatrix<f64>,
    /// I + g gᵀ.
    pub metric_tensor: DMatrix<f64>,
}

/// Shape operator of the level set of f through a point, in the chart that
/// writes the last (rotated) coordinate as a function of the other M − 1.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoSurfaceShapeOperator {
    /// (M−1)×(M−1).
    pub shape_operator: DMatrix<f64>,
    /// M×(M−1) Jacobian from chart coordinates to input coordinates.
    pub embedding_differential: DMatrix<f64>,
    /// (M−1)×(M−1) induced metric of the chart.
    pub metric_tensor: DMatrix<f64>,
    /// The implicit-axis gradient component was below
    /// [`NEAR_SINGULAR_THRESHOLD`].
    pub near_singular: bool,
}

/// S = −(I + g gᵀ)⁻¹ H / √(1 + ‖g‖²), always evaluated in f64.
pub fn graph_shape_operator<T: Scalar + Into<f64>>(
    gradient: &DVector<T>,
    hessian: &DMatrix<T>,
) -> Result<GraphShapeOperator> {
    let g = promote_vector(gradient);
    let h = promote_matrix(hessian);
    check_gradient_hessian(&g, &h)?;
    graph_operator(&g, &h)
}

pub(crate) fn graph_operator(g: &DVector<f64>, h: &DMatrix<f64>) -> Result<GraphShapeOperator> {
    let n = g.len();
    let metric = metric_tensor(g);
    if n == 0 {
        return Ok(GraphShapeOperator {
            shape_operator: DMatrix::zeros(0, 0),
            metric_tensor: metric,
        });
    }

    let normalization = (g.norm_squared() + 1.0).sqrt();
    let solved = metric
        .clone()
        .lu()
        .solve(h)
        .ok_or(CurvatureError::SingularMetric)?;

    Ok(GraphShapeOperator {
        shape_operator: solved.unscale(-normalization),
        metric_tensor: metric,
    })
}

/// Shape operator of the iso-response surface through the point.
///
/// `coordinate_transform` is an orthogonal M×M matrix C taking input
/// coordinates x to new coordinates C x (identity when `None`). The last new
/// coordinate is written as an implicit function g of the others.
///
/// Fails with [`CurvatureError::SingularGradient`] when the gradient has no
/// component along that last axis.
pub fn iso_surface_shape_operator<T: Scalar + Into<f64>>(
    gradient: &DVector<T>,
    hessian: &DMatrix<T>,
    coordinate_transform: Option<&DMatrix<T>>,
) -> Result<IsoSurfaceShapeOperator> {
    let g = promote_vector(gradient);
    let h = promote_matrix(hessian);
    check_gradient_hessian(&g, &h)?;
    let m = g.len();
    if m == 0 {
        return Err(CurvatureError::DimensionMismatch {
            what: "gradient",
            expected: 1,
            got: 0,
        });
    }

    let transform = match coordinate_transform {
        Some(c) => {
            let c = promote_matrix(c);
            if c.nrows() != m || c.ncols() != m {
                return Err(CurvatureError::DimensionMismatch {
                    what: "coordinate transform",
                    expected: m,
                    got: if c.nrows() != m { c.nrows() } else { c.ncols() },
                });
            }
            let defect = orthogonality_defect(&c);
            if defect > ORTHOGONALITY_TOLERANCE {
                tracing::warn!(defect, "coordinate transform is not orthogonal");
            }
            c
        }
        None => DMatrix::identity(m, m),
    };

    let g_rot = &transform * &g;
    let h_rot = &transform * &h * transform.transpose();

    let n = m - 1;
    let g_a = g_rot.rows(0, n).into_owned();
    let g_b = g_rot[n];
    let h_aa = h_rot.view((0, 0), (n, n)).into_owned();
    let h_ab = h_rot.column(n).rows(0, n).into_owned();
    let h_bb = h_rot[(n, n)];

    // Exactly zero is fatal, merely small is advisory.
    if g_b == 0.0 {
        return Err(CurvatureError::SingularGradient { component: g_b });
    }
    let near_singular = g_b.abs() < NEAR_SINGULAR_THRESHOLD;
    if near_singular {
        tracing::warn!(
            component = g_b,
            "gradient is close to singular along the implicit axis, consider a different coordinate transform"
        );
    }

    // Implicit function g(a) with f(a, g(a)) = const.
    let grad_g = g_a.unscale(-g_b);
    let cross = &h_ab * grad_g.transpose();
    let hess_g = (h_aa + &cross + cross.transpose() + (&grad_g * grad_g.transpose()) * h_bb)
        .unscale(-g_b);

    let mut chart = DMatrix::zeros(m, n);
    chart.view_mut((0, 0), (n, n)).fill_with_identity();
    chart.row_mut(n).copy_from(&grad_g.transpose());
    let embedding_differential = transform.transpose() * chart;

    // Orient the normal along the gradient of f.
    let graph = if g_b > 0.0 {
        graph_operator(&(-grad_g), &(-hess_g))?
    } else {
        graph_operator(&grad_g, &hess_g)?
    };

    tracing::debug!(dim = m, g_b, near_singular, "iso-surface shape operator");
    Ok(IsoSurfaceShapeOperator {
        shape_operator: graph.shape_operator,
        embedding_differential,
        metric_tensor: graph.metric_tensor,
        near_singular,
    })
}
