use nalgebra::{DMatrix, DVector, RowDVector, Scalar};

use crate::error::{CurvatureError, Result};

/// Rows whose residual norm after orthogonalization falls below this
/// (relative to the largest input entry) are treated as dependent.
pub(crate) const RANK_TOLERANCE: f64 = 1e-10;

pub(crate) fn promote_vector<T: Scalar + Into<f64>>(v: &DVector<T>) -> DVector<f64> {
    v.map(|x| -> f64 { x.into() })
}

pub(crate) fn promote_matrix<T: Scalar + Into<f64>>(m: &DMatrix<T>) -> DMatrix<f64> {
    m.map(|x| -> f64 { x.into() })
}

/// Check that `hessian` is square and matches `gradient`.
pub(crate) fn check_gradient_hessian(gradient: &DVector<f64>, hessian: &DMatrix<f64>) -> Result<()> {
    if !hessian.is_square() {
        return Err(CurvatureError::NotSquare {
            what: "hessian",
            rows: hessian.nrows(),
            cols: hessian.ncols(),
        });
    }
    if hessian.nrows() != gradient.len() {
        return Err(CurvatureError::DimensionMismatch {
            what: "hessian",
            expected: gradient.len(),
            got: hessian.nrows(),
        });
    }
    Ok(())
}

/// Induced metric of a graph with gradient `g`: I + g gᵀ.
pub(crate) fn metric_tensor(g: &DVector<f64>) -> DMatrix<f64> {
    let n = g.len();
    DMatrix::identity(n, n) + g * g.transpose()
}

/// Largest entry of |AᵀA − I|; zero for an orthogonal matrix.
pub(crate) fn orthogonality_defect(a: &DMatrix<f64>) -> f64 {
    let n = a.ncols();
    (a.transpose() * a - DMatrix::identity(n, n)).amax()
}

/// Orthonormal basis of the row space of `p`, kept in row order.
///
/// Modified Gram-Schmidt: rows that are already orthonormal come back
/// unchanged, dependent rows are dropped.
pub(crate) fn orthonormal_rows(p: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let tol = RANK_TOLERANCE * p.amax().max(1.0);
    let mut basis: Vec<RowDVector<f64>> = Vec::with_capacity(p.nrows());

    for i in 0..p.nrows() {
        let mut row = p.row(i).into_owned();
        for q in &basis {
            let c = row.dot(q);
            row -= q * c;
        }
        let norm = row.norm();
        if norm > tol {
            basis.push(row.unscale(norm));
        }
    }

    if basis.is_empty() {
        return Err(CurvatureError::EmptySubspace);
    }
    Ok(DMatrix::from_rows(&basis))
}
