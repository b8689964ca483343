//! Real eigendecomposition of nearly symmetric operators.
//!
//! Shape operators are self-adjoint with respect to the metric, not the
//! Euclidean inner product, and they are assembled in floating point, so
//! they go through a general (non-symmetric) eigensolver. Imaginary parts
//! are measured, reported when they are not negligible, and dropped.

use std::ops::Range;

use nalgebra::{DMatrix, DVector, Schur};

use crate::error::{CurvatureError, Result};

/// Imaginary parts above this (relative to the largest matrix entry) are
/// reported as a conditioning problem.
pub const IMAGINARY_TOLERANCE: f64 = 1e-6;

/// Eigenvalues closer than this (relative) share one eigenspace.
const CLUSTER_TOLERANCE: f64 = 1e-9;

const MAX_SCHUR_ITERATIONS: usize = 10_000;

#[derive(Clone, Debug)]
pub(crate) struct RealEigen {
    /// Real parts, descending.
    pub(crate) values: Vec<f64>,
    /// Column `i` pairs with `values[i]`; unit Euclidean norm.
    pub(crate) vectors: DMatrix<f64>,
    /// Index ranges of numerically equal eigenvalues.
    pub(crate) clusters: Vec<Range<usize>>,
    pub(crate) max_imaginary_part: f64,
}

pub(crate) fn real_eigen(matrix: &DMatrix<f64>) -> Result<RealEigen> {
    let n = matrix.nrows();
    if n == 0 {
        return Ok(RealEigen {
            values: Vec::new(),
            vectors: DMatrix::zeros(0, 0),
            clusters: Vec::new(),
            max_imaginary_part: 0.0,
        });
    }

    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, MAX_SCHUR_ITERATIONS)
        .ok_or(CurvatureError::EigenDecomposition)?;
    let eigenvalues = schur.complex_eigenvalues();
    let (q, t) = schur.unpack();

    let scale = matrix.amax().max(1.0);
    let max_imaginary_part = eigenvalues.iter().fold(0.0_f64, |acc, c| acc.max(c.im.abs()));
    if max_imaginary_part > IMAGINARY_TOLERANCE * scale {
        tracing::warn!(
            max_imaginary_part,
            "shape operator has complex eigenvalues; discarding imaginary parts, the operator is badly conditioned"
        );
    }

    let mut values: Vec<f64> = eigenvalues.iter().map(|c| c.re).collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CurvatureError::EigenDecomposition);
    }
    values.sort_by(|a, b| b.total_cmp(a));

    // Relative to the spectrum itself; an all-zero spectrum is one cluster.
    let spectral_radius = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let cluster_tol = CLUSTER_TOLERANCE * spectral_radius;
    let clusters = cluster_ranges(&values, cluster_tol);

    let mut real_blocks = real_diagonal_blocks(&t);
    let mut vectors = DMatrix::zeros(n, n);
    for cluster in &clusters {
        if cluster.len() == 1 {
            let value = values[cluster.start];
            if let Some(k) = take_matching_block(&mut real_blocks, &t, value, cluster_tol) {
                let v = &q * schur_eigenvector(&t, k);
                vectors.set_column(cluster.start, &v.normalize());
                continue;
            }
        }
        null_space_columns(matrix, cluster.clone(), &values, &mut vectors)?;
    }

    Ok(RealEigen {
        values,
        vectors,
        clusters,
        max_imaginary_part,
    })
}

/// Indices `k` where T has a 1×1 diagonal block.
fn real_diagonal_blocks(t: &DMatrix<f64>) -> Vec<usize> {
    let n = t.nrows();
    (0..n)
        .filter(|&k| (k == 0 || t[(k, k - 1)] == 0.0) && (k + 1 == n || t[(k + 1, k)] == 0.0))
        .collect()
}

/// Removes and returns the 1×1 block whose diagonal entry is `value`
/// (within `tol`).
fn take_matching_block(blocks: &mut Vec<usize>, t: &DMatrix<f64>, value: f64, tol: f64) -> Option<usize> {
    let distance = |k: usize| (t[(k, k)] - value).abs();
    let mut best: Option<usize> = None;
    for pos in 0..blocks.len() {
        if best.map_or(true, |b| distance(blocks[pos]) < distance(blocks[b])) {
            best = Some(pos);
        }
    }
    let pos = best.filter(|&pos| distance(blocks[pos]) <= tol)?;
    Some(blocks.swap_remove(pos))
}

/// Eigenvector of the quasi-triangular T for the real eigenvalue T[k, k],
/// by back-substitution on (T − λI) y = 0 with y_k = 1 and y_j = 0 below k.
fn schur_eigenvector(t: &DMatrix<f64>, k: usize) -> DVector<f64> {
    let lambda = t[(k, k)];
    let small = f64::EPSILON * t.amax().max(f64::MIN_POSITIVE);
    let guard = |d: f64| if d.abs() < small { small.copysign(d) } else { d };

    let mut y = DVector::zeros(t.nrows());
    y[k] = 1.0;
    let tail = |y: &DVector<f64>, row: usize, from: usize| -> f64 { (from..=k).map(|l| t[(row, l)] * y[l]).sum() };

    let mut j = k;
    while j > 0 {
        let row = j - 1;
        if row > 0 && t[(row, row - 1)] != 0.0 {
            // 2×2 block on rows row−1, row.
            let top = row - 1;
            let a = t[(top, top)] - lambda;
            let b = t[(top, row)];
            let c = t[(row, top)];
            let d = t[(row, row)] - lambda;
            let r0 = -tail(&y, top, row + 1);
            let r1 = -tail(&y, row, row + 1);
            let det = guard(a * d - b * c);
            y[top] = (r0 * d - b * r1) / det;
            y[row] = (a * r1 - c * r0) / det;
            j = top;
        } else {
            y[row] = -tail(&y, row, row + 1) / guard(t[(row, row)] - lambda);
            j = row;
        }
    }
    y
}

/// Null space of S − λ̄I for a cluster: right singular vectors of the
/// smallest singular values, one per eigenvalue in the cluster.
fn null_space_columns(
    matrix: &DMatrix<f64>,
    cluster: Range<usize>,
    values: &[f64],
    vectors: &mut DMatrix<f64>,
) -> Result<()> {
    let n = matrix.nrows();
    let mean = values[cluster.clone()].iter().sum::<f64>() / cluster.len() as f64;
    let shifted = matrix - DMatrix::identity(n, n) * mean;
    let svd = shifted.svd(false, true);
    let v_t = svd.v_t.ok_or(CurvatureError::EigenDecomposition)?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| svd.singular_values[a].total_cmp(&svd.singular_values[b]));
    for (slot, &idx) in cluster.zip(order.iter()) {
        vectors.set_column(slot, &v_t.row(idx).transpose());
    }
    Ok(())
}

/// Split descending `values` into runs whose neighbours differ by at most `tol`.
fn cluster_ranges(values: &[f64], tol: f64) -> Vec<Range<usize>> {
    let mut clusters = Vec::new();
    let mut start = 0;
    for i in 1..=values.len() {
        if i == values.len() || values[i - 1] - values[i] > tol {
            clusters.push(start..i);
            start = i;
        }
    }
    clusters
}
