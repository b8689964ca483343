//! Second-order Taylor checks of a Hessian estimate against the evaluator.

use nalgebra::{DMatrix, DVector};

use crate::problems::evaluator::{evaluate_point, Evaluator, Point};

/// f(x + Δ) ≈ f(x) + ∇f(x)·Δ + ½ ΔᵀHΔ with Δ = `new_point` − `start_point`.
pub fn taylor_approximation(
    start_point: &DVector<f64>,
    new_point: &DVector<f64>,
    value: f64,
    gradient: &DVector<f64>,
    hessian: &DMatrix<f64>,
) -> f64 {
    assert_eq!(start_point.len(), new_point.len(), "points must share a dimension");
    assert_eq!(gradient.len(), start_point.len(), "gradient length must match the points");
    let delta = new_point - start_point;
    let first_order = gradient.dot(&delta);
    let second_order = delta.dot(&(hessian * &delta));
    value + first_order + second_order / 2.0
}

/// Second-order prediction of the response at every point, expanded around
/// `points[0]`. The evaluator is called once, at `points[0]`.
pub fn hessian_approximate_response<E: Evaluator>(
    mut evaluator: E,
    points: &[Point],
    hessian: &DMatrix<f64>,
) -> Result<Vec<f64>, E::Error> {
    let Some(origin) = points.first() else {
        return Ok(Vec::new());
    };
    let eval = evaluate_point(&mut evaluator, origin)?;
    Ok(points
        .iter()
        .map(|p| taylor_approximation(origin.values(), p.values(), eval.value, &eval.gradient, hessian))
        .collect())
}

/// True response minus the second-order prediction at every point.
///
/// The first entry is always zero.
pub fn taylor_error<E: Evaluator>(
    mut evaluator: E,
    points: &[Point],
    hessian: &DMatrix<f64>,
) -> Result<Vec<f64>, E::Error> {
    let Some(origin) = points.first() else {
        return Ok(Vec::new());
    };
    let base = evaluate_point(&mut evaluator, origin)?;

    let mut errors = Vec::with_capacity(points.len());
    errors.push(0.0);
    for p in &points[1..] {
        let actual = evaluate_point(&mut evaluator, p)?.value;
        let predicted = taylor_approximation(origin.values(), p.values(), base.value, &base.gradient, hessian);
        errors.push(actual - predicted);
    }
    tracing::debug!(
        points = points.len(),
        max_abs_error = errors.iter().fold(0.0_f64, |acc, e| acc.max(e.abs())),
        "taylor consistency check"
    );
    Ok(errors)
}
