use std::cell::Cell;
use std::convert::Infallible;

use isocurv::{
    problems::{test_functions::QuadraticForm, Evaluation, Point},
    taylor::{hessian_approximate_response, taylor_approximation, taylor_error},
};
use nalgebra::{DMatrix, DVector};

fn symmetric() -> DMatrix<f64> {
    DMatrix::from_row_slice(3, 3, &[2.0, 0.5, 0.0, 0.5, 1.0, -0.25, 0.0, -0.25, 3.0])
}

fn points() -> Vec<Point> {
    vec![
        Point::from_slice(&[1.0, 0.0, -1.0]),
        Point::from_slice(&[1.5, 0.25, -1.0]),
        Point::from_slice(&[0.0, 2.0, 1.0]),
        Point::from_slice(&[-3.0, 1.0, 0.5]),
    ]
}

#[test]
fn taylor_approximation_expands_around_start() {
    let start = DVector::from_vec(vec![1.0, 2.0]);
    let new = DVector::from_vec(vec![2.0, 0.0]);
    let gradient = DVector::from_vec(vec![0.5, -1.0]);
    let hessian = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 4.0]);

    // Δ = (1, -2): ∇f·Δ = 2.5, ΔᵀHΔ = 2 - 4 + 16 = 14.
    let value = taylor_approximation(&start, &new, 3.0, &gradient, &hessian);
    assert_eq!(value, 3.0 + 2.5 + 7.0);
    assert_eq!(taylor_approximation(&start, &start, 3.0, &gradient, &hessian), 3.0);
}

#[test]
fn second_order_model_is_exact_for_quadratics() {
    let a = symmetric();
    let quadratic = QuadraticForm::new(a.clone());
    let hessian = quadratic.hessian();

    let errors = taylor_error(quadratic.clone(), &points(), &hessian).unwrap();
    assert_eq!(errors.len(), 4);
    assert_eq!(errors[0], 0.0);
    for e in &errors[1..] {
        assert!(e.abs() < 1e-12, "error {e}");
    }

    let predicted = hessian_approximate_response(quadratic.clone(), &points(), &hessian).unwrap();
    for (p, value) in points().iter().zip(&predicted) {
        assert!((quadratic.value(p.values()) - value).abs() < 1e-12);
    }
}

#[test]
fn prediction_evaluates_only_the_expansion_point() {
    let calls = Cell::new(0usize);
    let a = symmetric();
    let evaluator = |x: &DVector<f64>, _shape: &[usize]| -> Result<Evaluation, Infallible> {
        calls.set(calls.get() + 1);
        Ok(Evaluation::new(x.dot(&(&a * x)), &a * x * 2.0))
    };

    let predicted = hessian_approximate_response(evaluator, &points(), &(&a * 2.0)).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(predicted.len(), 4);
    assert_eq!(predicted[0], QuadraticForm::new(a.clone()).value(points()[0].values()));
}

#[test]
fn zero_hessian_leaves_the_quadratic_term() {
    let a = symmetric();
    let quadratic = QuadraticForm::new(a.clone());
    let pts = points();
    let errors = taylor_error(quadratic, &pts, &DMatrix::zeros(3, 3)).unwrap();

    let origin = pts[0].values();
    for (p, e) in pts.iter().zip(&errors).skip(1) {
        let delta = p.values() - origin;
        let expected = delta.dot(&(&a * &delta));
        assert!((e - expected).abs() < 1e-12, "{e} vs {expected}");
    }
}

#[test]
fn evaluator_errors_surface_unchanged() {
    let evaluator = |_x: &DVector<f64>, _shape: &[usize]| -> Result<Evaluation, &'static str> { Err("offline") };
    let err = taylor_error(evaluator, &points(), &DMatrix::zeros(3, 3)).unwrap_err();
    assert_eq!(err, "offline");
}

#[test]
fn empty_point_set_needs_no_evaluation() {
    let evaluator = |_x: &DVector<f64>, _shape: &[usize]| -> Result<Evaluation, &'static str> { Err("called") };
    assert!(taylor_error(evaluator, &[], &DMatrix::zeros(2, 2)).unwrap().is_empty());
    assert!(hessian_approximate_response(evaluator, &[], &DMatrix::zeros(2, 2))
        .unwrap()
        .is_empty());
}
