use nalgebra::DVector;
use numpy::PyReadonlyArray2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::bindings::callbacks::{extract_flat, extract_point, PyEvaluator};
use crate::bindings::convert::matrix_from_py;

/// Second-order Taylor prediction of f(new_point) around start_point.
///
/// Points and gradient may have any shape; they are flattened.
#[pyfunction]
fn taylor_approximation(
    start_point: Bound<'_, PyAny>,
    new_point: Bound<'_, PyAny>,
    activation: f64,
    gradient: Bound<'_, PyAny>,
    hessian: PyReadonlyArray2<'_, f64>,
) -> PyResult<f64> {
    let start = DVector::from_vec(extract_flat(&start_point)?);
    let new = DVector::from_vec(extract_flat(&new_point)?);
    let gradient = DVector::from_vec(extract_flat(&gradient)?);
    let hessian = matrix_from_py(&hessian);

    let m = start.len();
    if new.len() != m || gradient.len() != m || hessian.shape() != (m, m) {
        return Err(PyValueError::new_err(format!(
            "taylor_approximation: expected points and gradient of length {m} and a {m}x{m} hessian, \
             got {}, {} and {}x{}",
            new.len(),
            gradient.len(),
            hessian.nrows(),
            hessian.ncols()
        )));
    }
    Ok(isocurv::taylor_approximation(&start, &new, activation, &gradient, &hessian))
}

/// Second-order predictions of f at every point, expanded around points[0].
///
/// Only points[0] is evaluated. The prediction for points[0] is its value.
#[pyfunction]
fn hessian_approximate_response(
    py: Python<'_>,
    f: Py<PyAny>,
    points: Vec<Bound<'_, PyAny>>,
    hessian: PyReadonlyArray2<'_, f64>,
) -> PyResult<Vec<f64>> {
    let points = points.iter().map(extract_point).collect::<PyResult<Vec<_>>>()?;
    let hessian = matrix_from_py(&hessian);

    if let Some(first) = points.first() {
        let m = first.dim();
        if hessian.shape() != (m, m) {
            return Err(PyValueError::new_err(format!(
                "hessian_approximate_response: expected a {m}x{m} hessian, got {}x{}",
                hessian.nrows(),
                hessian.ncols()
            )));
        }
        if let Some(bad) = points.iter().position(|p| p.dim() != m) {
            return Err(PyValueError::new_err(format!(
                "hessian_approximate_response: point {bad} has length {}, expected {m}",
                points[bad].dim()
            )));
        }
    }
    isocurv::hessian_approximate_response(PyEvaluator::new(py, f), &points, &hessian)
}

pub(crate) fn register(module: &Bound<PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(taylor_approximation, module)?)?;
    module.add_function(wrap_pyfunction!(hessian_approximate_response, module)?)?;
    Ok(())
}
