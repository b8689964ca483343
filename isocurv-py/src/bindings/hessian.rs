use isocurv::{approximate_hessian, Sr1Config};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyList, PyTuple};
use pyo3::IntoPyObjectExt;

use crate::bindings::callbacks::{extract_point, reshaped, PyEvaluator};
use crate::bindings::convert::matrix_to_py;
use crate::bindings::trace::trace_records_to_pylist;

/// SR1 Hessian approximation from gradient probes.
///
/// f:     callable(x: ndarray) -> (float, ndarray)   x has the shape of `point`
/// point: ndarray of any shape (or list[float])
/// r:     acceptance tolerance of the rank-one update
/// return_points: also return the probe points, reshaped like `point`
/// history: also return a list[dict] with one row per probe
///
/// Returns the M×M Hessian, or a tuple (hessian, [points], [history]).
#[pyfunction(
    signature = (
        f,
        point,
        distance,
        n_points,
        initial_scale = None,
        random_walk = None,
        learning_rate = None,
        r = None,
        lr_decay = None,
        return_points = None,
        progress = None,
        seed = None,
        verbose = None,
        history = None
    )
)]
fn sr1_hessian(
    py: Python<'_>,
    f: Py<PyAny>,
    point: Bound<'_, PyAny>,
    distance: f64,
    n_points: usize,
    initial_scale: Option<f64>,
    random_walk: Option<bool>,
    learning_rate: Option<f64>,
    r: Option<f64>,
    lr_decay: Option<bool>,
    return_points: Option<bool>,
    progress: Option<bool>,
    seed: Option<u64>,
    verbose: Option<bool>,
    history: Option<bool>,
) -> PyResult<Py<PyAny>> {
    let defaults = Sr1Config::default();
    let initial_scale = initial_scale.unwrap_or(defaults.initial_scale);
    if !initial_scale.is_finite() || initial_scale <= 0.0 {
        return Err(PyValueError::new_err(format!(
            "sr1_hessian: initial_scale must be finite and > 0, got {initial_scale}"
        )));
    }
    if !distance.is_finite() || distance < 0.0 {
        return Err(PyValueError::new_err(format!(
            "sr1_hessian: distance must be finite and >= 0, got {distance}"
        )));
    }

    let want_points = return_points.unwrap_or(defaults.emit_points);
    let want_history = history.unwrap_or(defaults.collect_trace);
    let config = Sr1Config {
        initial_scale,
        random_walk: random_walk.unwrap_or(defaults.random_walk),
        learning_rate: learning_rate.unwrap_or(defaults.learning_rate),
        tolerance: r.unwrap_or(defaults.tolerance),
        learning_rate_decay: lr_decay.unwrap_or(defaults.learning_rate_decay),
        emit_points: want_points,
        report_progress: progress.unwrap_or(defaults.report_progress),
        seed: seed.or(defaults.seed),
        verbose: verbose.unwrap_or(defaults.verbose),
        collect_trace: want_history,
    };

    let anchor = extract_point(&point)?;
    let mut estimate = approximate_hessian(PyEvaluator::new(py, f), &anchor, distance, n_points, &config)?;

    let hessian = matrix_to_py(py, &estimate.hessian).into_any().unbind();
    if !want_points && !want_history {
        return Ok(hessian);
    }

    let mut out = vec![hessian];
    if let Some(points) = estimate.points.take() {
        let arrays = points
            .iter()
            .map(|p| reshaped(py, p, anchor.shape()))
            .collect::<PyResult<Vec<_>>>()?;
        out.push(PyList::new(py, arrays)?.into_py_any(py)?);
    }
    if let Some(trace) = estimate.trace.take() {
        out.push(trace_records_to_pylist(py, trace)?);
    }
    Ok(PyTuple::new(py, out)?.into_any().unbind())
}

pub(crate) fn register(module: &Bound<PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(sr1_hessian, module)?)?;
    Ok(())
}
