use isocurv::{CurvatureError, Evaluation, Evaluator, Point};
use nalgebra::DVector;
use numpy::{PyArray1, PyArrayDyn, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub(crate) fn curvature_err(err: CurvatureError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Flattened values of an ndarray (any rank, f64 or f32) or a list of floats.
pub(crate) fn extract_flat(out: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    if let Ok(arr) = out.cast::<PyArrayDyn<f64>>() {
        return Ok(arr.to_owned_array().iter().copied().collect());
    }
    if let Ok(arr) = out.cast::<PyArrayDyn<f32>>() {
        return Ok(arr.to_owned_array().iter().map(|&v| v as f64).collect());
    }
    Ok(out.extract::<Vec<f64>>()?)
}

/// A [`Point`] keeping the ndarray's shape, or a flat point for a list.
pub(crate) fn extract_point(obj: &Bound<'_, PyAny>) -> PyResult<Point> {
    let shape = match obj.cast::<PyArrayDyn<f64>>() {
        Ok(arr) => arr.shape().to_vec(),
        Err(_) => match obj.cast::<PyArrayDyn<f32>>() {
            Ok(arr) => arr.shape().to_vec(),
            Err(_) => Vec::new(),
        },
    };
    let values = DVector::from_vec(extract_flat(obj)?);
    if values.is_empty() {
        return Err(PyValueError::new_err("point must not be empty"));
    }
    if shape.is_empty() {
        return Ok(Point::flat(values));
    }
    Point::new(values, shape).map_err(curvature_err)
}

/// ndarray with the given original layout.
pub(crate) fn reshaped<'py>(py: Python<'py>, values: &DVector<f64>, shape: &[usize]) -> PyResult<Bound<'py, PyAny>> {
    let flat = PyArray1::from_slice(py, values.as_slice());
    if shape.is_empty() {
        return Ok(flat.into_any());
    }
    Ok(flat.reshape(shape.to_vec())?.into_any())
}

/// Python callable `f(x) -> (value, gradient)` as an [`Evaluator`].
///
/// `x` is handed over as an ndarray in the point's original shape; the
/// gradient may come back as an ndarray of any shape or a flat list.
/// Exceptions raised by `f` are returned as-is.
pub(crate) struct PyEvaluator<'py> {
    py: Python<'py>,
    func: Py<PyAny>,
}

impl<'py> PyEvaluator<'py> {
    pub(crate) fn new(py: Python<'py>, func: Py<PyAny>) -> Self {
        Self { py, func }
    }
}

impl Evaluator for PyEvaluator<'_> {
    type Error = PyErr;

    fn evaluate(&mut self, x: &DVector<f64>, shape: &[usize]) -> PyResult<Evaluation> {
        let arg = reshaped(self.py, x, shape)?;
        let out = self.func.bind(self.py).call1((arg,))?;
        let (value, gradient): (f64, Bound<'_, PyAny>) = out.extract().map_err(|_| {
            PyValueError::new_err("evaluator must return a (float, gradient) pair")
        })?;

        let gradient = extract_flat(&gradient)?;
        if gradient.len() != x.len() {
            return Err(PyValueError::new_err(format!(
                "gradient length mismatch: expected {}, got {}",
                x.len(),
                gradient.len()
            )));
        }
        Ok(Evaluation::new(value, DVector::from_vec(gradient)))
    }
}
