use nalgebra::{DMatrix, DVector};
use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

pub(crate) fn vector_from_py(arr: &PyReadonlyArray1<'_, f64>) -> DVector<f64> {
    let view = arr.as_array();
    DVector::from_iterator(view.len(), view.iter().copied())
}

pub(crate) fn matrix_from_py(arr: &PyReadonlyArray2<'_, f64>) -> DMatrix<f64> {
    let view = arr.as_array();
    let (rows, cols) = view.dim();
    DMatrix::from_fn(rows, cols, |i, j| view[[i, j]])
}

pub(crate) fn vector_to_py<'py>(py: Python<'py>, v: &DVector<f64>) -> Bound<'py, PyArray1<f64>> {
    PyArray1::from_slice(py, v.as_slice())
}

pub(crate) fn matrix_to_py<'py>(py: Python<'py>, m: &DMatrix<f64>) -> Bound<'py, PyArray2<f64>> {
    Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)]).into_pyarray(py)
}
