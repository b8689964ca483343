use isocurv::{
    graph_shape_operator, iso_surface_shape_operator, principal_curvatures_graph, principal_curvatures_iso_surface,
    PrincipalCurvatures,
};
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::bindings::callbacks::curvature_err;
use crate::bindings::convert::{matrix_from_py, matrix_to_py, vector_from_py, vector_to_py};

type Matrix<'py> = Bound<'py, PyArray2<f64>>;
type CurvatureTuple<'py> = (Matrix<'py>, Bound<'py, PyArray1<f64>>, Matrix<'py>);

fn curvature_tuple<'py>(py: Python<'py>, pc: &PrincipalCurvatures) -> CurvatureTuple<'py> {
    (
        matrix_to_py(py, &pc.shape_operator),
        vector_to_py(py, &pc.curvatures),
        matrix_to_py(py, &pc.directions),
    )
}

/// Shape operator of the graph of f.
///
/// Returns (shape_operator, metric_tensor).
#[pyfunction]
fn shape_operator_graph<'py>(
    py: Python<'py>,
    grad: PyReadonlyArray1<'py, f64>,
    hess: PyReadonlyArray2<'py, f64>,
) -> PyResult<(Matrix<'py>, Matrix<'py>)> {
    let graph = graph_shape_operator(&vector_from_py(&grad), &matrix_from_py(&hess)).map_err(curvature_err)?;
    Ok((
        matrix_to_py(py, &graph.shape_operator),
        matrix_to_py(py, &graph.metric_tensor),
    ))
}

/// Shape operator of the level set of f through the point.
///
/// coordinate_transformation: optional orthogonal M×M matrix; the last
///   transformed axis is solved for implicitly.
///
/// Returns (shape_operator, embedding_differential, metric_tensor).
#[pyfunction(signature = (grad, hess, coordinate_transformation = None))]
fn shape_operator_isoresponse_surface<'py>(
    py: Python<'py>,
    grad: PyReadonlyArray1<'py, f64>,
    hess: PyReadonlyArray2<'py, f64>,
    coordinate_transformation: Option<PyReadonlyArray2<'py, f64>>,
) -> PyResult<(Matrix<'py>, Matrix<'py>, Matrix<'py>)> {
    let transform = coordinate_transformation.as_ref().map(matrix_from_py);
    let iso = iso_surface_shape_operator(&vector_from_py(&grad), &matrix_from_py(&hess), transform.as_ref())
        .map_err(curvature_err)?;
    Ok((
        matrix_to_py(py, &iso.shape_operator),
        matrix_to_py(py, &iso.embedding_differential),
        matrix_to_py(py, &iso.metric_tensor),
    ))
}

/// Principal curvatures of the graph of f.
///
/// Returns (shape_operator, curvatures, directions); curvatures descend and
/// column i of directions belongs to curvatures[i].
#[pyfunction]
fn local_response_curvature_graph<'py>(
    py: Python<'py>,
    grad: PyReadonlyArray1<'py, f64>,
    hess: PyReadonlyArray2<'py, f64>,
) -> PyResult<CurvatureTuple<'py>> {
    let pc = principal_curvatures_graph(&vector_from_py(&grad), &matrix_from_py(&hess)).map_err(curvature_err)?;
    Ok(curvature_tuple(py, &pc))
}

/// Principal curvatures of the iso-response surface through the point.
///
/// projection_subspace_of_interest: optional k×M matrix whose rows span the
///   directions to restrict to
/// coordinate_transformation: as in shape_operator_isoresponse_surface
///
/// Returns (shape_operator, curvatures, directions) with directions in
/// input coordinates.
#[pyfunction(signature = (grad, hess, projection_subspace_of_interest = None, coordinate_transformation = None))]
fn local_response_curvature_isoresponse_surface<'py>(
    py: Python<'py>,
    grad: PyReadonlyArray1<'py, f64>,
    hess: PyReadonlyArray2<'py, f64>,
    projection_subspace_of_interest: Option<PyReadonlyArray2<'py, f64>>,
    coordinate_transformation: Option<PyReadonlyArray2<'py, f64>>,
) -> PyResult<CurvatureTuple<'py>> {
    let subspace = projection_subspace_of_interest.as_ref().map(matrix_from_py);
    let transform = coordinate_transformation.as_ref().map(matrix_from_py);
    let pc = principal_curvatures_iso_surface(
        &vector_from_py(&grad),
        &matrix_from_py(&hess),
        subspace.as_ref(),
        transform.as_ref(),
    )
    .map_err(curvature_err)?;
    Ok(curvature_tuple(py, &pc))
}

pub(crate) fn register(module: &Bound<PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(shape_operator_graph, module)?)?;
    module.add_function(wrap_pyfunction!(shape_operator_isoresponse_surface, module)?)?;
    module.add_function(wrap_pyfunction!(local_response_curvature_graph, module)?)?;
    module.add_function(wrap_pyfunction!(local_response_curvature_isoresponse_surface, module)?)?;
    Ok(())
}
