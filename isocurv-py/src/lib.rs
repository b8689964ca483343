use pyo3::prelude::*;

mod bindings {
    pub(crate) mod callbacks;
    pub(crate) mod convert;
    pub(crate) mod curvature;
    pub(crate) mod hessian;
    pub(crate) mod taylor;
    pub(crate) mod trace;
}

/// Python module definition
#[pymodule]
fn isocurv_py(m: &Bound<PyModule>) -> PyResult<()> {
    bindings::hessian::register(m)?;
    bindings::curvature::register(m)?;
    bindings::taylor::register(m)?;
    Ok(())
}
