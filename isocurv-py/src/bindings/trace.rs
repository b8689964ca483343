use isocurv::Sr1TraceRecord;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

pub(crate) fn trace_records_to_pylist(py: Python<'_>, records: Vec<Sr1TraceRecord>) -> PyResult<Py<PyAny>> {
    let list = PyList::empty(py);
    for row in records {
        let d = PyDict::new(py);
        d.set_item("iter", row.iter)?;
        d.set_item("step_norm", row.step_norm)?;
        d.set_item("residual_norm", row.residual_norm)?;
        d.set_item("denominator", row.denominator)?;
        d.set_item("threshold", row.threshold)?;
        d.set_item("learning_rate", row.learning_rate)?;
        d.set_item("accepted", row.accepted)?;
        d.set_item("note", row.note)?;
        list.append(d)?;
    }
    Ok(list.into_any().unbind())
}
