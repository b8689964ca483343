//! isocurv: local curvature of iso-response surfaces
//!
//! - `Evaluator`: the scalar function under study (value + gradient at a point)
//! - `hessian`: SR1 Hessian approximation from gradient probes only
//! - `geometry`: shape operators of the graph / level set and their
//!   principal curvatures and directions
//! - `taylor`: second-order consistency checks of a Hessian estimate
//!
//! Everything is synchronous f64 arithmetic on the host.

pub mod error;
pub mod geometry;
pub mod hessian;
pub mod problems;
pub mod taylor;

pub use error::{CurvatureError, Result};
pub use geometry::{
    graph_shape_operator, iso_surface_shape_operator, principal_curvatures_graph,
    principal_curvatures_iso_surface, GraphShapeOperator, IsoSurfaceShapeOperator, PrincipalCurvatures,
};
pub use hessian::{
    approximate_hessian, approximate_hessian_stream, HessianEstimate, Sr1Config, Sr1Step, Sr1Stream,
    Sr1TraceRecord,
};
pub use problems::{Evaluation, Evaluator, Point};
pub use taylor::{hessian_approximate_response, taylor_approximation, taylor_error};
