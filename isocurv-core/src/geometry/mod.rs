//! Shape operators and principal curvatures from a (gradient, Hessian) pair.
//!
//! - graph representation: the function as a height field over input space
//! - iso-response representation: the level set through the point, charted
//!   by the implicit function theorem over the first M − 1 (rotated) axes

mod curvature;
mod eigen;
mod linalg;
mod shape_operator;

pub use curvature::{principal_curvatures_graph, principal_curvatures_iso_surface, PrincipalCurvatures};
pub use eigen::IMAGINARY_TOLERANCE;
pub use shape_operator::{
    graph_shape_operator, iso_surface_shape_operator, GraphShapeOperator, IsoSurfaceShapeOperator,
    NEAR_SINGULAR_THRESHOLD,
};
