use thiserror::Error;

/// Errors raised by the geometry and data-model layers.
///
/// Evaluator failures are not represented here: they are returned unchanged
/// as the evaluator's own error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurvatureError {
    /// The gradient component along the implicit axis is exactly zero, so the
    /// level set cannot be written as a graph over the remaining coordinates.
    #[error("singular gradient (last component {component}), use a different coordinate transform")]
    SingularGradient { component: f64 },

    #[error("{what}: expected dimension {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{what} must be square, got {rows}x{cols}")]
    NotSquare {
        what: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("point of length {len} does not match shape {shape:?}")]
    ShapeMismatch { len: usize, shape: Vec<usize> },

    #[error("metric tensor is singular")]
    SingularMetric,

    #[error("eigendecomposition of the shape operator did not converge")]
    EigenDecomposition,

    #[error("subspace of interest has no directions left inside the tangent space")]
    EmptySubspace,
}

pub type Result<T> = std::result::Result<T, CurvatureError>;
