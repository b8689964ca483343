use nalgebra::DVector;

use crate::error::{CurvatureError, Result};

/// A point of the input space.
///
/// Values are always stored flat; `shape` is the original multi-axis layout
/// the evaluator expects (e.g. `[channels, height, width]`). An empty shape
/// means the point is already a plain vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    values: DVector<f64>,
    shape: Vec<usize>,
}

impl Point {
    pub fn new(values: DVector<f64>, shape: Vec<usize>) -> Result<Self> {
        if !shape.is_empty() && shape.iter().product::<usize>() != values.len() {
            return Err(CurvatureError::ShapeMismatch {
                len: values.len(),
                shape,
            });
        }
        Ok(Self { values, shape })
    }

    /// A point whose original layout is a plain vector.
    pub fn flat(values: DVector<f64>) -> Self {
        let shape = vec![values.len()];
        Self { values, shape }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self::flat(DVector::from_column_slice(values))
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat dimension M.
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Scalar response and its flattened gradient at a point.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub gradient: DVector<f64>,
}

impl Evaluation {
    pub fn new(value: f64, gradient: DVector<f64>) -> Self {
        Self { value, gradient }
    }
}

/// Scalar function with gradient access.
///
/// `x` is always flat; `shape` is the layout the underlying model wants it
/// reshaped to. The returned gradient must be flat with `x.len()` entries.
pub trait Evaluator {
    type Error;

    fn evaluate(&mut self, x: &DVector<f64>, shape: &[usize]) -> std::result::Result<Evaluation, Self::Error>;
}

impl<F, E> Evaluator for F
where
    F: FnMut(&DVector<f64>, &[usize]) -> std::result::Result<Evaluation, E>,
{
    type Error = E;

    fn evaluate(&mut self, x: &DVector<f64>, shape: &[usize]) -> std::result::Result<Evaluation, E> {
        self(x, shape)
    }
}

/// Evaluate at a [`Point`], passing its original shape along.
pub fn evaluate_point<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    point: &Point,
) -> std::result::Result<Evaluation, E::Error> {
    evaluator.evaluate(point.values(), point.shape())
}
