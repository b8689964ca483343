//! Analytic scalar functions with exact gradients and Hessians.
//!
//! Useful to check the approximator and the curvature engine against
//! closed-form answers.

use std::convert::Infallible;

use nalgebra::{DMatrix, DVector};

use super::evaluator::{Evaluation, Evaluator};

/// f(x) = xᵀ A x.
///
/// The gradient is (A + Aᵀ) x and the Hessian is A + Aᵀ, so for a symmetric
/// `a` the Hessian is 2A.
#[derive(Clone, Debug)]
pub struct QuadraticForm {
    pub a: DMatrix<f64>,
}

impl QuadraticForm {
    pub fn new(a: DMatrix<f64>) -> Self {
        assert!(a.is_square(), "quadratic form matrix must be square");
        Self { a }
    }

    pub fn value(&self, x: &DVector<f64>) -> f64 {
        x.dot(&(&self.a * x))
    }

    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.a * x + self.a.transpose() * x
    }

    pub fn hessian(&self) -> DMatrix<f64> {
        &self.a + self.a.transpose()
    }
}

impl Evaluator for QuadraticForm {
    type Error = Infallible;

    fn evaluate(&mut self, x: &DVector<f64>, _shape: &[usize]) -> Result<Evaluation, Infallible> {
        Ok(Evaluation::new(self.value(x), self.gradient(x)))
    }
}

/// f(x) = x_0² + ... + x_{M-2}² − x_{M-1}.
///
/// Its level set through the origin is a paraboloid cap over the first
/// M − 1 axes; every principal curvature there has magnitude 2.
#[derive(Clone, Copy, Debug, Default)]
pub struct Paraboloid;

impl Paraboloid {
    pub fn value(&self, x: &DVector<f64>) -> f64 {
        let m = x.len();
        x.rows(0, m - 1).norm_squared() - x[m - 1]
    }

    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        let m = x.len();
        let mut grad = x * 2.0;
        grad[m - 1] = -1.0;
        grad
    }

    pub fn hessian(&self, dim: usize) -> DMatrix<f64> {
        let mut hess = DMatrix::identity(dim, dim) * 2.0;
        hess[(dim - 1, dim - 1)] = 0.0;
        hess
    }
}

impl Evaluator for Paraboloid {
    type Error = Infallible;

    fn evaluate(&mut self, x: &DVector<f64>, _shape: &[usize]) -> Result<Evaluation, Infallible> {
        Ok(Evaluation::new(self.value(x), self.gradient(x)))
    }
}
