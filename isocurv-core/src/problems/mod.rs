pub mod evaluator;
pub mod test_functions;

pub use evaluator::{evaluate_point, Evaluation, Evaluator, Point};
