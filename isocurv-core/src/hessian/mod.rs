//! SR1 (symmetric rank-one) Hessian approximation from gradient probes.

mod stream;
mod trace;
mod types;

pub use stream::{approximate_hessian, approximate_hessian_stream, Sr1Stream};
pub use trace::Sr1TraceRecord;
pub use types::{HessianEstimate, Sr1Config, Sr1Step, LEARNING_RATE_DECAY_FACTOR};
