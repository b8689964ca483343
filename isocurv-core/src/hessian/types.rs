use nalgebra::{DMatrix, DVector};

use super::trace::Sr1TraceRecord;

/// Learning-rate multiplier applied once, halfway through a decaying run.
pub const LEARNING_RATE_DECAY_FACTOR: f64 = 0.1;

/// Configuration of the SR1 Hessian approximator.
#[derive(Clone, Debug, PartialEq)]
pub struct Sr1Config {
    /// Seed curvature: the run starts from `initial_scale * I`. Must be > 0.
    pub initial_scale: f64,
    /// If true, each probe is drawn around the previous probe and the secant
    /// pair is taken between consecutive probes. Otherwise every probe is
    /// drawn around the anchor and paired with it.
    pub random_walk: bool,
    /// Multiplier on every accepted rank-one update.
    pub learning_rate: f64,
    /// Acceptance threshold of the rank-one update,
    /// `|r·Δx| > tolerance * ‖Δx‖ * ‖r‖`.
    pub tolerance: f64,
    /// Multiply the learning rate by [`LEARNING_RATE_DECAY_FACTOR`] at step n/2.
    pub learning_rate_decay: bool,
    /// Also yield the probe point of every step.
    pub emit_points: bool,
    /// Draw a progress bar on stderr.
    pub report_progress: bool,
    /// Seed of the Gaussian probe generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// If true, logs one trace line per step.
    pub verbose: bool,
    /// If true, keeps per-step trace rows.
    pub collect_trace: bool,
}

impl Sr1Config {
    pub fn new() -> Self {
        Self {
            initial_scale: 1e-6,
            random_walk: true,
            learning_rate: 1.0,
            tolerance: 1e-8,
            learning_rate_decay: false,
            emit_points: false,
            report_progress: false,
            seed: None,
            verbose: false,
            collect_trace: false,
        }
    }

    pub fn with_initial_scale(mut self, initial_scale: f64) -> Self {
        self.initial_scale = initial_scale;
        self
    }

    pub fn with_random_walk(mut self, random_walk: bool) -> Self {
        self.random_walk = random_walk;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_learning_rate_decay(mut self, learning_rate_decay: bool) -> Self {
        self.learning_rate_decay = learning_rate_decay;
        self
    }

    pub fn with_emit_points(mut self, emit_points: bool) -> Self {
        self.emit_points = emit_points;
        self
    }

    pub fn with_report_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_collect_trace(mut self, collect_trace: bool) -> Self {
        self.collect_trace = collect_trace;
        self
    }
}

impl Default for Sr1Config {
    fn default() -> Self {
        Self::new()
    }
}

/// One snapshot of an SR1 run.
#[derive(Clone, Debug)]
pub struct Sr1Step {
    /// Zero-based step index.
    pub iter: usize,
    /// Hessian approximation after this step. Independent of later steps.
    pub hessian: DMatrix<f64>,
    /// Probe point of this step, when `emit_points` is set.
    pub point: Option<DVector<f64>>,
    /// Whether the rank-one update of this step passed the acceptance test.
    pub accepted: bool,
}

/// Result of draining an SR1 run.
#[derive(Clone, Debug)]
pub struct HessianEstimate {
    pub hessian: DMatrix<f64>,
    /// All probe points in step order, when `emit_points` is set.
    pub points: Option<Vec<DVector<f64>>>,
    pub accepted_updates: usize,
    pub trace: Option<Vec<Sr1TraceRecord>>,
}
