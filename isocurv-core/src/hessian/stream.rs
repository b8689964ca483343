use std::iter::FusedIterator;

use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::problems::evaluator::{evaluate_point, Evaluator, Point};

use super::trace::{Sr1TraceRecord, Sr1Tracer, TraceRow};
use super::types::{HessianEstimate, Sr1Config, Sr1Step, LEARNING_RATE_DECAY_FACTOR};

/// Point and gradient the next secant pair is taken against.
#[derive(Clone, Debug)]
struct SecantBase {
    point: DVector<f64>,
    gradient: DVector<f64>,
}

/// Lazy SR1 run around an anchor point.
///
/// Every pull draws one probe, evaluates it and applies (or skips) one
/// rank-one update. The anchor itself is evaluated on the first pull.
/// After `n_points` steps, or after the evaluator fails once, the stream
/// is exhausted.
pub struct Sr1Stream<E: Evaluator> {
    evaluator: E,
    anchor: Point,
    distance: f64,
    n_points: usize,
    config: Sr1Config,
    learning_rate: f64,
    hessian: DMatrix<f64>,
    previous: Option<SecantBase>,
    step_index: usize,
    failed: bool,
    rng: StdRng,
    tracer: Sr1Tracer,
    progress: Option<ProgressBar>,
}

impl<E: Evaluator> Sr1Stream<E> {
    pub fn new(evaluator: E, anchor: &Point, distance: f64, n_points: usize, config: &Sr1Config) -> Self {
        assert!(
            config.initial_scale > 0.0 && config.initial_scale.is_finite(),
            "initial_scale must be positive and finite, got {}",
            config.initial_scale
        );
        assert!(
            distance >= 0.0 && distance.is_finite(),
            "sampling distance must be non-negative and finite, got {distance}"
        );
        assert!(anchor.dim() > 0, "anchor point must not be empty");

        let dim = anchor.dim();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let progress = config.report_progress.then(|| {
            let bar = ProgressBar::new(n_points as u64);
            if let Ok(style) =
                ProgressStyle::with_template("sr1 {bar:40} {pos}/{len} [{elapsed_precise}<{eta_precise}]")
            {
                bar.set_style(style);
            }
            bar
        });

        Self {
            evaluator,
            anchor: anchor.clone(),
            distance,
            n_points,
            learning_rate: config.learning_rate,
            hessian: DMatrix::identity(dim, dim) * config.initial_scale,
            previous: None,
            step_index: 0,
            failed: false,
            rng,
            tracer: Sr1Tracer::new(config.verbose, config.collect_trace),
            progress,
            config: config.clone(),
        }
    }

    /// Current approximation; `initial_scale * I` before the first accepted update.
    pub fn current_hessian(&self) -> &DMatrix<f64> {
        &self.hessian
    }

    /// Learning rate the next step will use (decay included).
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn steps_taken(&self) -> usize {
        self.step_index
    }

    pub fn dim(&self) -> usize {
        self.anchor.dim()
    }

    /// Trace rows so far, when `collect_trace` is set.
    pub fn trace(&self) -> Option<&[Sr1TraceRecord]> {
        self.tracer.history()
    }

    fn is_exhausted(&self) -> bool {
        self.failed || self.step_index >= self.n_points
    }

    fn check_gradient(&self, gradient: &DVector<f64>) {
        assert_eq!(
            gradient.len(),
            self.anchor.dim(),
            "evaluator returned a gradient of length {} for a point of dimension {}",
            gradient.len(),
            self.anchor.dim()
        );
    }

    fn secant_base(&mut self) -> Result<SecantBase, E::Error> {
        if let Some(base) = &self.previous {
            return Ok(base.clone());
        }
        let anchor_eval = evaluate_point(&mut self.evaluator, &self.anchor)?;
        self.check_gradient(&anchor_eval.gradient);
        let base = SecantBase {
            point: self.anchor.values().clone(),
            gradient: anchor_eval.gradient,
        };
        self.previous = Some(base.clone());
        Ok(base)
    }

    fn step(&mut self) -> Result<Sr1Step, E::Error> {
        let base = self.secant_base()?;
        let k = self.step_index;

        if self.config.learning_rate_decay && k == self.n_points / 2 {
            self.learning_rate *= LEARNING_RATE_DECAY_FACTOR;
        }

        // Isotropic Gaussian with E‖ξ‖² = distance².
        let dim = self.anchor.dim();
        let scale = self.distance / (dim as f64).sqrt();
        let rng = &mut self.rng;
        let noise = DVector::<f64>::from_fn(dim, |_, _| rng.sample(StandardNormal));
        let probe = if self.config.random_walk {
            &base.point + noise * scale
        } else {
            self.anchor.values() + noise * scale
        };

        let eval = self.evaluator.evaluate(&probe, self.anchor.shape())?;
        self.check_gradient(&eval.gradient);

        let delta_x = &probe - &base.point;
        let y = &eval.gradient - &base.gradient;
        let residual = y - &self.hessian * &delta_x;
        let denominator = residual.dot(&delta_x);
        let step_norm = delta_x.norm();
        let residual_norm = residual.norm();
        let threshold = self.config.tolerance * step_norm * residual_norm;

        let accepted = denominator.abs() > threshold;
        let mut row = TraceRow::iter(k)
            .step_norm(step_norm)
            .residual_norm(residual_norm)
            .denominator(denominator)
            .threshold(threshold)
            .learning_rate(self.learning_rate)
            .accepted(accepted);
        if accepted {
            // r rᵀ is exactly symmetric; one common scalar keeps it that way.
            let outer = &residual * residual.transpose();
            self.hessian += outer * (self.learning_rate / denominator);
        } else {
            tracing::debug!(iter = k, denominator, threshold, "sr1 update rejected");
            row = row.note("rejected");
        }
        self.tracer.emit(row);

        if self.config.random_walk {
            self.previous = Some(SecantBase {
                point: probe.clone(),
                gradient: eval.gradient,
            });
        }

        self.step_index += 1;
        if let Some(bar) = &self.progress {
            bar.inc(1);
            if self.step_index == self.n_points {
                bar.finish();
            }
        }

        Ok(Sr1Step {
            iter: k,
            hessian: self.hessian.clone(),
            point: self.config.emit_points.then_some(probe),
            accepted,
        })
    }

    fn into_estimate(mut self, points: Option<Vec<DVector<f64>>>, accepted_updates: usize) -> HessianEstimate {
        HessianEstimate {
            trace: self.tracer.take_history(),
            hessian: self.hessian,
            points,
            accepted_updates,
        }
    }
}

impl<E: Evaluator> Iterator for Sr1Stream<E> {
    type Item = Result<Sr1Step, E::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        match self.step() {
            Ok(step) => Some(Ok(step)),
            Err(err) => {
                self.failed = true;
                if let Some(bar) = &self.progress {
                    bar.abandon();
                }
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_exhausted() {
            (0, Some(0))
        } else {
            (0, Some(self.n_points - self.step_index))
        }
    }
}

impl<E: Evaluator> FusedIterator for Sr1Stream<E> {}

/// Lazy sequence of `n_points` SR1 Hessian snapshots around `anchor`.
///
/// `distance` is the expected Euclidean distance between a probe and the
/// point it is drawn around.
pub fn approximate_hessian_stream<E: Evaluator>(
    evaluator: E,
    anchor: &Point,
    distance: f64,
    n_points: usize,
    config: &Sr1Config,
) -> Sr1Stream<E> {
    Sr1Stream::new(evaluator, anchor, distance, n_points, config)
}

/// Drain an SR1 run and keep only the final approximation (and the probe
/// points when `emit_points` is set).
///
/// With `n_points == 0` the seed `initial_scale * I` is returned and the
/// evaluator is never called.
pub fn approximate_hessian<E: Evaluator>(
    evaluator: E,
    anchor: &Point,
    distance: f64,
    n_points: usize,
    config: &Sr1Config,
) -> Result<HessianEstimate, E::Error> {
    let mut stream = approximate_hessian_stream(evaluator, anchor, distance, n_points, config);
    let mut points = config.emit_points.then(|| Vec::with_capacity(n_points));
    let mut accepted_updates = 0;

    for step in stream.by_ref() {
        let step = step?;
        if step.accepted {
            accepted_updates += 1;
        }
        if let (Some(points), Some(point)) = (points.as_mut(), step.point) {
            points.push(point);
        }
    }

    tracing::debug!(
        dim = stream.dim(),
        n_points,
        accepted_updates,
        "sr1 hessian approximation finished"
    );
    Ok(stream.into_estimate(points, accepted_updates))
}
