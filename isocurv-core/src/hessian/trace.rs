use std::fmt::Write;

/// One SR1 step as seen by the acceptance test.
#[derive(Clone, Debug, PartialEq)]
pub struct Sr1TraceRecord {
    pub iter: usize,
    /// ‖Δx‖ between the probe and the previous point.
    pub step_norm: f64,
    /// ‖r‖ where r = y − HΔx.
    pub residual_norm: f64,
    pub denominator: f64,
    pub threshold: f64,
    pub learning_rate: f64,
    pub accepted: bool,
    pub note: Option<&'static str>,
}

impl Sr1TraceRecord {
    fn format_line(&self) -> String {
        let mut line = format!("[sr1] iter {:>6}", self.iter);
        let _ = write!(line, " | dx {:>13.6e}", self.step_norm);
        let _ = write!(line, " | r {:>13.6e}", self.residual_norm);
        let _ = write!(line, " | denom {:>+13.6e}", self.denominator);
        let _ = write!(line, " | thresh {:>9.3e}", self.threshold);
        let _ = write!(line, " | lr {:>9.3e}", self.learning_rate);
        let _ = write!(line, " | {}", if self.accepted { "update" } else { "skip" });
        if let Some(note) = self.note {
            let _ = write!(line, " | note {note}");
        }
        line
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TraceRow {
    iter: usize,
    step_norm: f64,
    residual_norm: f64,
    denominator: f64,
    threshold: f64,
    learning_rate: f64,
    accepted: bool,
    note: Option<&'static str>,
}

impl TraceRow {
    pub(crate) fn iter(iter: usize) -> Self {
        Self {
            iter,
            step_norm: 0.0,
            residual_norm: 0.0,
            denominator: 0.0,
            threshold: 0.0,
            learning_rate: 0.0,
            accepted: false,
            note: None,
        }
    }

    pub(crate) fn step_norm(mut self, step_norm: f64) -> Self {
        self.step_norm = step_norm;
        self
    }

    pub(crate) fn residual_norm(mut self, residual_norm: f64) -> Self {
        self.residual_norm = residual_norm;
        self
    }

    pub(crate) fn denominator(mut self, denominator: f64) -> Self {
        self.denominator = denominator;
        self
    }

    pub(crate) fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub(crate) fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub(crate) fn accepted(mut self, accepted: bool) -> Self {
        self.accepted = accepted;
        self
    }

    pub(crate) fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Sr1Tracer {
    verbose: bool,
    history: Option<Vec<Sr1TraceRecord>>,
}

impl Sr1Tracer {
    pub(crate) fn new(verbose: bool, collect: bool) -> Self {
        Self {
            verbose,
            history: collect.then(Vec::new),
        }
    }

    pub(crate) fn emit(&mut self, row: TraceRow) {
        let record = Sr1TraceRecord {
            iter: row.iter,
            step_norm: row.step_norm,
            residual_norm: row.residual_norm,
            denominator: row.denominator,
            threshold: row.threshold,
            learning_rate: row.learning_rate,
            accepted: row.accepted,
            note: row.note,
        };

        if self.verbose {
            tracing::info!("{}", record.format_line());
        }

        if let Some(history) = &mut self.history {
            history.push(record);
        }
    }

    pub(crate) fn history(&self) -> Option<&[Sr1TraceRecord]> {
        self.history.as_deref()
    }

    pub(crate) fn take_history(&mut self) -> Option<Vec<Sr1TraceRecord>> {
        self.history.take()
    }
}
