//! Step reporting.
//!
//! Reporters observe finished steps. They never influence whether a call
//! passes or fails.

use kanon_core::{StepRecord, StepStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Receives each finished top-level step, children included.
///
/// Contracts and steps that run inside an open step are reported as its
/// children, not on their own.
pub trait Reporter: Send + Sync {
    /// Called once per top-level step, after it and its children finished.
    fn step(&self, record: &StepRecord);
}

/// Discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn step(&self, _record: &StepRecord) {}
}

/// Emits one `tracing` event per step, nested steps included.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    fn emit(record: &StepRecord, depth: usize) {
        let duration_ms = record.duration.as_secs_f64() * 1000.0;
        match record.status {
            StepStatus::Passed => info!(
                step = %record.name,
                depth,
                duration_ms,
                "step passed"
            ),
            StepStatus::Failed => warn!(
                step = %record.name,
                depth,
                duration_ms,
                "step failed"
            ),
        }
        for child in &record.children {
            Self::emit(child, depth + 1);
        }
    }
}

impl Reporter for TracingReporter {
    fn step(&self, record: &StepRecord) {
        Self::emit(record, 0);
    }
}

/// Keeps every reported step in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    steps: Arc<Mutex<Vec<StepRecord>>>,
}

impl RecordingReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded steps in report order.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().clone()
    }

    /// Returns the names of the recorded top-level steps.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.lock().iter().map(|s| s.name.clone()).collect()
    }

    /// Clears the recorded steps.
    pub fn clear(&self) {
        self.steps.lock().clear();
    }
}

impl Reporter for RecordingReporter {
    fn step(&self, record: &StepRecord) {
        self.steps.lock().push(record.clone());
    }
}
