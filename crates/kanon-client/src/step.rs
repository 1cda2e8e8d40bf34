//! Named steps around caller code.
//!
//! [`ContractExecutor::step`](crate::ContractExecutor::step) opens a step,
//! runs a closure inside it and reports one record whose children are the
//! contracts and nested steps the closure ran. Steps are tracked per task:
//! work moved to another task with `tokio::spawn` reports on its own.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use kanon_core::{StepRecord, StepStatus};
use parking_lot::Mutex;
use tracing::{info_span, Instrument};

use crate::report::Reporter;

tokio::task_local! {
    static OPEN_STEP: Arc<Mutex<Vec<StepRecord>>>;
}

/// Decides whether a step body passed.
pub trait StepOutcome {
    /// Returns true if the step passed.
    fn passed(&self) -> bool;
}

impl<T, E> StepOutcome for Result<T, E> {
    fn passed(&self) -> bool {
        self.is_ok()
    }
}

impl StepOutcome for () {
    fn passed(&self) -> bool {
        true
    }
}

impl StepOutcome for bool {
    fn passed(&self) -> bool {
        *self
    }
}

/// Hands a finished record to the enclosing step, or to `reporter` when no
/// step is open.
pub(crate) fn submit(record: StepRecord, reporter: &dyn Reporter) {
    let mut pending = Some(record);
    let _ = OPEN_STEP.try_with(|children| {
        if let Some(record) = pending.take() {
            children.lock().push(record);
        }
    });
    if let Some(record) = pending {
        reporter.step(&record);
    }
}

pub(crate) async fn run_step<F, Fut>(name: String, reporter: &dyn Reporter, body: F) -> Fut::Output
where
    F: FnOnce() -> Fut,
    Fut: Future,
    Fut::Output: StepOutcome,
{
    let children = Arc::new(Mutex::new(Vec::new()));
    let span = info_span!("step", step = %name);
    let started = Instant::now();

    let output = OPEN_STEP
        .scope(Arc::clone(&children), body())
        .instrument(span)
        .await;

    let children = std::mem::take(&mut *children.lock());
    let record = StepRecord::new(name, StepStatus::from_ok(output.passed()), started.elapsed())
        .with_children(children);
    submit(record, reporter);
    output
}
