use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer for long-running engine passes.
///
/// Implementors can drive progress bars or logging. Engines only call it;
/// nothing it does changes their results. All methods default to no-ops.
pub trait ProgressSink: Send + Sync {
    /// A pass over `total_steps` steps has started.
    fn begin(&self, _total_steps: usize) {}

    /// `step` steps are done. Values only increase within a pass.
    fn advance(&self, _step: usize) {}

    /// The pass is finished.
    fn end(&self) {}

    /// Number of workers taking part in the current pass.
    fn set_workers(&self, _workers: usize) {}
}

/// Progress sink that ignores everything.
pub struct NoProgress;
impl ProgressSink for NoProgress {}

/// Shared step counter for one parallel pass.
///
/// Every task records its finished steps; only the designated worker
/// (rayon thread 0, or the caller's thread outside a pool) forwards the
/// running total to the sink, so other workers never touch it.
pub(crate) struct ProgressGate<'a> {
    sink: &'a dyn ProgressSink,
    done: AtomicUsize,
}

impl<'a> ProgressGate<'a> {
    /// Announce the pass to the sink.
    pub(crate) fn begin(sink: &'a dyn ProgressSink, total_steps: usize) -> Self {
        sink.set_workers(rayon::current_num_threads());
        sink.begin(total_steps);
        Self {
            sink,
            done: AtomicUsize::new(0),
        }
    }

    pub(crate) fn record(&self, steps: usize) {
        let done = self.done.fetch_add(steps, Ordering::Relaxed) + steps;
        if matches!(rayon::current_thread_index(), Some(0) | None) {
            self.sink.advance(done);
        }
    }

    pub(crate) fn finish(self) {
        self.sink.end();
        self.sink.set_workers(1);
    }
}
