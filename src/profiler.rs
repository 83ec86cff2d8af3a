use std::time::Instant;

/// Sink for the per-query spans the facade emits.
///
/// `named_start` opens a span labeled with the query text (prepared
/// statements get a `[Prepared] ` prefix); `stop` closes the most recently
/// opened span. The facade closes every span it opens, even when the driver
/// call fails, so implementations never see an unbalanced stack from this
/// crate.
pub trait Profiler: Send {
    fn named_start(&mut self, label: &str);
    fn stop(&mut self);
}

/// Profiler that ignores every span. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProfiler;

impl Profiler for NullProfiler {
    fn named_start(&mut self, _label: &str) {}

    fn stop(&mut self) {}
}

/// Profiler that logs each span's label and elapsed time at debug level
/// through `tracing`. Nested spans behave as a stack.
#[derive(Debug, Default)]
pub struct TracingProfiler {
    open: Vec<(String, Instant)>,
}

impl TracingProfiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Profiler for TracingProfiler {
    fn named_start(&mut self, label: &str) {
        self.open.push((label.to_string(), Instant::now()));
    }

    fn stop(&mut self) {
        if let Some((label, started)) = self.open.pop() {
            tracing::debug!(query = %label, elapsed = ?started.elapsed(), "query span closed");
        } else {
            tracing::warn!("profiler stop without a matching start");
        }
    }
}
