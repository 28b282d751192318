//! Progress reporting for core operations.
//!
//! The shells (CLI, tests) hand a [`ProgressSink`] into each core call instead
//! of relying on any global callback state. A sink without a callback is a
//! no-op, so library users that do not care about progress pass
//! [`ProgressSink::none`].

/// The phase a run is currently in, forwarded to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the directory snapshot.
    Scan,
    /// Bucketing files by pattern key.
    Pattern,
    /// Pairwise similarity scoring.
    Score,
    /// Building the move plan.
    Plan,
    /// Applying (or previewing) planned moves.
    Execute,
    /// Removing emptied directories after a flatten.
    Cleanup,
}

impl Phase {
    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Pattern => "pattern",
            Phase::Score => "score",
            Phase::Plan => "plan",
            Phase::Execute => "execute",
            Phase::Cleanup => "cleanup",
        }
    }
}

type Callback = Box<dyn Fn(Phase, &str, u64, u64) + Send + Sync>;

/// Sink for progress and log messages, passed into each core call.
pub struct ProgressSink {
    callback: Option<Callback>,
}

impl ProgressSink {
    /// A sink that discards everything.
    pub fn none() -> Self {
        Self { callback: None }
    }

    /// A sink forwarding to the given callback.
    ///
    /// The callback receives `(phase, message, current, total)`. A `total` of
    /// zero means the phase has no meaningful item count.
    pub fn new(callback: impl Fn(Phase, &str, u64, u64) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Reports one progress event. No-op when no callback is attached.
    pub fn report(&self, phase: Phase, message: &str, current: u64, total: u64) {
        if let Some(callback) = &self.callback {
            callback(phase, message, current, total);
        }
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::none()
    }
}
