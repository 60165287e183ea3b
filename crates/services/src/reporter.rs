use practice_core::model::ProgressSnapshot;

/// Downstream sink for live session progress.
///
/// Called zero or more times per session, synchronously from the engine's
/// mutation path, so implementations should be cheap. The final call of a
/// finished session carries `session_complete = true`; an abandoned session
/// simply stops receiving calls.
pub trait SessionReporter: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Reporter that drops every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl SessionReporter for NullReporter {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}
