use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live progress report for one review session.
///
/// Emitted to the session reporter after state-changing operations; the final
/// snapshot of a finished session carries `session_complete = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Items mastered so far (size of the completed set).
    pub completed: usize,
    /// Session target: `min(10, items in the unit)`.
    pub total: usize,
    /// Running mastered counter; equals `completed` in the current rules but
    /// reported separately for the analytics payload.
    pub mastered: u32,
    /// When the session (re)started.
    pub started_at: DateTime<Utc>,
    /// Milliseconds since `started_at` at emission time.
    pub elapsed_ms: i64,
    /// True exactly once the queue drains and the target is reached.
    pub session_complete: bool,
}

/// De-duplication key for progress snapshots.
///
/// `elapsed_ms` is deliberately excluded: two snapshots that differ only in
/// elapsed time are considered identical and the second is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressKey {
    pub completed: usize,
    pub mastered: u32,
    pub session_complete: bool,
}

impl ProgressSnapshot {
    /// Key used to suppress value-identical consecutive emissions.
    #[must_use]
    pub fn dedup_key(&self) -> ProgressKey {
        ProgressKey {
            completed: self.completed,
            mastered: self.mastered,
            session_complete: self.session_complete,
        }
    }
}
