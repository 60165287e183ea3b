#![forbid(unsafe_code)]

pub mod assignments;
pub mod content;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod recorder;
pub mod reporter;

pub use practice_core::Clock;

pub use assignments::{AssignmentCompletion, AssignmentMetrics, AssignmentTracker, HttpAssignmentTracker};
pub use content::{ContentLibrary, ContentProvider};
pub use engine::ReviewQueueEngine;
pub use error::{ContentError, EngineError, RecorderError};
pub use lifecycle::{FinalizeStats, SessionLifecycle};
pub use recorder::{
    EndSessionRequest, HttpSessionRecorder, PracticeSessionRecorder, SessionHandle,
    StartSessionRequest,
};
pub use reporter::{NullReporter, SessionReporter};
