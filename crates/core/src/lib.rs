#![forbid(unsafe_code)]

pub mod model;
pub mod shuffle;
pub mod time;

pub use model::{
    ActivityKind, AssignmentId, ClassId, ItemId, MediaKey, PracticeIdentity, ProgressSnapshot,
    ReviewItem, ReviewSession, SessionPhase, StudentId, UnitContent, UnitKey, DAILY_TARGET,
};
pub use shuffle::{seeded_shuffle, SeededRng};
pub use time::Clock;
