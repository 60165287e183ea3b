mod activity;
mod identity;
mod ids;
mod item;
mod progress;
mod session;
mod unit;

pub use activity::ActivityKind;
pub use identity::PracticeIdentity;
pub use ids::{AssignmentId, ClassId, ItemId, ParseIdError, StudentId};
pub use item::{ItemError, MediaKey, ReviewItem};
pub use progress::{ProgressKey, ProgressSnapshot};
pub use session::{ReviewSession, SessionPhase, DAILY_TARGET};
pub use unit::{UnitContent, UnitError, UnitKey};
