use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of practice activity being recorded against the backend.
///
/// Wire names match the practice-session API (`flashcards`, `memory_match`,
/// `touch_listen`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// The "Today's 10" flashcard review queue.
    Flashcards,
    /// Memory match card-pair game.
    MemoryMatch,
    /// Touch-and-listen picture game.
    TouchListen,
}

impl ActivityKind {
    /// Wire name used in recorder payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Flashcards => "flashcards",
            ActivityKind::MemoryMatch => "memory_match",
            ActivityKind::TouchListen => "touch_listen",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
