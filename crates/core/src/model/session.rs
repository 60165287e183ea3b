use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

use crate::model::ids::ItemId;
use crate::model::item::ReviewItem;
use crate::model::progress::ProgressSnapshot;
use crate::model::unit::UnitKey;
use crate::shuffle::{seeded_shuffle, SeededRng};

/// Daily cap on reviewable items per session ("Today's 10").
pub const DAILY_TARGET: usize = 10;

//
// ─── SESSION PHASE ────────────────────────────────────────────────────────────
//

/// Observable lifecycle phase of a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The unit had no items; the session is permanently inert.
    NoContent,
    /// Items remain in the queue.
    Active,
    /// The queue drained and the target was reached.
    Complete,
}

//
// ─── REVIEW SESSION ───────────────────────────────────────────────────────────
//

/// One student's pass through a unit's "Today's 10" queue.
///
/// The queue is seeded deterministically from the unit key: the full item
/// list is shuffled with [`seeded_shuffle`] and the first
/// `min(DAILY_TARGET, items)` become the working set. Items leave the queue
/// only by being mastered; "repeat later" rotates the head to the back.
///
/// The session is exclusively owned by the engine driving it; nothing else
/// mutates it.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    unit_key: UnitKey,
    queue: VecDeque<ReviewItem>,
    completed_ids: HashSet<ItemId>,
    mastered_count: u32,
    target: usize,
    started_at: DateTime<Utc>,
    session_complete: bool,
}

impl ReviewSession {
    /// Starts a session over the unit's items.
    ///
    /// Restarting with the same key and items reproduces the identical
    /// initial ordering.
    #[must_use]
    pub fn start(unit_key: UnitKey, items: &[ReviewItem], now: DateTime<Utc>) -> Self {
        let target = DAILY_TARGET.min(items.len());

        let mut rng = SeededRng::from_seed_str(&unit_key.seed_string());
        let mut shuffled: Vec<ReviewItem> = items.to_vec();
        seeded_shuffle(&mut shuffled, &mut rng);
        shuffled.truncate(target);

        Self {
            unit_key,
            queue: shuffled.into(),
            completed_ids: HashSet::new(),
            mastered_count: 0,
            target,
            started_at: now,
            session_complete: false,
        }
    }

    #[must_use]
    pub fn unit_key(&self) -> &UnitKey {
        &self.unit_key
    }

    /// Session target: `min(10, items available in the unit)`.
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn mastered_count(&self) -> u32 {
        self.mastered_count
    }

    /// Number of items mastered so far.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_ids.len()
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session_complete
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.target == 0 {
            SessionPhase::NoContent
        } else if self.session_complete {
            SessionPhase::Complete
        } else {
            SessionPhase::Active
        }
    }

    /// Head of the queue, or `None` once the session is drained or inert.
    #[must_use]
    pub fn current_item(&self) -> Option<&ReviewItem> {
        self.queue.front()
    }

    /// Marks the current item mastered and advances the queue.
    ///
    /// Returns the mastered item's id, or `None` as a silent no-op when the
    /// queue is already empty. The no-op contract deliberately matches the
    /// reference behavior rather than signalling an error.
    pub fn mark_mastered(&mut self) -> Option<ItemId> {
        let item = self.queue.pop_front()?;
        let id = item.id();
        self.completed_ids.insert(id);
        self.mastered_count += 1;
        self.check_completion();
        Some(id)
    }

    /// Rotates the current item to the back of the queue for another look.
    ///
    /// Counters are untouched; with a single item in the queue this has no
    /// observable effect. Returns `true` if an item was rotated.
    pub fn mark_repeat_later(&mut self) -> bool {
        let Some(item) = self.queue.pop_front() else {
            return false;
        };
        self.queue.push_back(item);
        self.check_completion();
        true
    }

    /// Builds a progress snapshot as of `now`.
    #[must_use]
    pub fn progress(&self, now: DateTime<Utc>) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed_ids.len(),
            total: self.target,
            mastered: self.mastered_count,
            started_at: self.started_at,
            elapsed_ms: (now - self.started_at).num_milliseconds(),
            session_complete: self.session_complete,
        }
    }

    // One-way transition: only mastering can drain the queue, so completion
    // is re-checked after every mutation and latched.
    fn check_completion(&mut self) {
        if !self.session_complete
            && self.target > 0
            && self.queue.is_empty()
            && self.completed_ids.len() >= self.target
        {
            self.session_complete = true;
        }
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
