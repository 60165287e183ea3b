use std::sync::Arc;
use tokio::task::JoinHandle;

use practice_core::model::{
    ActivityKind, ItemId, PracticeIdentity, ProgressKey, ProgressSnapshot, ReviewItem,
    ReviewSession, SessionPhase, UnitContent, UnitKey,
};
use practice_core::Clock;

use crate::content::ContentProvider;
use crate::error::EngineError;
use crate::lifecycle::{FinalizeStats, SessionLifecycle};
use crate::reporter::SessionReporter;

//
// ─── ENGINE ───────────────────────────────────────────────────────────────────
//

/// Drives one student through a unit's "Today's 10" review queue.
///
/// The engine exclusively owns its [`ReviewSession`]; callers interact only
/// through the operations below, synchronously from a single thread (the UI
/// event loop). After every state-changing operation a progress snapshot is
/// offered to the reporter, de-duplicated on `(completed, mastered,
/// session_complete)` so value-identical re-emissions are suppressed.
///
/// Recorder traffic runs through [`SessionLifecycle`] and never blocks or
/// fails a queue mutation.
pub struct ReviewQueueEngine {
    clock: Clock,
    reporter: Arc<dyn SessionReporter>,
    lifecycle: SessionLifecycle,
    identity: PracticeIdentity,
    unit: Option<UnitContent>,
    session: Option<ReviewSession>,
    last_progress: Option<ProgressKey>,
    pending: Vec<JoinHandle<()>>,
}

impl ReviewQueueEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        reporter: Arc<dyn SessionReporter>,
        lifecycle: SessionLifecycle,
    ) -> Self {
        Self {
            clock,
            reporter,
            lifecycle,
            identity: PracticeIdentity::anonymous(),
            unit: None,
            session: None,
            last_progress: None,
            pending: Vec::new(),
        }
    }

    /// Start (or re-start) a session over the given unit.
    ///
    /// Any in-flight session record is finalized first with its best-known
    /// stats. A unit with no items enters the inert no-content state: no
    /// queue, no progress snapshots, and no new session record.
    pub fn start_session(&mut self, identity: PracticeIdentity, unit: UnitContent) {
        let previous = self.best_known_stats();
        self.identity = identity;
        self.last_progress = None;

        if unit.is_empty() {
            let finalize = self.lifecycle.finalize(&self.identity, previous);
            self.track(finalize);
            let now = self.clock.now();
            self.session = Some(ReviewSession::start(unit.key().clone(), unit.items(), now));
            self.unit = Some(unit);
            return;
        }

        let now = self.clock.now();
        let session = ReviewSession::start(unit.key().clone(), unit.items(), now);

        let begin = self.lifecycle.begin(
            &self.identity,
            unit.key().level(),
            ActivityKind::Flashcards,
            previous,
        );
        self.pending.push(begin);

        let snapshot = session.progress(now);
        self.session = Some(session);
        self.unit = Some(unit);
        self.emit(snapshot);
    }

    /// Fetch a unit from the provider and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Content` if the unit cannot be resolved.
    pub async fn start_unit(
        &mut self,
        identity: PracticeIdentity,
        key: &UnitKey,
        provider: &dyn ContentProvider,
    ) -> Result<(), EngineError> {
        let unit = provider.unit(key).await?;
        self.start_session(identity, unit);
        Ok(())
    }

    /// Head of the queue, or `None` when there is no active session, the
    /// unit has no content, or the session is complete.
    #[must_use]
    pub fn current_item(&self) -> Option<&ReviewItem> {
        self.session.as_ref()?.current_item()
    }

    #[must_use]
    pub fn phase(&self) -> Option<SessionPhase> {
        self.session.as_ref().map(ReviewSession::phase)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.as_ref().is_some_and(ReviewSession::is_complete)
    }

    /// Snapshot of the current session state, without emitting it.
    #[must_use]
    pub fn progress(&self) -> Option<ProgressSnapshot> {
        Some(self.session.as_ref()?.progress(self.clock.now()))
    }

    /// Mark the current item mastered.
    ///
    /// Returns the mastered item's id; `None` is a silent no-op (no session,
    /// empty queue, or already complete). On the completion transition the
    /// final snapshot is emitted and the session record is finalized.
    pub fn mark_mastered(&mut self) -> Option<ItemId> {
        let session = self.session.as_mut()?;
        let id = session.mark_mastered()?;

        let now = self.clock.now();
        let snapshot = session.progress(now);
        let completion = session.is_complete().then(|| FinalizeStats {
            duration_ms: None,
            items_completed: session.target() as u32,
            accuracy: Some(f64::from(session.mastered_count()) / session.target() as f64),
        });

        self.emit(snapshot);
        if let Some(stats) = completion {
            let finalize = self.lifecycle.finalize(&self.identity, stats);
            self.track(finalize);
        }
        Some(id)
    }

    /// Send the current item to the back of the queue for another look.
    ///
    /// Counters are untouched, so the follow-up snapshot de-duplicates away;
    /// observers see no event. Returns `true` if an item was rotated.
    pub fn mark_repeat_later(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.mark_repeat_later() {
            return false;
        }

        let snapshot = session.progress(self.clock.now());
        self.emit(snapshot);
        true
    }

    /// Restart the current unit from scratch.
    ///
    /// Deterministic: the re-seeded queue reproduces the identical initial
    /// ordering every time. No-op when no unit has been started.
    pub fn restart(&mut self) {
        let Some(unit) = self.unit.clone() else {
            return;
        };
        let identity = self.identity.clone();
        self.start_session(identity, unit);
    }

    /// Teardown hook for navigating away: finalize the session record once
    /// with the best-known elapsed time and completed count.
    ///
    /// Safe to call repeatedly; only the first call after a start closes the
    /// record.
    pub fn finish(&mut self) {
        let stats = self.best_known_stats();
        let finalize = self.lifecycle.finalize(&self.identity, stats);
        self.track(finalize);
    }

    /// Await all lifecycle notifications spawned so far.
    ///
    /// The engine never requires this; it exists so shutdown paths and tests
    /// can observe recorder traffic deterministically.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            let _ = handle.await;
        }
    }

    fn best_known_stats(&self) -> FinalizeStats {
        FinalizeStats {
            duration_ms: None,
            items_completed: self
                .session
                .as_ref()
                .map_or(0, |s| s.completed_count() as u32),
            accuracy: None,
        }
    }

    fn emit(&mut self, snapshot: ProgressSnapshot) {
        let key = snapshot.dedup_key();
        if self.last_progress == Some(key) {
            return;
        }
        self.last_progress = Some(key);
        self.reporter.on_progress(&snapshot);
    }

    fn track(&mut self, handle: Option<JoinHandle<()>>) {
        if let Some(handle) = handle {
            self.pending.push(handle);
        }
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use practice_core::time::fixed_clock;

    use crate::assignments::{AssignmentCompletion, AssignmentTracker};
    use crate::error::RecorderError;
    use crate::recorder::{
        EndSessionRequest, PracticeSessionRecorder, SessionHandle, StartSessionRequest,
    };

    #[derive(Default)]
    struct FakeBackend {
        starts: Mutex<Vec<StartSessionRequest>>,
        ends: Mutex<Vec<EndSessionRequest>>,
    }

    #[async_trait]
    impl PracticeSessionRecorder for FakeBackend {
        async fn start(
            &self,
            request: &StartSessionRequest,
        ) -> Result<Option<SessionHandle>, RecorderError> {
            let mut starts = self.starts.lock().unwrap();
            starts.push(request.clone());
            Ok(Some(SessionHandle::new(format!("sess-{}", starts.len()))))
        }

        async fn end(&self, request: &EndSessionRequest) -> Result<(), RecorderError> {
            self.ends.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl AssignmentTracker for FakeBackend {
        async fn start(
            &self,
            _assignment_id: &practice_core::model::AssignmentId,
            _student_id: &practice_core::model::StudentId,
        ) -> Result<(), RecorderError> {
            Ok(())
        }

        async fn complete(&self, _completion: &AssignmentCompletion) -> Result<(), RecorderError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingReporter {
        snapshots: Mutex<Vec<ProgressSnapshot>>,
    }

    impl SessionReporter for CollectingReporter {
        fn on_progress(&self, snapshot: &ProgressSnapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }
    }

    impl CollectingReporter {
        fn snapshots(&self) -> Vec<ProgressSnapshot> {
            self.snapshots.lock().unwrap().clone()
        }
    }

    fn unit(n: u32) -> UnitContent {
        let items: Vec<ReviewItem> = (1..=n)
            .map(|id| ReviewItem::new(ItemId::new(id), format!("word {id}"), None, None).unwrap())
            .collect();
        UnitContent::new(UnitKey::new("1A", "u01").unwrap(), "Unit 1", items).unwrap()
    }

    fn engine_with(
        backend: Arc<FakeBackend>,
        reporter: Arc<CollectingReporter>,
    ) -> ReviewQueueEngine {
        let lifecycle = SessionLifecycle::new(fixed_clock(), backend.clone(), backend);
        ReviewQueueEngine::new(fixed_clock(), reporter, lifecycle)
    }

    #[tokio::test]
    async fn start_emits_initial_snapshot_and_opens_record() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), Arc::clone(&reporter));

        engine.start_session(PracticeIdentity::anonymous(), unit(15));
        engine.flush().await;

        let snapshots = reporter.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].completed, 0);
        assert_eq!(snapshots[0].total, 10);
        assert!(!snapshots[0].session_complete);

        assert_eq!(backend.starts.lock().unwrap().len(), 1);
        assert!(backend.ends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeded_head_is_deterministic() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(backend, reporter);

        engine.start_session(PracticeIdentity::anonymous(), unit(15));
        // Pinned by the documented hash + shuffle for seed "1A-u01".
        assert_eq!(engine.current_item().unwrap().id(), ItemId::new(3));
    }

    #[tokio::test]
    async fn repeat_later_emits_nothing_new() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(backend, Arc::clone(&reporter));

        engine.start_session(PracticeIdentity::anonymous(), unit(5));
        let before = reporter.snapshots().len();

        assert!(engine.mark_repeat_later());
        assert!(engine.mark_repeat_later());

        assert_eq!(reporter.snapshots().len(), before);
    }

    #[tokio::test]
    async fn completion_emits_final_snapshot_and_closes_record() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), Arc::clone(&reporter));

        engine.start_session(PracticeIdentity::anonymous(), unit(3));
        // Let the session-open task land its handle before completing.
        engine.flush().await;
        engine.mark_repeat_later();
        engine.mark_repeat_later();
        for _ in 0..3 {
            assert!(engine.mark_mastered().is_some());
        }
        engine.flush().await;

        assert!(engine.is_complete());

        let snapshots = reporter.snapshots();
        // initial + one per mastery; the last one carries the completion flag
        assert_eq!(snapshots.len(), 4);
        let last = snapshots.last().unwrap();
        assert!(last.session_complete);
        assert_eq!(last.completed, 3);
        assert_eq!(last.mastered, 3);

        let ends = backend.ends.lock().unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].items_completed, Some(3));
        assert_eq!(ends[0].accuracy, Some(1.0));
    }

    #[tokio::test]
    async fn operations_after_completion_change_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), Arc::clone(&reporter));

        engine.start_session(PracticeIdentity::anonymous(), unit(2));
        engine.flush().await;
        engine.mark_mastered();
        engine.mark_mastered();
        engine.flush().await;

        let snapshots_before = reporter.snapshots().len();
        let ends_before = backend.ends.lock().unwrap().len();

        assert!(engine.mark_mastered().is_none());
        assert!(!engine.mark_repeat_later());
        engine.flush().await;

        assert_eq!(reporter.snapshots().len(), snapshots_before);
        assert_eq!(backend.ends.lock().unwrap().len(), ends_before);
    }

    #[tokio::test]
    async fn zero_item_unit_is_inert_and_silent() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), Arc::clone(&reporter));

        engine.start_session(PracticeIdentity::anonymous(), unit(0));
        engine.flush().await;

        assert!(engine.current_item().is_none());
        assert_eq!(engine.phase(), Some(SessionPhase::NoContent));
        assert!(reporter.snapshots().is_empty());
        assert!(backend.starts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn restart_reproduces_the_initial_ordering() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), reporter);

        engine.start_session(PracticeIdentity::anonymous(), unit(15));
        engine.flush().await;
        let first_head = engine.current_item().unwrap().id();
        engine.mark_mastered();
        engine.mark_mastered();

        engine.restart();
        engine.flush().await;

        assert_eq!(engine.current_item().unwrap().id(), first_head);
        assert_eq!(engine.progress().unwrap().completed, 0);
        // The re-entrant start closed the first record before opening the second.
        assert_eq!(backend.starts.lock().unwrap().len(), 2);
        let ends = backend.ends.lock().unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].items_completed, Some(2));
    }

    #[tokio::test]
    async fn finish_closes_the_record_once() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = Arc::new(CollectingReporter::default());
        let mut engine = engine_with(Arc::clone(&backend), reporter);

        engine.start_session(PracticeIdentity::anonymous(), unit(5));
        engine.mark_mastered();
        engine.flush().await;

        engine.finish();
        engine.finish();
        engine.flush().await;

        let ends = backend.ends.lock().unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].items_completed, Some(1));
        assert_eq!(ends[0].accuracy, None);
    }
}
