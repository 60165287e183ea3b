use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use practice_core::model::{ActivityKind, PracticeIdentity};
use practice_core::Clock;

use crate::assignments::{AssignmentCompletion, AssignmentMetrics, AssignmentTracker};
use crate::recorder::{
    EndSessionRequest, PracticeSessionRecorder, SessionHandle, StartSessionRequest,
};

//
// ─── FINALIZE STATS ───────────────────────────────────────────────────────────
//

/// Best-known stats at the moment a session record is closed.
#[derive(Debug, Clone, Default)]
pub struct FinalizeStats {
    /// Wall-clock duration; when absent the lifecycle falls back to the time
    /// since the record was opened.
    pub duration_ms: Option<u64>,
    pub items_completed: u32,
    pub accuracy: Option<f64>,
}

/// An in-flight session record at the external recorder.
#[derive(Debug, Clone)]
struct OpenSession {
    handle: SessionHandle,
    started_at: DateTime<Utc>,
}

//
// ─── LIFECYCLE ────────────────────────────────────────────────────────────────
//

/// Fire-and-forget bridge between the engine and the external recorder and
/// assignment tracker.
///
/// Engine mutations never wait on the network: `begin` and `finalize` take
/// the open-session slot synchronously and spawn one task to do the talking.
/// Recorder failures are logged and swallowed; they never reach engine state
/// and retry policy is none.
///
/// Requires a Tokio runtime context.
#[derive(Clone)]
pub struct SessionLifecycle {
    clock: Clock,
    recorder: Arc<dyn PracticeSessionRecorder>,
    assignments: Arc<dyn AssignmentTracker>,
    open: Arc<Mutex<Option<OpenSession>>>,
}

impl SessionLifecycle {
    #[must_use]
    pub fn new(
        clock: Clock,
        recorder: Arc<dyn PracticeSessionRecorder>,
        assignments: Arc<dyn AssignmentTracker>,
    ) -> Self {
        Self {
            clock,
            recorder,
            assignments,
            open: Arc::new(Mutex::new(None)),
        }
    }

    /// True while a session record is open (or its start is still in flight
    /// and has already resolved to a handle).
    #[must_use]
    pub fn has_open_session(&self) -> bool {
        match self.open.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Open a new session record, closing any previous one first.
    ///
    /// The close of the previous record is initiated before the new start
    /// within a single spawned task, so the backend never sees two open
    /// records for the same student out of order. `previous` supplies the
    /// best-known stats for that close.
    ///
    /// The returned handle may be ignored; it exists so callers that want to
    /// flush (tests, app shutdown) can await the notification.
    pub fn begin(
        &self,
        identity: &PracticeIdentity,
        level: &str,
        activity: ActivityKind,
        previous: FinalizeStats,
    ) -> JoinHandle<()> {
        let ending = self.take_open().map(|open| self.close_pair(open, &previous, identity));

        let start_request = StartSessionRequest {
            identity: identity.clone(),
            level: level.to_owned(),
            activity,
            started_at: None,
        };
        let assignment_start = identity
            .assignment_pair()
            .map(|(assignment, student)| (assignment.clone(), student.clone()));

        let clock = self.clock;
        let recorder = Arc::clone(&self.recorder);
        let assignments = Arc::clone(&self.assignments);
        let open = Arc::clone(&self.open);

        tokio::spawn(async move {
            if let Some((request, completion)) = ending {
                if let Err(error) = recorder.end(&request).await {
                    tracing::warn!(error = %error, "failed to close previous practice session");
                }
                if let Some(completion) = completion {
                    if let Err(error) = assignments.complete(&completion).await {
                        tracing::warn!(error = %error, "failed to update assignment submission");
                    }
                }
            }

            match recorder.start(&start_request).await {
                Ok(Some(handle)) => {
                    let session = OpenSession {
                        handle,
                        started_at: clock.now(),
                    };
                    match open.lock() {
                        Ok(mut guard) => *guard = Some(session),
                        Err(poisoned) => *poisoned.into_inner() = Some(session),
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(error = %error, "failed to start practice session");
                }
            }

            if let Some((assignment, student)) = assignment_start {
                if let Err(error) = assignments.start(&assignment, &student).await {
                    tracing::warn!(error = %error, "failed to mark assignment as started");
                }
            }
        })
    }

    /// Close the open session record, if any, with the given stats.
    ///
    /// Exactly one close is issued per open record; calling again is a no-op
    /// until the next `begin`. Returns `None` when there was nothing to
    /// close.
    pub fn finalize(
        &self,
        identity: &PracticeIdentity,
        stats: FinalizeStats,
    ) -> Option<JoinHandle<()>> {
        let open = self.take_open()?;
        let (request, completion) = self.close_pair(open, &stats, identity);

        let recorder = Arc::clone(&self.recorder);
        let assignments = Arc::clone(&self.assignments);

        Some(tokio::spawn(async move {
            if let Err(error) = recorder.end(&request).await {
                tracing::warn!(error = %error, "failed to close practice session");
            }
            if let Some(completion) = completion {
                if let Err(error) = assignments.complete(&completion).await {
                    tracing::warn!(error = %error, "failed to update assignment submission");
                }
            }
        }))
    }

    fn take_open(&self) -> Option<OpenSession> {
        match self.open.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn elapsed_ms_since(&self, started_at: DateTime<Utc>) -> u64 {
        u64::try_from((self.clock.now() - started_at).num_milliseconds()).unwrap_or(0)
    }

    // The session end and the assignment completion report the same resolved
    // duration, so both are built from one elapsed computation.
    fn close_pair(
        &self,
        open: OpenSession,
        stats: &FinalizeStats,
        identity: &PracticeIdentity,
    ) -> (EndSessionRequest, Option<AssignmentCompletion>) {
        let duration_ms = stats
            .duration_ms
            .unwrap_or_else(|| self.elapsed_ms_since(open.started_at));

        let request = EndSessionRequest {
            session: open.handle,
            duration_ms: Some(duration_ms),
            items_completed: Some(stats.items_completed),
            accuracy: stats.accuracy,
            assignment_id: identity.assignment_id.clone(),
        };

        let completion = identity.assignment_pair().map(|(assignment, student)| {
            AssignmentCompletion {
                assignment_id: assignment.clone(),
                student_id: student.clone(),
                duration_ms: Some(duration_ms),
                accuracy: stats.accuracy,
                metrics: AssignmentMetrics {
                    minutes: Some(duration_ms as f64 / 60_000.0),
                    rounds: None,
                    cards: Some(stats.items_completed),
                },
            }
        });

        (request, completion)
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use practice_core::model::{AssignmentId, StudentId};
    use practice_core::time::fixed_clock;

    use crate::error::RecorderError;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        SessionStart(String),
        SessionEnd(String),
        AssignmentStart(String),
        AssignmentComplete(String),
    }

    #[derive(Default)]
    struct RecordingBackend {
        events: Mutex<Vec<Event>>,
        next_handle: Mutex<Option<String>>,
        fail_end: bool,
    }

    impl RecordingBackend {
        fn with_handle(handle: &str) -> Self {
            Self {
                next_handle: Mutex::new(Some(handle.to_string())),
                ..Self::default()
            }
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl PracticeSessionRecorder for RecordingBackend {
        async fn start(
            &self,
            request: &StartSessionRequest,
        ) -> Result<Option<SessionHandle>, RecorderError> {
            self.push(Event::SessionStart(request.level.clone()));
            Ok(self.next_handle.lock().unwrap().clone().map(SessionHandle::new))
        }

        async fn end(&self, request: &EndSessionRequest) -> Result<(), RecorderError> {
            self.push(Event::SessionEnd(request.session.as_str().to_string()));
            if self.fail_end {
                return Err(RecorderError::HttpStatus(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AssignmentTracker for RecordingBackend {
        async fn start(
            &self,
            assignment_id: &AssignmentId,
            _student_id: &StudentId,
        ) -> Result<(), RecorderError> {
            self.push(Event::AssignmentStart(assignment_id.to_string()));
            Ok(())
        }

        async fn complete(
            &self,
            completion: &AssignmentCompletion,
        ) -> Result<(), RecorderError> {
            self.push(Event::AssignmentComplete(completion.assignment_id.to_string()));
            Ok(())
        }
    }

    fn lifecycle_with(backend: Arc<RecordingBackend>) -> SessionLifecycle {
        SessionLifecycle::new(fixed_clock(), backend.clone(), backend)
    }

    #[tokio::test]
    async fn begin_opens_a_session_record() {
        let backend = Arc::new(RecordingBackend::with_handle("sess-1"));
        let lifecycle = lifecycle_with(Arc::clone(&backend));

        lifecycle
            .begin(
                &PracticeIdentity::anonymous(),
                "1A",
                ActivityKind::Flashcards,
                FinalizeStats::default(),
            )
            .await
            .unwrap();

        assert_eq!(backend.events(), vec![Event::SessionStart("1A".to_string())]);
        assert!(lifecycle.has_open_session());
    }

    #[tokio::test]
    async fn re_entrant_begin_closes_previous_record_first() {
        let backend = Arc::new(RecordingBackend::with_handle("sess-1"));
        let lifecycle = lifecycle_with(Arc::clone(&backend));
        let identity = PracticeIdentity::anonymous();

        lifecycle
            .begin(&identity, "1A", ActivityKind::Flashcards, FinalizeStats::default())
            .await
            .unwrap();
        lifecycle
            .begin(&identity, "1A", ActivityKind::Flashcards, FinalizeStats::default())
            .await
            .unwrap();

        assert_eq!(
            backend.events(),
            vec![
                Event::SessionStart("1A".to_string()),
                Event::SessionEnd("sess-1".to_string()),
                Event::SessionStart("1A".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn finalize_closes_exactly_once() {
        let backend = Arc::new(RecordingBackend::with_handle("sess-1"));
        let lifecycle = lifecycle_with(Arc::clone(&backend));
        let identity = PracticeIdentity::anonymous();

        lifecycle
            .begin(&identity, "1A", ActivityKind::Flashcards, FinalizeStats::default())
            .await
            .unwrap();

        let stats = FinalizeStats {
            duration_ms: Some(42_000),
            items_completed: 7,
            accuracy: None,
        };
        lifecycle.finalize(&identity, stats.clone()).unwrap().await.unwrap();
        assert!(lifecycle.finalize(&identity, stats).is_none());
        assert!(!lifecycle.has_open_session());

        assert_eq!(
            backend.events(),
            vec![
                Event::SessionStart("1A".to_string()),
                Event::SessionEnd("sess-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn assigned_identity_notifies_the_tracker() {
        let backend = Arc::new(RecordingBackend::with_handle("sess-1"));
        let lifecycle = lifecycle_with(Arc::clone(&backend));
        let identity = PracticeIdentity::student(StudentId::new("s1"), None)
            .with_assignment(AssignmentId::new("a1"));

        lifecycle
            .begin(&identity, "1A", ActivityKind::Flashcards, FinalizeStats::default())
            .await
            .unwrap();
        lifecycle
            .finalize(
                &identity,
                FinalizeStats {
                    duration_ms: Some(60_000),
                    items_completed: 10,
                    accuracy: Some(1.0),
                },
            )
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            backend.events(),
            vec![
                Event::SessionStart("1A".to_string()),
                Event::AssignmentStart("a1".to_string()),
                Event::SessionEnd("sess-1".to_string()),
                Event::AssignmentComplete("a1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn recorder_failure_is_swallowed() {
        let backend = Arc::new(RecordingBackend {
            next_handle: Mutex::new(Some("sess-1".to_string())),
            fail_end: true,
            ..RecordingBackend::default()
        });
        let lifecycle = lifecycle_with(Arc::clone(&backend));
        let identity = PracticeIdentity::anonymous();

        lifecycle
            .begin(&identity, "1A", ActivityKind::Flashcards, FinalizeStats::default())
            .await
            .unwrap();
        // The task completes despite the recorder error.
        lifecycle
            .finalize(&identity, FinalizeStats::default())
            .unwrap()
            .await
            .unwrap();
        assert!(!lifecycle.has_open_session());
    }

    #[tokio::test]
    async fn start_without_handle_leaves_no_open_session() {
        let backend = Arc::new(RecordingBackend::default());
        let lifecycle = lifecycle_with(Arc::clone(&backend));

        lifecycle
            .begin(
                &PracticeIdentity::anonymous(),
                "1A",
                ActivityKind::Flashcards,
                FinalizeStats::default(),
            )
            .await
            .unwrap();

        assert!(!lifecycle.has_open_session());
        assert!(lifecycle.finalize(&PracticeIdentity::anonymous(), FinalizeStats::default()).is_none());
    }
}
