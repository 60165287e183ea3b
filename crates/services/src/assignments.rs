use async_trait::async_trait;
use serde::Serialize;

use practice_core::model::{AssignmentId, StudentId};

use crate::error::RecorderError;

//
// ─── COMPLETION PAYLOAD ───────────────────────────────────────────────────────
//

/// Activity-specific metrics attached to an assignment completion.
///
/// Each activity fills the fields it can measure; the flashcard runner
/// reports minutes and cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<u32>,
}

/// Completion report for one student's assignment submission.
#[derive(Debug, Clone)]
pub struct AssignmentCompletion {
    pub assignment_id: AssignmentId,
    pub student_id: StudentId,
    pub duration_ms: Option<u64>,
    pub accuracy: Option<f64>,
    pub metrics: AssignmentMetrics,
}

//
// ─── TRACKER CONTRACT ─────────────────────────────────────────────────────────
//

/// External service tracking assignment submissions.
///
/// Like the session recorder this is best-effort only: the lifecycle hooks
/// log failures and move on.
#[async_trait]
pub trait AssignmentTracker: Send + Sync {
    /// Mark an assignment as started by a student.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` on transport or status failures.
    async fn start(
        &self,
        assignment_id: &AssignmentId,
        student_id: &StudentId,
    ) -> Result<(), RecorderError>;

    /// Record an assignment completion with its metrics.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` on transport or status failures.
    async fn complete(&self, completion: &AssignmentCompletion) -> Result<(), RecorderError>;
}

//
// ─── WIRE BODIES ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentStartBody<'a> {
    assignment_id: &'a str,
    student_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentCompleteBody<'a> {
    assignment_id: &'a str,
    student_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    metrics: &'a AssignmentMetrics,
}

impl<'a> AssignmentCompleteBody<'a> {
    fn from_completion(completion: &'a AssignmentCompletion) -> Self {
        Self {
            assignment_id: completion.assignment_id.as_str(),
            student_id: completion.student_id.as_str(),
            duration_ms: completion.duration_ms,
            accuracy: completion.accuracy,
            metrics: &completion.metrics,
        }
    }
}

//
// ─── HTTP IMPLEMENTATION ──────────────────────────────────────────────────────
//

/// Tracker posting JSON to the managed backend's assignment endpoints.
#[derive(Debug, Clone)]
pub struct HttpAssignmentTracker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssignmentTracker {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), RecorderError> {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        if !response.status().is_success() {
            return Err(RecorderError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentTracker for HttpAssignmentTracker {
    async fn start(
        &self,
        assignment_id: &AssignmentId,
        student_id: &StudentId,
    ) -> Result<(), RecorderError> {
        self.post(
            "/api/assignments/start",
            &AssignmentStartBody {
                assignment_id: assignment_id.as_str(),
                student_id: student_id.as_str(),
            },
        )
        .await
    }

    async fn complete(&self, completion: &AssignmentCompletion) -> Result<(), RecorderError> {
        self.post(
            "/api/assignments/complete",
            &AssignmentCompleteBody::from_completion(completion),
        )
        .await
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
