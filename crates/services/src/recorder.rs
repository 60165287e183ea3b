use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use practice_core::model::{ActivityKind, AssignmentId, PracticeIdentity};

use crate::error::RecorderError;

//
// ─── REQUESTS ─────────────────────────────────────────────────────────────────
//

/// Opaque practice-session id issued by the backend on start.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionHandle({})", self.0)
    }
}

/// Everything the backend needs to open a practice-session record.
#[derive(Debug, Clone)]
pub struct StartSessionRequest {
    pub identity: PracticeIdentity,
    pub level: String,
    pub activity: ActivityKind,
    pub started_at: Option<DateTime<Utc>>,
}

/// Closing stats for a practice-session record.
#[derive(Debug, Clone)]
pub struct EndSessionRequest {
    pub session: SessionHandle,
    pub duration_ms: Option<u64>,
    pub items_completed: Option<u32>,
    pub accuracy: Option<f64>,
    pub assignment_id: Option<AssignmentId>,
}

//
// ─── RECORDER CONTRACT ────────────────────────────────────────────────────────
//

/// External service tracking practice-session start/end, duration, item count
/// and accuracy.
///
/// The engine treats the recorder as best-effort: return values never feed
/// back into queue state, and errors are logged and swallowed by the
/// lifecycle hooks.
#[async_trait]
pub trait PracticeSessionRecorder: Send + Sync {
    /// Open a session record. `None` means the backend declined to issue an
    /// id; the session simply goes unrecorded.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` on transport or status failures.
    async fn start(
        &self,
        request: &StartSessionRequest,
    ) -> Result<Option<SessionHandle>, RecorderError>;

    /// Close a previously opened session record.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` on transport or status failures.
    async fn end(&self, request: &EndSessionRequest) -> Result<(), RecorderError>;
}

//
// ─── WIRE BODIES ──────────────────────────────────────────────────────────────
//

// The start body sends explicit nulls for missing ids; the end body omits
// absent fields. Field casing is mixed on the wire and mirrored exactly.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionBody<'a> {
    student_id: Option<&'a str>,
    class_id: Option<&'a str>,
    assignment_id: Option<&'a str>,
    level: &'a str,
    activity: ActivityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
}

impl<'a> StartSessionBody<'a> {
    fn from_request(request: &'a StartSessionRequest) -> Self {
        Self {
            student_id: request.identity.student_id.as_ref().map(|id| id.as_str()),
            class_id: request.identity.class_id.as_ref().map(|id| id.as_str()),
            assignment_id: request.identity.assignment_id.as_ref().map(|id| id.as_str()),
            level: &request.level,
            activity: request.activity,
            started_at: request.started_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartSessionResponse {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct EndSessionBody<'a> {
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items_completed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(rename = "assignmentId", skip_serializing_if = "Option::is_none")]
    assignment_id: Option<&'a str>,
}

impl<'a> EndSessionBody<'a> {
    fn from_request(request: &'a EndSessionRequest) -> Self {
        Self {
            session_id: request.session.as_str(),
            duration_s: request.duration_ms.map(round_to_seconds),
            items_completed: request.items_completed,
            accuracy: request.accuracy,
            assignment_id: request.assignment_id.as_ref().map(|id| id.as_str()),
        }
    }
}

/// Backend stores whole seconds; round halves up.
fn round_to_seconds(duration_ms: u64) -> u64 {
    (duration_ms + 500) / 1_000
}

//
// ─── HTTP IMPLEMENTATION ──────────────────────────────────────────────────────
//

/// Recorder posting JSON to the managed backend's session endpoints.
#[derive(Debug, Clone)]
pub struct HttpSessionRecorder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionRecorder {
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
}

#[async_trait]
impl PracticeSessionRecorder for HttpSessionRecorder {
    async fn start(
        &self,
        request: &StartSessionRequest,
    ) -> Result<Option<SessionHandle>, RecorderError> {
        let response = self
            .client
            .post(self.endpoint("/api/sessions/start"))
            .json(&StartSessionBody::from_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecorderError::HttpStatus(response.status()));
        }

        let parsed: StartSessionResponse = response.json().await?;
        Ok(parsed.session_id.map(SessionHandle::new))
    }

    async fn end(&self, request: &EndSessionRequest) -> Result<(), RecorderError> {
        let response = self
            .client
            .post(self.endpoint("/api/sessions/end"))
            .json(&EndSessionBody::from_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecorderError::HttpStatus(response.status()));
        }

        Ok(())
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
