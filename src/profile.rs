//! Profile store — persistence collaborator for assessment results.
//!
//! DESIGN
//! ======
//! Assessment results outlive a live session, but the coordinator itself is
//! stateless across restarts. Persistence is delegated behind the
//! [`ProfileStore`] trait: controllers hand finished assessments off and move
//! on; a failed write is logged and surfaced as a notice, never a blocker.
//!
//! Two implementations: [`HttpProfileStore`] talks to the external profile
//! API (bearer token, configured from environment variables, optional at
//! startup), and [`MemoryProfileStore`] keeps everything in-process for
//! tests and offline runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::protocol::TestType;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// DATA MODEL
// =============================================================================

/// One answer captured during an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOutcome {
    pub word: String,
    pub response: String,
    pub is_correct: bool,
    pub response_time: u64,
}

/// One word assessed for one student, with every captured answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub student_id: String,
    pub word_tested: String,
    pub test_type: TestType,
    /// Milliseconds since Unix epoch.
    pub date_completed: i64,
    pub responses: Vec<ResponseOutcome>,
    /// Teacher-assigned score for the assessed word, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Summary of a full test session, persisted when the teacher ends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub room: String,
    pub test_type: TestType,
    pub fry_level: u8,
    pub words_tested: Vec<String>,
    pub responses: Vec<ResponseOutcome>,
    pub ended_at: i64,
}

/// Everything known about one student's assessment history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: String,
    pub assessments: Vec<AssessmentRecord>,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("profile API request failed: {0}")]
    Request(String),
    #[error("profile API returned status {status}: {body}")]
    Response { status: u16, body: String },
    #[error("failed to parse profile API response: {0}")]
    Parse(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Persistence seam for assessment data. Implementations must be cheap to
/// share; callers hold `Arc<dyn ProfileStore>`.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Record one finished word assessment.
    async fn persist_assessment(&self, record: &AssessmentRecord) -> Result<(), ProfileError>;

    /// Record a full session summary.
    async fn persist_test_session(&self, report: &SessionReport) -> Result<(), ProfileError>;

    /// Fetch a student's assessment history. Unknown students get an empty
    /// history, not an error.
    async fn get_student_progress(&self, student_id: &str) -> Result<StudentProgress, ProfileError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// Client for the external profile API.
pub struct HttpProfileStore {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpProfileStore {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, ProfileError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProfileError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url, token })
    }

    /// Build a store from environment variables.
    ///
    /// - `PROFILE_API_URL`: base URL of the profile API. Absent means no
    ///   store is configured and `Ok(None)` is returned.
    /// - `PROFILE_API_TOKEN`: optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is set but the HTTP client fails to build.
    pub fn from_env() -> Result<Option<Self>, ProfileError> {
        let Ok(base_url) = std::env::var("PROFILE_API_URL") else {
            return Ok(None);
        };
        let token = std::env::var("PROFILE_API_TOKEN").ok();
        Self::new(base_url, token).map(Some)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), ProfileError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(|e| ProfileError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileError::Response { status, body });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for HttpProfileStore {
    async fn persist_assessment(&self, record: &AssessmentRecord) -> Result<(), ProfileError> {
        self.post_json("/assessments", record).await
    }

    async fn persist_test_session(&self, report: &SessionReport) -> Result<(), ProfileError> {
        self.post_json("/sessions", report).await
    }

    async fn get_student_progress(&self, student_id: &str) -> Result<StudentProgress, ProfileError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/students/{student_id}/progress"))
            .send()
            .await
            .map_err(|e| ProfileError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(StudentProgress { student_id: student_id.to_string(), assessments: Vec::new() });
        }
        let text = response.text().await.map_err(|e| ProfileError::Request(e.to_string()))?;
        if status != 200 {
            return Err(ProfileError::Response { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| ProfileError::Parse(e.to_string()))
    }
}

// =============================================================================
// IN-MEMORY IMPLEMENTATION
// =============================================================================

/// In-process store for tests and offline runs.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    progress: HashMap<String, StudentProgress>,
    sessions: Vec<SessionReport>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of persisted session reports.
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    /// Most recently persisted session report, if any.
    pub async fn last_session(&self) -> Option<SessionReport> {
        self.inner.lock().await.sessions.last().cloned()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn persist_assessment(&self, record: &AssessmentRecord) -> Result<(), ProfileError> {
        let mut inner = self.inner.lock().await;
        let progress = inner
            .progress
            .entry(record.student_id.clone())
            .or_insert_with(|| StudentProgress {
                student_id: record.student_id.clone(),
                assessments: Vec::new(),
            });
        progress.assessments.push(record.clone());
        Ok(())
    }

    async fn persist_test_session(&self, report: &SessionReport) -> Result<(), ProfileError> {
        self.inner.lock().await.sessions.push(report.clone());
        Ok(())
    }

    async fn get_student_progress(&self, student_id: &str) -> Result<StudentProgress, ProfileError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .progress
            .get(student_id)
            .cloned()
            .unwrap_or_else(|| StudentProgress {
                student_id: student_id.to_string(),
                assessments: Vec::new(),
            }))
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
