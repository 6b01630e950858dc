//! Generation backend client.
//!
//! The tracker talks to the backend through [`JobBackend`] so the state
//! machine can be driven by an in-memory backend in tests. [`HttpBackend`]
//! is the real implementation:
//! - `POST {api_root}/generate-docs` creates a job
//! - `GET  {api_root}/generate-docs/{job_id}` reports its status

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use docview_shared::{DocViewError, DocumentMap, Result, SidebarStructure, TrackerConfig};

/// User-Agent string for backend requests.
const USER_AGENT: &str = concat!("docview/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of the job creation request.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub provider: String,
    pub repo_name: String,
}

/// Body of the job creation response; success and failure share one shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, alias = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// FastAPI-style `detail`: a string, or a list of validation errors.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl SubmitResponse {
    /// The job handle, if present and non-empty.
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Server-supplied failure message: `error` first, then `detail`.
    pub fn failure_message(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return Some(error.to_string());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(serde_json::Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Body of the job status response, polymorphic on `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub sidebar_structure: Option<SidebarStructure>,
    #[serde(default)]
    pub documentation: Option<DocumentMap>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Transport used by [`crate::JobTracker`].
#[async_trait]
pub trait JobBackend: Send + Sync + 'static {
    /// Ask the backend to start a job.
    ///
    /// `Err` means the request itself failed (network, unreadable body);
    /// a well-formed refusal comes back as `Ok` without a job id.
    async fn create_job(&self, request: &SubmitRequest) -> Result<SubmitResponse>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<StatusResponse>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`JobBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api_root: String,
}

impl HttpBackend {
    /// Build a backend client from the runtime tracker config.
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DocViewError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_root: config.api_root.trim_end_matches('/').to_string(),
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}/generate-docs", self.api_root)
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    #[instrument(skip_all, fields(repo = %request.repo_name, provider = %request.provider))]
    async fn create_job(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        let url = self.jobs_url();
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DocViewError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocViewError::Network(format!("{url}: failed to read body: {e}")))?;

        debug!(%status, body_len = body.len(), "job creation response");

        // Refusals (4xx with a JSON body) are answers, not transport failures.
        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => {
                Err(DocViewError::Network(format!("{url}: HTTP {status}")))
            }
            Err(e) => Err(DocViewError::parse(format!("{url}: invalid response body: {e}"))),
        }
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusResponse> {
        let url = format!("{}/{job_id}", self.jobs_url());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DocViewError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocViewError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|e| DocViewError::parse(format!("{url}: invalid status body: {e}")))
    }
}
