//! Job lifecycle state machine: submit, poll, finish, reset.
//!
//! ```text
//! Idle ──submit──▶ Starting ──job id──▶ Polling ──completed──▶ Completed
//!                     │                    │
//!                     └──────error─────────┴──failed/not_found──▶ Failed
//! ```
//!
//! Every request is tagged with the generation that issued it. `submit` and
//! `reset` bump the generation, so responses that arrive afterwards are
//! dropped instead of resurrecting a discarded job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use docview_shared::{
    DocViewError, GeneratedDocs, Job, JobStatus, Result, StructuredDocs, TrackerConfig,
};

use crate::backend::{HttpBackend, JobBackend, StatusResponse, SubmitRequest};

const LOG_INITIALIZING: &str = "Initializing…";
const LOG_QUEUED: &str = "Job queued, waiting for worker…";
const LOG_READY: &str = "Documentation ready";

const ERR_SUBMIT_GENERIC: &str = "Failed to start documentation job";
const ERR_JOB_GENERIC: &str = "Documentation generation failed";
const ERR_NOT_FOUND: &str = "Job not found";

/// Shortest poll period; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Log line for an in-progress backend status, `None` for unknown values.
pub fn progress_message(status: &str) -> Option<&'static str> {
    match status {
        "processing" => Some(LOG_QUEUED),
        "cloning" => Some("Cloning repository…"),
        "discovering" => Some("Discovering project structure…"),
        "scraping" => Some("Scanning the live application…"),
        "generating" => Some("Generating documentation…"),
        _ => None,
    }
}

/// What a single poll attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Another poll request was still outstanding; nothing was sent.
    Skipped,
    /// The tracker is not polling, or the job was replaced meanwhile.
    Inactive,
    /// The request failed; state unchanged, the next tick retries.
    TransportError,
    /// The job is still running.
    InProgress,
    /// The job reached `Completed` or `Failed`.
    Finished,
}

// ---------------------------------------------------------------------------
// Single-flight latch
// ---------------------------------------------------------------------------

/// Holds the poll latch; released on drop, whatever the request outcome.
struct InFlight {
    latch: Arc<AtomicBool>,
}

impl InFlight {
    fn acquire(latch: &Arc<AtomicBool>) -> Option<Self> {
        latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                latch: Arc::clone(latch),
            })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.latch.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// JobTracker
// ---------------------------------------------------------------------------

/// Owns the lifecycle of one generation job at a time.
///
/// Cheap to clone; clones share the same job.
pub struct JobTracker<B: JobBackend> {
    inner: Arc<Inner<B>>,
}

impl<B: JobBackend> Clone for JobTracker<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<B> {
    backend: B,
    poll_interval: Duration,
    job: watch::Sender<Job>,
    control: Mutex<Control>,
}

/// Bookkeeping that must change atomically with the job state.
struct Control {
    generation: u64,
    latch: Arc<AtomicBool>,
    poll_task: Option<JoinHandle<()>>,
}

impl Control {
    /// Forget the current job: new generation, fresh latch, no timer.
    fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.latch = Arc::new(AtomicBool::new(false));
        self.stop_polling();
        self.generation
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll_task.take() {
            handle.abort();
        }
    }
}

impl JobTracker<HttpBackend> {
    /// Tracker talking HTTP to the configured backend.
    pub fn http(config: &TrackerConfig) -> Result<Self> {
        Ok(Self::new(HttpBackend::new(config)?, config.poll_interval))
    }
}

impl<B: JobBackend> JobTracker<B> {
    /// Tracker over `backend`, polling every `poll_interval` once a job is accepted.
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        let (job, _) = watch::channel(Job::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
                job,
                control: Mutex::new(Control {
                    generation: 0,
                    latch: Arc::new(AtomicBool::new(false)),
                    poll_task: None,
                }),
            }),
        }
    }

    /// Copy of the current job state.
    pub fn snapshot(&self) -> Job {
        self.inner.job.borrow().clone()
    }

    pub fn status(&self) -> JobStatus {
        self.inner.job.borrow().status
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<Job> {
        self.inner.job.subscribe()
    }

    /// Start a new job for `repo` on `provider`, replacing any current one.
    ///
    /// Only an empty repository name is reported as `Err`; every other
    /// failure ends up in the job's `Failed` state.
    #[instrument(skip(self))]
    pub async fn submit(&self, repo: &str, provider: &str) -> Result<()> {
        let repo = repo.trim();
        if repo.is_empty() {
            return Err(DocViewError::validation("repository name must not be empty"));
        }

        let generation = {
            let mut control = self.inner.lock_control();
            let generation = control.advance();
            self.inner.job.send_replace(Job {
                status: JobStatus::Starting,
                progress_log: vec![LOG_INITIALIZING.to_string()],
                started_at: Some(Instant::now()),
                ..Job::default()
            });
            generation
        };

        info!(repo, provider, "submitting documentation job");

        let request = SubmitRequest {
            provider: provider.to_string(),
            repo_name: repo.to_string(),
        };
        let outcome = self.inner.backend.create_job(&request).await;

        let mut control = self.inner.lock_control();
        if control.generation != generation {
            debug!("job replaced while submitting; dropping response");
            return Ok(());
        }

        match outcome {
            Ok(response) => match response.job_id() {
                Some(job_id) => {
                    info!(job_id, "job accepted, polling for status");
                    let job_id = job_id.to_string();
                    self.inner.job.send_modify(|job| {
                        job.id = Some(job_id);
                        job.status = JobStatus::Polling;
                        job.push_log(LOG_QUEUED);
                    });
                    control.poll_task = Some(spawn_poller(
                        Arc::downgrade(&self.inner),
                        self.inner.poll_interval,
                        generation,
                    ));
                }
                None => {
                    let message = response
                        .failure_message()
                        .unwrap_or_else(|| ERR_SUBMIT_GENERIC.to_string());
                    warn!(%message, "job submission rejected");
                    self.inner.fail(message);
                }
            },
            Err(e) => {
                warn!(error = %e, "job submission request failed");
                self.inner.fail(format!("Request failed: {e}"));
            }
        }

        Ok(())
    }

    /// Run one poll attempt right now, subject to the single-flight latch.
    pub async fn poll_now(&self) -> PollOutcome {
        let generation = self.inner.lock_control().generation;
        self.inner.poll_once(generation).await
    }

    /// Drop the current job and return to `Idle`.
    pub fn reset(&self) {
        let mut control = self.inner.lock_control();
        control.advance();
        self.inner.job.send_replace(Job::default());
        info!("job tracker reset");
    }

    /// Wait until the job is `Completed`, `Failed`, or back to `Idle`.
    pub async fn wait_until_finished(&self) -> Job {
        let mut rx = self.subscribe();
        match rx
            .wait_for(|job| job.status.is_terminal() || job.status == JobStatus::Idle)
            .await
        {
            Ok(job) => job.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

impl<B: JobBackend> Inner<B> {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `Failed`. Caller holds the control lock for the live generation.
    fn fail(&self, message: String) {
        self.job.send_modify(|job| {
            job.status = JobStatus::Failed;
            job.error = Some(message);
        });
    }

    async fn poll_once(&self, generation: u64) -> PollOutcome {
        let (job_id, latch) = {
            let control = self.lock_control();
            if control.generation != generation {
                return PollOutcome::Inactive;
            }
            let job = self.job.borrow();
            match (&job.status, &job.id) {
                (JobStatus::Polling, Some(id)) => (id.clone(), Arc::clone(&control.latch)),
                _ => return PollOutcome::Inactive,
            }
        };

        let Some(_in_flight) = InFlight::acquire(&latch) else {
            debug!(%job_id, "previous poll still outstanding, skipping tick");
            return PollOutcome::Skipped;
        };

        match self.backend.job_status(&job_id).await {
            Ok(response) => self.apply_status(generation, response),
            Err(e) => {
                warn!(%job_id, error = %e, "status poll failed, retrying on next tick");
                PollOutcome::TransportError
            }
        }
    }

    fn apply_status(&self, generation: u64, response: StatusResponse) -> PollOutcome {
        let mut control = self.lock_control();
        if control.generation != generation || self.job.borrow().status != JobStatus::Polling {
            debug!(status = %response.status, "stale status response ignored");
            return PollOutcome::Inactive;
        }

        debug!(status = %response.status, "job status received");

        match response.status.as_str() {
            "completed" => {
                let StatusResponse {
                    markdown,
                    sidebar_structure,
                    documentation,
                    ..
                } = response;
                let structured = match (sidebar_structure, documentation) {
                    (Some(sidebar), Some(documents)) => Some(StructuredDocs { sidebar, documents }),
                    _ => None,
                };
                info!(
                    structured = structured.is_some(),
                    flat = markdown.is_some(),
                    "documentation job completed"
                );
                self.job.send_modify(|job| {
                    job.result = Some(GeneratedDocs {
                        markdown,
                        structured,
                    });
                    job.status = JobStatus::Completed;
                    job.push_log(LOG_READY);
                });
                control.stop_polling();
                PollOutcome::Finished
            }
            "failed" => {
                let message = response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| ERR_JOB_GENERIC.to_string());
                warn!(%message, "documentation job failed");
                self.fail(message);
                control.stop_polling();
                PollOutcome::Finished
            }
            "not_found" => {
                warn!("backend no longer knows this job");
                self.fail(ERR_NOT_FOUND.to_string());
                control.stop_polling();
                PollOutcome::Finished
            }
            other => {
                if let Some(line) = progress_message(other) {
                    self.job.send_if_modified(|job| job.push_log(line));
                }
                PollOutcome::InProgress
            }
        }
    }
}

/// Tick every `period`, launching one guarded poll attempt per tick.
///
/// Holds only a weak reference so dropping the last tracker ends the loop.
fn spawn_poller<B: JobBackend>(
    inner: Weak<Inner<B>>,
    period: Duration,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // Skip the first immediate tick

        loop {
            interval.tick().await;
            let Some(inner) = inner.upgrade() else { break };
            tokio::spawn(async move {
                inner.poll_once(generation).await;
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use docview_shared::{Category, SidebarItem, SidebarStructure};

    use crate::backend::SubmitResponse;

    /// Scripted backend; optional gates hold requests until a permit is added.
    #[derive(Default)]
    struct FakeBackend {
        submit: Mutex<Option<Result<SubmitResponse>>>,
        statuses: Mutex<VecDeque<Result<StatusResponse>>>,
        submit_gate: Option<Arc<Semaphore>>,
        status_gate: Option<Arc<Semaphore>>,
        status_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn accepting(job_id: &str) -> Self {
            Self {
                submit: Mutex::new(Some(Ok(SubmitResponse {
                    job_id: Some(job_id.into()),
                    ..Default::default()
                }))),
                ..Default::default()
            }
        }

        fn with_statuses(self, statuses: Vec<Result<StatusResponse>>) -> Self {
            *self.statuses.lock().unwrap() = statuses.into();
            self
        }
    }

    #[async_trait]
    impl JobBackend for FakeBackend {
        async fn create_job(&self, _request: &SubmitRequest) -> Result<SubmitResponse> {
            if let Some(gate) = &self.submit_gate {
                gate.acquire().await.unwrap().forget();
            }
            self.submit
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(SubmitResponse::default()))
        }

        async fn job_status(&self, _job_id: &str) -> Result<StatusResponse> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.status_gate {
                gate.acquire().await.unwrap().forget();
            }
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(status("generating")))
        }
    }

    fn status(s: &str) -> StatusResponse {
        StatusResponse {
            status: s.into(),
            ..Default::default()
        }
    }

    fn sidebar() -> SidebarStructure {
        SidebarStructure {
            project_name: "FreightHub".into(),
            categories: vec![Category {
                name: "OVERVIEW".into(),
                items: vec![SidebarItem {
                    title: "Platform Overview".into(),
                    slug: "/docs/platform-overview".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn submit_with_job_id_enters_polling() {
        let tracker = JobTracker::new(FakeBackend::accepting("job-1"), HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Polling);
        assert_eq!(job.id.as_deref(), Some("job-1"));
        assert_eq!(job.progress_log, [LOG_INITIALIZING, LOG_QUEUED]);
        assert!(job.started_at.is_some());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn submit_without_job_id_fails_generically() {
        let backend = FakeBackend {
            submit: Mutex::new(Some(Ok(SubmitResponse::default()))),
            ..Default::default()
        };
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some(ERR_SUBMIT_GENERIC));
        assert!(job.id.is_none());
    }

    #[tokio::test]
    async fn submit_surfaces_server_error_field() {
        let backend = FakeBackend {
            submit: Mutex::new(Some(Ok(SubmitResponse {
                error: Some("repository is private".into()),
                ..Default::default()
            }))),
            ..Default::default()
        };
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/secret", "github").await.unwrap();
        assert_eq!(
            tracker.snapshot().error.as_deref(),
            Some("repository is private")
        );
    }

    #[tokio::test]
    async fn submit_network_failure_captures_message() {
        let backend = FakeBackend {
            submit: Mutex::new(Some(Err(DocViewError::Network(
                "connection refused".into(),
            )))),
            ..Default::default()
        };
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn empty_repo_is_rejected_without_state_change() {
        let tracker = JobTracker::new(FakeBackend::accepting("job-1"), HOUR);
        let err = tracker.submit("   ", "github").await.unwrap_err();
        assert!(matches!(err, DocViewError::Validation { .. }));
        assert_eq!(tracker.status(), JobStatus::Idle);
        assert!(tracker.snapshot().progress_log.is_empty());
    }

    #[tokio::test]
    async fn repeated_progress_status_logs_once() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![
            Ok(status("cloning")),
            Ok(status("cloning")),
            Ok(status("mystery-phase")),
            Ok(status("generating")),
        ]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        for _ in 0..4 {
            assert_eq!(tracker.poll_now().await, PollOutcome::InProgress);
        }

        assert_eq!(
            tracker.snapshot().progress_log,
            [
                LOG_INITIALIZING,
                LOG_QUEUED,
                "Cloning repository…",
                "Generating documentation…"
            ]
        );
    }

    #[tokio::test]
    async fn completed_with_structured_pair_populates_both() {
        let mut documents = docview_shared::DocumentMap::new();
        documents.insert("platform-overview.md".into(), "# Platform Overview".into());
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![Ok(StatusResponse {
            status: "completed".into(),
            markdown: Some("# Everything".into()),
            sidebar_structure: Some(sidebar()),
            documentation: Some(documents),
            error: None,
        })]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        assert_eq!(tracker.poll_now().await, PollOutcome::Finished);

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.last_log(), Some(LOG_READY));
        let result = job.result.expect("result");
        assert_eq!(result.markdown.as_deref(), Some("# Everything"));
        let structured = result.structured.expect("structured pair");
        assert_eq!(structured.sidebar.project_name, "FreightHub");
        assert_eq!(structured.documents.len(), 1);
    }

    #[tokio::test]
    async fn completed_with_only_markdown_leaves_structured_empty() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![Ok(StatusResponse {
            status: "completed".into(),
            markdown: Some("# Flat".into()),
            sidebar_structure: Some(sidebar()),
            documentation: None,
            error: None,
        })]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();
        tracker.poll_now().await;

        let result = tracker.snapshot().result.expect("result");
        assert_eq!(result.markdown.as_deref(), Some("# Flat"));
        assert!(result.structured.is_none());
    }

    #[tokio::test]
    async fn failed_and_not_found_are_terminal() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![Ok(StatusResponse {
            status: "failed".into(),
            error: Some("Gemini quota exhausted".into()),
            ..Default::default()
        })]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();
        assert_eq!(tracker.poll_now().await, PollOutcome::Finished);
        assert_eq!(
            tracker.snapshot().error.as_deref(),
            Some("Gemini quota exhausted")
        );
        // Terminal: further polls do nothing.
        assert_eq!(tracker.poll_now().await, PollOutcome::Inactive);

        let backend =
            FakeBackend::accepting("job-2").with_statuses(vec![Ok(status("not_found"))]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();
        tracker.poll_now().await;
        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some(ERR_NOT_FOUND));
    }

    #[tokio::test]
    async fn failed_without_message_uses_generic() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![Ok(status("failed"))]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();
        tracker.poll_now().await;
        assert_eq!(tracker.snapshot().error.as_deref(), Some(ERR_JOB_GENERIC));
    }

    #[tokio::test]
    async fn poll_transport_error_keeps_polling() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![
            Err(DocViewError::Network("timeout".into())),
            Ok(status("cloning")),
        ]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        assert_eq!(tracker.poll_now().await, PollOutcome::TransportError);
        assert_eq!(tracker.status(), JobStatus::Polling);
        assert!(tracker.snapshot().error.is_none());

        assert_eq!(tracker.poll_now().await, PollOutcome::InProgress);
        assert_eq!(tracker.snapshot().last_log(), Some("Cloning repository…"));
    }

    #[tokio::test]
    async fn overlapping_polls_are_single_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = FakeBackend {
            status_gate: Some(Arc::clone(&gate)),
            ..FakeBackend::accepting("job-1")
        };
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.poll_now().await }
        });
        while tracker.inner.backend.status_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(tracker.poll_now().await, PollOutcome::Skipped);
        assert_eq!(tracker.poll_now().await, PollOutcome::Skipped);
        assert_eq!(tracker.inner.backend.status_calls.load(Ordering::SeqCst), 1);

        gate.add_permits(1);
        assert_eq!(first.await.unwrap(), PollOutcome::InProgress);

        // Latch released after the request finished.
        gate.add_permits(1);
        assert_eq!(tracker.poll_now().await, PollOutcome::InProgress);
        assert_eq!(tracker.inner.backend.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn latch_released_after_transport_error() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![
            Err(DocViewError::Network("reset by peer".into())),
            Ok(status("generating")),
        ]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        assert_eq!(tracker.poll_now().await, PollOutcome::TransportError);
        assert_eq!(tracker.poll_now().await, PollOutcome::InProgress);
    }

    #[tokio::test]
    async fn reset_discards_in_flight_poll_response() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = FakeBackend {
            status_gate: Some(Arc::clone(&gate)),
            ..FakeBackend::accepting("job-1")
        }
        .with_statuses(vec![Ok(StatusResponse {
            status: "completed".into(),
            markdown: Some("# Late".into()),
            ..Default::default()
        })]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let pending = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.poll_now().await }
        });
        while tracker.inner.backend.status_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        tracker.reset();
        gate.add_permits(1);
        assert_eq!(pending.await.unwrap(), PollOutcome::Inactive);

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Idle);
        assert!(job.result.is_none());
        assert!(job.progress_log.is_empty());
    }

    #[tokio::test]
    async fn reset_during_submit_ignores_late_job_id() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = FakeBackend {
            submit_gate: Some(Arc::clone(&gate)),
            ..FakeBackend::accepting("job-1")
        };
        let tracker = JobTracker::new(backend, HOUR);

        let submit = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.submit("acme/freighthub", "github").await }
        });
        while tracker.status() != JobStatus::Starting {
            tokio::task::yield_now().await;
        }

        tracker.reset();
        gate.add_permits(1);
        submit.await.unwrap().unwrap();

        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Idle);
        assert!(job.id.is_none());
        assert!(tracker.inner.lock_control().poll_task.is_none());
    }

    #[tokio::test]
    async fn reset_returns_to_idle_from_any_state() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![Ok(status("failed"))]);
        let tracker = JobTracker::new(backend, HOUR);
        tracker.submit("acme/freighthub", "github").await.unwrap();
        tracker.poll_now().await;
        assert_eq!(tracker.status(), JobStatus::Failed);

        tracker.reset();
        let job = tracker.snapshot();
        assert_eq!(job.status, JobStatus::Idle);
        assert!(job.id.is_none());
        assert!(job.error.is_none());
        assert!(job.progress_log.is_empty());
        assert!(!tracker.inner.lock_control().latch.load(Ordering::SeqCst));

        // Idle reset is a no-op apart from the generation bump.
        tracker.reset();
        assert_eq!(tracker.status(), JobStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_job_to_completion() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![
            Ok(status("cloning")),
            Ok(status("cloning")),
            Ok(status("generating")),
            Ok(StatusResponse {
                status: "completed".into(),
                markdown: Some("# Done".into()),
                ..Default::default()
            }),
        ]);
        let tracker = JobTracker::new(backend, Duration::from_secs(5));
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let job = tracker.wait_until_finished().await;
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(
            job.progress_log,
            [
                LOG_INITIALIZING,
                LOG_QUEUED,
                "Cloning repository…",
                "Generating documentation…",
                LOG_READY
            ]
        );
        assert_eq!(tracker.inner.backend.status_calls.load(Ordering::SeqCst), 4);
        assert!(tracker.inner.lock_control().poll_task.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_polls_to_completion() {
        let backend = FakeBackend::accepting("job-1").with_statuses(vec![
            Ok(status("generating")),
            Ok(StatusResponse {
                status: "completed".into(),
                markdown: Some("# Done".into()),
                ..Default::default()
            }),
        ]);
        let tracker = JobTracker::new(backend, Duration::ZERO);
        assert_eq!(tracker.inner.poll_interval, MIN_POLL_INTERVAL);
        tracker.submit("acme/freighthub", "github").await.unwrap();

        let job = tracker.wait_until_finished().await;
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(tracker.inner.backend.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stops_after_reset() {
        let tracker = JobTracker::new(FakeBackend::accepting("job-1"), Duration::from_secs(5));
        tracker.submit("acme/freighthub", "github").await.unwrap();

        tokio::time::sleep(Duration::from_secs(11)).await;
        let calls = tracker.inner.backend.status_calls.load(Ordering::SeqCst);
        assert_eq!(calls, 2);

        tracker.reset();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(tracker.inner.backend.status_calls.load(Ordering::SeqCst), calls);
    }

    #[test]
    fn progress_messages_cover_backend_phases() {
        assert_eq!(progress_message("cloning"), Some("Cloning repository…"));
        assert_eq!(progress_message("generating"), Some("Generating documentation…"));
        assert_eq!(progress_message("processing"), Some(LOG_QUEUED));
        assert_eq!(progress_message("warming-up"), None);
    }
}
