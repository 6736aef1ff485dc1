//! Copy job poller
//!
//! Polls the progress of a copy job until its log stream reports a terminal
//! event. Each progress response is scanned in full and the first terminal
//! event wins. Transport failures are never retried here; only the "is the
//! job finished" question is.

use async_trait::async_trait;
use m365_core::domain::event::{LogDecodeError, TerminalEvent};
use m365_core::domain::job::{CopyJobInfo, JobProgress};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::PollerConfig;
use super::delay::{Delay, TokioDelay};
use crate::error::ClientError;

/// Fetches the current progress of a copy job
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Issue one progress check for the job described by `job`
    async fn fetch_progress(&self, job: &CopyJobInfo) -> crate::Result<JobProgress>;
}

/// Errors that end a poll without success
#[derive(Debug, Error)]
pub enum PollError {
    /// The progress check itself failed
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The job reported `JobError`; carries the server message verbatim
    #[error("{0}")]
    Job(String),

    /// The job reported `JobFatalError`; carries the server message verbatim
    #[error("{0}")]
    Fatal(String),

    /// A log entry of a progress response is not a JSON event
    #[error(transparent)]
    MalformedLogEntry(#[from] LogDecodeError),

    /// The poll was cancelled before the job finished
    #[error("Polling cancelled before the job finished")]
    Cancelled,

    /// The job did not finish within the configured number of checks
    #[error("Job did not finish after {0} progress checks")]
    AttemptsExhausted(u32),

    /// The job did not finish within the configured time
    #[error("Job did not finish within {0:?}")]
    TimedOut(Duration),
}

impl PollError {
    /// Whether the job itself reported the failure
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::Job(_) | Self::Fatal(_))
    }
}

/// Which failure event ended the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    Fatal,
}

/// State of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No terminal event seen yet after `attempts` progress checks
    Polling { attempts: u32 },
    Succeeded { attempts: u32 },
    Failed {
        attempts: u32,
        kind: FailureKind,
        message: String,
    },
}

impl PollState {
    /// State before the first progress check
    pub fn start() -> Self {
        PollState::Polling { attempts: 0 }
    }

    /// Number of progress checks made so far
    pub fn attempts(&self) -> u32 {
        match self {
            PollState::Polling { attempts }
            | PollState::Succeeded { attempts }
            | PollState::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Polling { .. })
    }

    /// Apply one progress response
    ///
    /// Terminal states absorb any further response.
    pub fn advance(self, progress: &JobProgress) -> Result<Self, LogDecodeError> {
        let PollState::Polling { attempts } = self else {
            return Ok(self);
        };
        let attempts = attempts + 1;

        Ok(match progress.terminal_event()? {
            None => PollState::Polling { attempts },
            Some(TerminalEvent::End) => PollState::Succeeded { attempts },
            Some(TerminalEvent::Error(message)) => PollState::Failed {
                attempts,
                kind: FailureKind::Error,
                message,
            },
            Some(TerminalEvent::FatalError(message)) => PollState::Failed {
                attempts,
                kind: FailureKind::Fatal,
                message,
            },
        })
    }
}

/// Outcome of a successful poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSummary {
    /// Number of progress checks issued
    pub attempts: u32,
    /// `JobState` of the final progress response
    pub job_state: Option<i64>,
}

/// Drives copy jobs to completion
///
/// The poller holds no per-job state; one instance can poll several jobs,
/// each call running its own independent loop.
pub struct JobPoller<D = TokioDelay> {
    config: PollerConfig,
    delay: D,
    cancel: CancellationToken,
}

impl JobPoller<TokioDelay> {
    /// Creates a poller that waits with the tokio timer
    pub fn new(config: PollerConfig) -> Self {
        Self::with_delay(config, TokioDelay)
    }
}

impl<D: Delay> JobPoller<D> {
    /// Creates a poller with a custom wait primitive
    pub fn with_delay(config: PollerConfig, delay: D) -> Self {
        Self {
            config,
            delay,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to cancel polling
    ///
    /// The token is checked before every progress check and raced against
    /// every wait.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels polls driven by this poller
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    fn timed_out(&self) -> PollError {
        PollError::TimedOut(self.config.timeout.unwrap_or_default())
    }

    /// Poll `job` until it reports a terminal event
    ///
    /// # Arguments
    /// * `source` - Issues the progress checks
    /// * `job` - Descriptor passed unchanged to every progress check
    ///
    /// # Errors
    /// - `PollError::Job` / `PollError::Fatal` with the job's message
    /// - `PollError::Transport` when a progress check fails
    /// - `PollError::MalformedLogEntry` when a log entry cannot be decoded
    /// - `PollError::Cancelled`, `AttemptsExhausted`, `TimedOut` when polling stops early
    pub async fn wait_for_completion<S>(
        &self,
        source: &S,
        job: &CopyJobInfo,
    ) -> Result<PollSummary, PollError>
    where
        S: ProgressSource + ?Sized,
    {
        info!(
            "Waiting for copy job {} (interval: {:?})",
            job.job_id(), self.config.interval
        );

        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let mut state = PollState::start();

        loop {
            if self.cancel.is_cancelled() {
                warn!("Polling of copy job {} cancelled", job.job_id());
                return Err(PollError::Cancelled);
            }

            // the first check always goes out, later ones only before the deadline
            if state.attempts() > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(self.timed_out());
            }

            let progress = source.fetch_progress(job).await?;
            state = state.advance(&progress)?;

            match &state {
                PollState::Succeeded { attempts } => {
                    info!(
                        "Copy job {} finished after {} progress check(s)",
                        job.job_id(), attempts
                    );
                    return Ok(PollSummary {
                        attempts: *attempts,
                        job_state: progress.job_state,
                    });
                }
                PollState::Failed { kind, message, .. } => {
                    debug!("Copy job {} failed ({:?}): {}", job.job_id(), kind, message);
                    return Err(match kind {
                        FailureKind::Error => PollError::Job(message.clone()),
                        FailureKind::Fatal => PollError::Fatal(message.clone()),
                    });
                }
                PollState::Polling { attempts } => {
                    debug!(
                        "Copy job {} still running (state: {:?}, {} log entries)",
                        job.job_id(),
                        progress.job_state,
                        progress.log_entries().len()
                    );

                    if self.config.max_attempts.is_some_and(|max| *attempts >= max) {
                        return Err(PollError::AttemptsExhausted(*attempts));
                    }

                }
            }

            let wait = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(self.timed_out());
                    }
                    self.config.interval.min(remaining)
                }
                None => self.config.interval,
            };

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    warn!("Polling of copy job {} cancelled", job.job_id());
                    return Err(PollError::Cancelled);
                }
                _ = self.delay.wait(wait) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Delay that returns immediately and records what it was asked to wait
    #[derive(Default)]
    struct ImmediateDelay {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for ImmediateDelay {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    /// Progress source replaying scripted responses
    ///
    /// Once the script is exhausted every check reports a running job.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<crate::Result<JobProgress>>>,
        requests: Mutex<Vec<CopyJobInfo>>,
        cancel_on_request: Option<(usize, CancellationToken)>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<crate::Result<JobProgress>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProgressSource for ScriptedSource {
        async fn fetch_progress(&self, job: &CopyJobInfo) -> crate::Result<JobProgress> {
            let count = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(job.clone());
                requests.len()
            };

            if let Some((at, token)) = &self.cancel_on_request {
                if *at == count {
                    token.cancel();
                }
            }

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(progress(&[r#"{"Event":"JobStarted"}"#])))
        }
    }

    fn progress(logs: &[&str]) -> JobProgress {
        JobProgress {
            job_state: Some(4),
            logs: Some(logs.iter().map(|l| l.to_string()).collect()),
        }
    }

    fn job() -> CopyJobInfo {
        CopyJobInfo::new(
            "cee65dc5-8d05-41cc-8657-92a12d213f76",
            "https://spobn1sn1m001pr.queue.core.windows.net:443/queue",
        )
        .with_encryption_key("6G35dpTMegtzqT3rsZ/av6agpsqx/SUyaAHBs9fJE6A=")
    }

    fn poller() -> JobPoller<ImmediateDelay> {
        JobPoller::with_delay(PollerConfig::default(), ImmediateDelay::default())
    }

    #[tokio::test]
    async fn test_job_end_completes_without_further_requests() {
        let source = ScriptedSource::new(vec![Ok(JobProgress {
            job_state: Some(0),
            logs: Some(vec![r#"{"Event":"JobEnd","ObjectsProcessed":"2"}"#.to_string()]),
        })]);
        let poller = poller();

        let summary = poller.wait_for_completion(&source, &job()).await.unwrap();

        assert_eq!(
            summary,
            PollSummary {
                attempts: 1,
                job_state: Some(0)
            }
        );
        assert_eq!(source.request_count(), 1);
        assert!(poller.delay.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_job_error_message_is_verbatim() {
        let log = serde_json::to_string(&serde_json::json!({
            "Event": "JobError",
            "Message": "error1"
        }))
        .unwrap();
        let source = ScriptedSource::new(vec![Ok(JobProgress {
            job_state: None,
            logs: Some(vec![log]),
        })]);

        let err = poller()
            .wait_for_completion(&source, &job())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Job(_)));
        assert!(err.is_job_failure());
        assert_eq!(err.to_string(), "error1");
    }

    #[tokio::test]
    async fn test_job_fatal_error_message_is_verbatim() {
        let source = ScriptedSource::new(vec![Ok(JobProgress {
            job_state: Some(0),
            logs: Some(vec![r#"{"Event":"JobFatalError","Message":"error2"}"#.to_string()]),
        })]);

        let err = poller()
            .wait_for_completion(&source, &job())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Fatal(_)));
        assert_eq!(err.to_string(), "error2");
    }

    #[tokio::test]
    async fn test_non_terminal_events_keep_polling() {
        let source = ScriptedSource::new(vec![
            Ok(progress(&[r#"{"Event":"JobQueued"}"#])),
            Ok(progress(&[r#"{"Event":"JobQueued"}"#, r#"{"Event":"JobStarted"}"#])),
            Ok(progress(&[r#"{"Event":"JobStarted"}"#])),
            Ok(progress(&[r#"{"Event":"JobStarted"}"#, r#"{"Event":"JobEnd"}"#])),
        ]);
        let poller = poller();

        let summary = poller.wait_for_completion(&source, &job()).await.unwrap();

        assert_eq!(summary.attempts, 4);
        assert_eq!(source.request_count(), 4);
        assert_eq!(
            *poller.delay.waits.lock().unwrap(),
            vec![Duration::from_millis(500); 3]
        );
    }

    #[tokio::test]
    async fn test_response_without_terminal_event_triggers_another_request() {
        let source = ScriptedSource::new(vec![
            Ok(JobProgress::default()),
            Ok(progress(&[r#"{"Event":"JobEnd"}"#])),
        ]);

        poller().wait_for_completion(&source, &job()).await.unwrap();

        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_descriptor_is_passed_unchanged() {
        let source = ScriptedSource::new(vec![
            Ok(progress(&[r#"{"Event":"JobQueued"}"#])),
            Ok(progress(&[r#"{"Event":"JobStarted"}"#])),
            Ok(progress(&[r#"{"Event":"JobEnd"}"#])),
        ]);
        let job = job();

        poller().wait_for_completion(&source, &job).await.unwrap();

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|seen| *seen == job));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let source = ScriptedSource::new(vec![
            Ok(progress(&[r#"{"Event":"JobQueued"}"#])),
            Err(ClientError::api_error(503, "Service Unavailable")),
            Ok(progress(&[r#"{"Event":"JobEnd"}"#])),
        ]);

        let err = poller()
            .wait_for_completion(&source, &job())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PollError::Transport(ClientError::ApiError { status: 503, .. })
        ));
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_log_entry() {
        let source = ScriptedSource::new(vec![Ok(progress(&["{\"Event\":"]))]);

        let err = poller()
            .wait_for_completion(&source, &job())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::MalformedLogEntry(ref e) if e.index == 0));
    }

    #[tokio::test]
    async fn test_max_attempts() {
        let source = ScriptedSource::new(vec![]);
        let poller = JobPoller::with_delay(
            PollerConfig::default().with_max_attempts(3),
            ImmediateDelay::default(),
        );

        let err = poller.wait_for_completion(&source, &job()).await.unwrap_err();

        assert!(matches!(err, PollError::AttemptsExhausted(3)));
        assert_eq!(source.request_count(), 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let source = ScriptedSource::new(vec![]);
        let poller = JobPoller::with_delay(
            PollerConfig::default().with_timeout(Duration::ZERO),
            ImmediateDelay::default(),
        );

        let err = poller.wait_for_completion(&source, &job()).await.unwrap_err();

        assert!(matches!(err, PollError::TimedOut(_)));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_shortens_last_wait() {
        let source = ScriptedSource::new(vec![]);
        let poller = JobPoller::new(
            PollerConfig::new(Duration::from_secs(3600)).with_timeout(Duration::from_millis(50)),
        );

        let started = std::time::Instant::now();
        let err = poller.wait_for_completion(&source, &job()).await.unwrap_err();

        assert!(matches!(err, PollError::TimedOut(t) if t == Duration::from_millis(50)));
        assert_eq!(source.request_count(), 1);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_wait_never_exceeds_timeout() {
        let source = ScriptedSource::new(vec![
            Ok(progress(&[r#"{"Event":"JobStarted"}"#])),
            Ok(progress(&[r#"{"Event":"JobEnd"}"#])),
        ]);
        let poller = JobPoller::with_delay(
            PollerConfig::new(Duration::from_secs(3600)).with_timeout(Duration::from_secs(60)),
            ImmediateDelay::default(),
        );

        poller.wait_for_completion(&source, &job()).await.unwrap();

        let waits = poller.delay.waits.lock().unwrap();
        assert_eq!(waits.len(), 1);
        assert!(waits[0] <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_cancellation_between_polls() {
        let token = CancellationToken::new();
        let source = ScriptedSource {
            cancel_on_request: Some((2, token.clone())),
            ..Default::default()
        };
        let poller = poller().with_cancellation(token);

        let err = poller.wait_for_completion(&source, &job()).await.unwrap_err();

        assert!(matches!(err, PollError::Cancelled));
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let source = ScriptedSource::new(vec![]);
        let poller = poller();
        poller.cancellation_token().cancel();

        let err = poller.wait_for_completion(&source, &job()).await.unwrap_err();

        assert!(matches!(err, PollError::Cancelled));
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_wait() {
        let source = ScriptedSource::new(vec![]);
        let poller = JobPoller::new(PollerConfig::new(Duration::from_secs(3600)));
        let token = poller.cancellation_token();
        let job = job();

        let (result, _) = tokio::join!(poller.wait_for_completion(&source, &job), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn test_state_transitions() {
        let running = progress(&[r#"{"Event":"JobStarted"}"#]);
        let done = progress(&[r#"{"Event":"JobEnd"}"#]);

        let state = PollState::start();
        assert!(!state.is_terminal());

        let state = state.advance(&running).unwrap();
        assert_eq!(state, PollState::Polling { attempts: 1 });

        let state = state.advance(&done).unwrap();
        assert_eq!(state, PollState::Succeeded { attempts: 2 });
        assert!(state.is_terminal());

        // terminal states ignore later responses
        let state = state
            .advance(&progress(&[r#"{"Event":"JobError","Message":"late"}"#]))
            .unwrap();
        assert_eq!(state.attempts(), 2);
        assert_eq!(state, PollState::Succeeded { attempts: 2 });
    }
}
