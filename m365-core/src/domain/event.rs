//! Job log events
//!
//! A progress response carries its events as JSON documents encoded in
//! strings. Decoding them is a separate pass from decoding the response
//! itself, so a bad entry is reported as such and not as a bad response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Discriminant of a job log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobEventKind {
    JobQueued,
    JobStarted,
    JobEnd,
    JobError,
    JobFatalError,
    /// Any event the poller does not act on (e.g. `JobLogFileCreate`)
    Other(String),
}

impl JobEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            JobEventKind::JobQueued => "JobQueued",
            JobEventKind::JobStarted => "JobStarted",
            JobEventKind::JobEnd => "JobEnd",
            JobEventKind::JobError => "JobError",
            JobEventKind::JobFatalError => "JobFatalError",
            JobEventKind::Other(name) => name,
        }
    }

    /// Whether this event ends the job
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobEventKind::JobEnd | JobEventKind::JobError | JobEventKind::JobFatalError
        )
    }
}

impl From<String> for JobEventKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "JobQueued" => JobEventKind::JobQueued,
            "JobStarted" => JobEventKind::JobStarted,
            "JobEnd" => JobEventKind::JobEnd,
            "JobError" => JobEventKind::JobError,
            "JobFatalError" => JobEventKind::JobFatalError,
            _ => JobEventKind::Other(name),
        }
    }
}

impl From<JobEventKind> for String {
    fn from(kind: JobEventKind) -> Self {
        match kind {
            JobEventKind::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single decoded job log event
///
/// Only `Event` and `Message` drive polling. Progress counters
/// (`BytesProcessed`, `ObjectsProcessed`, ...) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobLogEvent {
    pub event: JobEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl JobLogEvent {
    /// Decode one string-encoded log entry
    ///
    /// # Arguments
    /// * `index` - Position of the entry in the response's log array
    /// * `raw` - The JSON document held by the entry
    pub fn decode(index: usize, raw: &str) -> Result<Self, LogDecodeError> {
        serde_json::from_str(raw).map_err(|source| LogDecodeError { index, source })
    }

    /// Map the event to its terminal meaning, if it has one
    pub fn terminal(&self) -> Option<TerminalEvent> {
        let message = || self.message.clone().unwrap_or_default();

        match self.event {
            JobEventKind::JobEnd => Some(TerminalEvent::End),
            JobEventKind::JobError => Some(TerminalEvent::Error(message())),
            JobEventKind::JobFatalError => Some(TerminalEvent::FatalError(message())),
            _ => None,
        }
    }
}

/// Terminal outcome reported by a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    End,
    Error(String),
    FatalError(String),
}

/// A log entry that is not a valid JSON event
#[derive(Debug, Error)]
#[error("Failed to decode job log entry {index}: {source}")]
pub struct LogDecodeError {
    pub index: usize,
    #[source]
    pub source: serde_json::Error,
}
