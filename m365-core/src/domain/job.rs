//! Copy job domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::event::{JobLogEvent, LogDecodeError, TerminalEvent};

const ENCRYPTION_KEY: &str = "EncryptionKey";
const JOB_ID: &str = "JobId";
const JOB_QUEUE_URI: &str = "JobQueueUri";

/// A `CreateCopyJobs` result that is not a usable job descriptor
#[derive(Debug, Error)]
#[error("copy job descriptor has no string field {0}")]
pub struct InvalidDescriptor(&'static str);

/// Descriptor of a copy job, as returned by `CreateCopyJobs`
///
/// The server's object is kept as received, including fields this crate
/// does not know about, and is serialized back unchanged for every
/// `GetCopyJobProgress` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CopyJobInfo {
    fields: Map<String, Value>,
}

impl CopyJobInfo {
    pub fn new(job_id: impl Into<String>, job_queue_uri: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(JOB_ID.to_string(), Value::String(job_id.into()));
        fields.insert(JOB_QUEUE_URI.to_string(), Value::String(job_queue_uri.into()));
        Self { fields }
    }

    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.fields
            .insert(ENCRYPTION_KEY.to_string(), Value::String(key.into()));
        self
    }

    /// Job id exactly as the server wrote it
    pub fn job_id(&self) -> &str {
        self.str_field(JOB_ID).unwrap_or_default()
    }

    pub fn job_queue_uri(&self) -> &str {
        self.str_field(JOB_QUEUE_URI).unwrap_or_default()
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.str_field(ENCRYPTION_KEY)
    }

    /// Any field of the descriptor by its wire name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for CopyJobInfo {
    type Error = InvalidDescriptor;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for required in [JOB_ID, JOB_QUEUE_URI] {
            if !fields.get(required).is_some_and(Value::is_string) {
                return Err(InvalidDescriptor(required));
            }
        }

        Ok(Self { fields })
    }
}

impl From<CopyJobInfo> for Map<String, Value> {
    fn from(info: CopyJobInfo) -> Self {
        info.fields
    }
}

/// Response of a single progress check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobProgress {
    /// Numeric job state reported by the server
    #[serde(default)]
    pub job_state: Option<i64>,

    /// JSON-encoded log events, oldest first
    #[serde(default)]
    pub logs: Option<Vec<String>>,
}

impl JobProgress {
    /// Raw log entries, empty when the server sent none
    pub fn log_entries(&self) -> &[String] {
        self.logs.as_deref().unwrap_or_default()
    }

    /// Decode every log entry in order
    pub fn events(&self) -> Result<Vec<JobLogEvent>, LogDecodeError> {
        self.log_entries()
            .iter()
            .enumerate()
            .map(|(index, raw)| JobLogEvent::decode(index, raw))
            .collect()
    }

    /// Find the first terminal event among the log entries
    ///
    /// Every entry in the response is scanned, not only the newest one.
    /// Entries are decoded lazily, so an undecodable entry after the first
    /// terminal event does not fail the scan.
    pub fn terminal_event(&self) -> Result<Option<TerminalEvent>, LogDecodeError> {
        for (index, raw) in self.log_entries().iter().enumerate() {
            let event = JobLogEvent::decode(index, raw)?;
            if let Some(terminal) = event.terminal() {
                return Ok(Some(terminal));
            }
        }

        Ok(None)
    }
}
