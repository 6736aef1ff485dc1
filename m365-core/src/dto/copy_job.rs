//! Copy job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::CopyJobInfo;

/// Request body for `CreateCopyJobs`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCopyJobs {
    /// Absolute URLs of the files or folders to copy
    pub export_object_uris: Vec<String>,
    /// Absolute URL of the destination folder
    pub destination_uri: String,
    pub options: CopyJobOptions,
}

/// Options of a copy job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CopyJobOptions {
    pub allow_schema_mismatch: bool,
    pub ignore_version_history: bool,
    /// Delete the source once the copy succeeded
    pub is_move_mode: bool,
}

impl CopyJobOptions {
    /// Options for a copy job
    pub fn copy(allow_schema_mismatch: bool) -> Self {
        Self {
            allow_schema_mismatch,
            ignore_version_history: true,
            is_move_mode: false,
        }
    }

    /// Options for a move job
    pub fn r#move(allow_schema_mismatch: bool) -> Self {
        Self {
            is_move_mode: true,
            ..Self::copy(allow_schema_mismatch)
        }
    }
}

/// Response of `CreateCopyJobs`, one descriptor per exported object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCopyJobsResponse {
    pub value: Vec<CopyJobInfo>,
}

/// Request body for `GetCopyJobProgress`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCopyJobProgress {
    pub copy_job_info: CopyJobInfo,
}
