//! Error types for the SharePoint client

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the SharePoint client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body
    ///
    /// SharePoint reports failures as OData error documents; when the body is
    /// one of those, only its message is kept.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let message = odata_error_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        });

        Self::api_error(status, message)
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

#[derive(Deserialize)]
struct VerboseODataError {
    #[serde(rename = "odata.error")]
    error: VerboseODataBody,
}

#[derive(Deserialize)]
struct VerboseODataBody {
    message: VerboseODataMessage,
}

#[derive(Deserialize)]
struct VerboseODataMessage {
    value: String,
}

#[derive(Deserialize)]
struct ODataError {
    error: ODataBody,
}

#[derive(Deserialize)]
struct ODataBody {
    message: String,
}

/// Extract the message of an OData error document
///
/// Handles both the `odata.error` shape returned by SharePoint REST and the
/// `error` shape returned by Graph.
fn odata_error_message(body: &str) -> Option<String> {
    if let Ok(err) = serde_json::from_str::<VerboseODataError>(body) {
        return Some(err.error.message.value);
    }

    serde_json::from_str::<ODataError>(body)
        .ok()
        .map(|err| err.error.message)
}
