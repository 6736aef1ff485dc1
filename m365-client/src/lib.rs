//! M365 SharePoint Client
//!
//! A small, type-safe HTTP client for the SharePoint Online REST endpoints
//! used by the copy and move commands, plus the poller that drives a copy
//! job to completion.
//!
//! # Example
//!
//! ```no_run
//! use m365_client::SpoClient;
//! use m365_client::scheduler::{JobPoller, PollerConfig};
//! use m365_core::dto::copy_job::CopyJobOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpoClient::new("https://contoso.sharepoint.com/sites/team", "<access token>");
//!
//!     let job = client
//!         .create_copy_job(
//!             "https://contoso.sharepoint.com/sites/team/Shared Documents/report.pdf",
//!             "https://contoso.sharepoint.com/sites/team/Archive",
//!             CopyJobOptions::r#move(false),
//!         )
//!         .await?;
//!
//!     JobPoller::new(PollerConfig::default())
//!         .wait_for_completion(&client, &job)
//!         .await?;
//!     Ok(())
//! }
//! ```

mod copy_jobs;
pub mod error;
pub mod scheduler;
mod web;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use m365_core::domain::job::{CopyJobInfo, JobProgress};
pub use web::ObjectKind;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Accept header asking SharePoint for plain JSON without OData metadata
const ACCEPT_NOMETADATA: &str = "application/json;odata=nometadata";

/// Characters left untouched by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// HTTP client for the REST API of one SharePoint site
///
/// Endpoints are grouped by concern:
/// - Copy jobs (create, progress)
/// - Web objects (folder/file existence, recycle)
#[derive(Debug, Clone)]
pub struct SpoClient {
    /// URL of the site (e.g., "https://contoso.sharepoint.com/sites/team")
    base_url: String,
    /// Bearer token attached to every request
    access_token: String,
    /// HTTP client instance
    client: Client,
}

impl SpoClient {
    /// Create a new SharePoint client
    ///
    /// # Arguments
    /// * `base_url` - The URL of the site whose REST API is called
    /// * `access_token` - A bearer token valid for the SharePoint resource
    ///
    /// # Example
    /// ```
    /// use m365_client::SpoClient;
    ///
    /// let client = SpoClient::new("https://contoso.sharepoint.com", "token");
    /// ```
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_client(base_url, access_token, Client::new())
    }

    /// Create a new SharePoint client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            client,
        }
    }

    /// Get the site URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(format!("{}/{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(format!("{}/{}", self.base_url, path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_NOMETADATA)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., recycle operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response_body(status.as_u16(), &error_text));
        }

        Ok(())
    }
}

/// Quote a server-relative path for the `('...')` call syntax of the REST API
pub(crate) fn quote_path(path: &str) -> String {
    utf8_percent_encode(&path.replace('\'', "''"), COMPONENT).to_string()
}
