//! Web object endpoints: existence checks and recycling of files and folders

use reqwest::StatusCode;
use tracing::debug;

use crate::error::Result;
use crate::{SpoClient, quote_path};

/// Kind of object addressed by a server-relative URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    File,
    Folder,
}

impl ObjectKind {
    fn accessor(self) -> &'static str {
        match self {
            ObjectKind::File => "GetFileByServerRelativeUrl",
            ObjectKind::Folder => "GetFolderByServerRelativeUrl",
        }
    }

    fn path(self, server_relative_url: &str) -> String {
        format!(
            "_api/web/{}('{}')",
            self.accessor(),
            quote_path(server_relative_url)
        )
    }
}

impl SpoClient {
    // =============================================================================
    // Web Objects
    // =============================================================================

    /// Check whether a file or folder exists
    ///
    /// # Arguments
    /// * `kind` - Whether the URL points at a file or a folder
    /// * `server_relative_url` - Server-relative URL of the object
    ///
    /// # Returns
    /// `true` when the object exists, `false` when the API answers 404
    pub async fn object_exists(&self, kind: ObjectKind, server_relative_url: &str) -> Result<bool> {
        let response = self.get(&kind.path(server_relative_url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{:?} {} does not exist", kind, server_relative_url);
            return Ok(false);
        }

        self.handle_empty_response(response).await?;
        Ok(true)
    }

    /// Move a file or folder to the recycle bin
    ///
    /// # Arguments
    /// * `kind` - Whether the URL points at a file or a folder
    /// * `server_relative_url` - Server-relative URL of the object
    pub async fn recycle(&self, kind: ObjectKind, server_relative_url: &str) -> Result<()> {
        let path = format!("{}/recycle()", kind.path(server_relative_url));
        let response = self.post(&path).send().await?;

        self.handle_empty_response(response).await
    }

    /// Recycle an object if it exists
    ///
    /// # Returns
    /// `true` when an object was recycled
    pub async fn recycle_if_exists(
        &self,
        kind: ObjectKind,
        server_relative_url: &str,
    ) -> Result<bool> {
        match self.object_exists(kind, server_relative_url).await {
            Ok(true) => {
                self.recycle(kind, server_relative_url).await?;
                debug!("Recycled {:?} {}", kind, server_relative_url);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
