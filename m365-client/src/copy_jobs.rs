//! Copy job API endpoints

use async_trait::async_trait;
use m365_core::domain::job::{CopyJobInfo, JobProgress};
use m365_core::dto::copy_job::{
    CopyJobOptions, CreateCopyJobs, CreateCopyJobsResponse, GetCopyJobProgress,
};
use tracing::debug;

use crate::SpoClient;
use crate::error::{ClientError, Result};
use crate::scheduler::ProgressSource;

impl SpoClient {
    // =============================================================================
    // Copy Jobs
    // =============================================================================

    /// Start copy jobs for a set of objects
    ///
    /// # Arguments
    /// * `req` - The objects to export, their destination and the job options
    ///
    /// # Returns
    /// One job descriptor per exported object
    pub async fn create_copy_jobs(&self, req: &CreateCopyJobs) -> Result<Vec<CopyJobInfo>> {
        let response = self
            .post("_api/site/CreateCopyJobs")
            .json(req)
            .send()
            .await?;

        let created: CreateCopyJobsResponse = self.handle_response(response).await?;
        Ok(created.value)
    }

    /// Start a copy job for a single file or folder
    ///
    /// # Arguments
    /// * `source_url` - Absolute URL of the file or folder
    /// * `destination_url` - Absolute URL of the target folder
    /// * `options` - Copy or move options
    ///
    /// # Returns
    /// The descriptor of the created job
    pub async fn create_copy_job(
        &self,
        source_url: &str,
        destination_url: &str,
        options: CopyJobOptions,
    ) -> Result<CopyJobInfo> {
        let req = CreateCopyJobs {
            export_object_uris: vec![source_url.to_string()],
            destination_uri: destination_url.to_string(),
            options,
        };

        let job = self
            .create_copy_jobs(&req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClientError::ParseError("CreateCopyJobs returned no job".to_string())
            })?;

        debug!(
            "Created copy job {} for {} -> {}",
            job.job_id(), source_url, destination_url
        );
        Ok(job)
    }

    /// Get the current progress of a copy job
    ///
    /// # Arguments
    /// * `job` - The descriptor returned when the job was created
    pub async fn get_copy_job_progress(&self, job: &CopyJobInfo) -> Result<JobProgress> {
        let response = self
            .post("_api/site/GetCopyJobProgress")
            .json(&GetCopyJobProgress {
                copy_job_info: job.clone(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[async_trait]
impl ProgressSource for SpoClient {
    async fn fetch_progress(&self, job: &CopyJobInfo) -> Result<JobProgress> {
        self.get_copy_job_progress(job).await
    }
}
