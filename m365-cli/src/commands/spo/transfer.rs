//! Copy and move command handlers
//!
//! Copies or moves a file or folder to another folder by starting a
//! SharePoint copy job and polling it until it finishes.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::*;
use m365_client::scheduler::{JobPoller, PollSummary};
use m365_client::{ObjectKind, SpoClient};
use m365_core::dto::copy_job::CopyJobOptions;
use tracing::info;

use crate::config::Config;
use crate::urls::{SiteUrl, is_valid_sharepoint_url, leaf_name};

/// Copy and move subcommands
#[derive(Subcommand)]
pub enum TransferCommands {
    /// Move to another folder
    Move(TransferArgs),
    /// Copy to another folder
    Copy(TransferArgs),
}

/// Options shared by copy and move
#[derive(Debug, Clone, Args)]
pub struct TransferArgs {
    /// URL of the site where the source is located
    #[arg(short = 'u', long, alias = "webUrl")]
    pub web_url: String,

    /// Site- or server-relative URL of the file or folder
    #[arg(short = 's', long, alias = "sourceUrl")]
    pub source_url: String,

    /// Destination folder: site-relative, server-relative (any site of the
    /// tenant) or absolute URL
    #[arg(short = 't', long, alias = "targetUrl")]
    pub target_url: String,

    /// Recycle an item with the same name in the destination first
    #[arg(long, alias = "deleteIfAlreadyExists")]
    pub delete_if_already_exists: bool,

    /// Copy even when the destination library has a different schema
    #[arg(long, alias = "allowSchemaMismatch")]
    pub allow_schema_mismatch: bool,
}

impl TransferArgs {
    /// Validates the options
    pub fn validate(&self) -> Result<()> {
        if !is_valid_sharepoint_url(&self.web_url) {
            bail!("'{}' is not a valid SharePoint Online site URL", self.web_url);
        }

        if self.source_url.trim().is_empty() {
            bail!("source URL cannot be empty");
        }

        if self.target_url.trim().is_empty() {
            bail!("target URL cannot be empty");
        }

        Ok(())
    }
}

/// Whether the source is kept after the copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

/// A resolved copy or move request
#[derive(Debug, Clone)]
pub struct Transfer {
    pub kind: ObjectKind,
    pub mode: TransferMode,
    pub site: SiteUrl,
    pub source_url: String,
    pub target_url: String,
    pub delete_if_already_exists: bool,
    pub allow_schema_mismatch: bool,
}

impl Transfer {
    pub fn new(kind: ObjectKind, mode: TransferMode, site: SiteUrl, args: TransferArgs) -> Self {
        Self {
            kind,
            mode,
            site,
            source_url: args.source_url,
            target_url: args.target_url,
            delete_if_already_exists: args.delete_if_already_exists,
            allow_schema_mismatch: args.allow_schema_mismatch,
        }
    }

    fn options(&self) -> CopyJobOptions {
        match self.mode {
            TransferMode::Copy => CopyJobOptions::copy(self.allow_schema_mismatch),
            TransferMode::Move => CopyJobOptions::r#move(self.allow_schema_mismatch),
        }
    }
}

/// Handle copy and move commands
///
/// # Arguments
/// * `command` - The copy or move command
/// * `kind` - Whether the source is a file or a folder
/// * `config` - The CLI configuration
pub async fn handle_transfer_command(
    command: TransferCommands,
    kind: ObjectKind,
    config: &Config,
) -> Result<()> {
    let (mode, args) = match command {
        TransferCommands::Move(args) => (TransferMode::Move, args),
        TransferCommands::Copy(args) => (TransferMode::Copy, args),
    };

    args.validate()?;
    let site = SiteUrl::parse(&args.web_url)?;

    let client = SpoClient::new(site.as_str(), config.access_token.clone());
    let poller =
        JobPoller::new(config.poller.clone()).with_cancellation(config.cancel.clone());

    run_transfer(&client, &poller, &Transfer::new(kind, mode, site, args)).await?;

    if config.verbose {
        eprintln!("{}", "DONE".green());
    }

    Ok(())
}

/// Start the copy job of a transfer and wait for it to finish
///
/// When the job itself fails, the returned error's message is the one
/// reported by SharePoint, unchanged.
pub async fn run_transfer(
    client: &SpoClient,
    poller: &JobPoller,
    transfer: &Transfer,
) -> Result<PollSummary> {
    let site = &transfer.site;
    let source = site.server_relative(&transfer.source_url);
    let target_folder = site.tenant_relative(&transfer.target_url)?;

    if transfer.delete_if_already_exists {
        let existing = format!("{}/{}", target_folder, leaf_name(&source));
        let recycled = client
            .recycle_if_exists(transfer.kind, &existing)
            .await
            .with_context(|| format!("Failed to recycle {}", existing))?;

        if recycled {
            info!("Recycled existing {:?} {}", transfer.kind, existing);
        }
    }

    let job = client
        .create_copy_job(
            &site.on_tenant(&source),
            &site.on_tenant(&target_folder),
            transfer.options(),
        )
        .await
        .with_context(|| format!("Failed to start copy job for {}", source))?;

    info!(
        "Started {:?} of {} to {} (job {})",
        transfer.mode, source, target_folder, job.job_id()
    );

    match poller.wait_for_completion(client, &job).await {
        Ok(summary) => Ok(summary),
        Err(e) if e.is_job_failure() => Err(e.into()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to track copy job {}", job.job_id()))),
    }
}
