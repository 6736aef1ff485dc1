//! Configuration module
//!
//! Handles CLI configuration: credentials, job polling settings and output
//! verbosity.

use anyhow::Result;
use clap::Args;
use m365_client::scheduler::PollerConfig;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token sent to SharePoint
    pub access_token: String,

    /// How copy jobs are polled
    pub poller: PollerConfig,

    /// Report progress on stderr
    pub verbose: bool,

    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
}

/// Job polling options
#[derive(Debug, Clone, Args)]
pub struct PollArgs {
    /// Delay between two progress checks of a copy job, in milliseconds
    #[arg(long, global = true, env = "M365_POLL_INTERVAL_MS", default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Give up after this many progress checks
    #[arg(long, global = true, env = "M365_POLL_MAX_ATTEMPTS")]
    pub poll_max_attempts: Option<u32>,

    /// Give up after this many seconds
    #[arg(long, global = true, env = "M365_POLL_TIMEOUT_SECS")]
    pub poll_timeout_secs: Option<u64>,
}

impl PollArgs {
    /// Build and validate the poller configuration
    pub fn into_config(self) -> Result<PollerConfig> {
        let mut config = PollerConfig::new(Duration::from_millis(self.poll_interval_ms));

        if let Some(max_attempts) = self.poll_max_attempts {
            config = config.with_max_attempts(max_attempts);
        }

        if let Some(timeout) = self.poll_timeout_secs {
            config = config.with_timeout(Duration::from_secs(timeout));
        }

        config.validate()?;
        Ok(config)
    }
}
