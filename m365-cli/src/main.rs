//! M365 CLI
//!
//! Command-line interface for Microsoft 365. Copy and move commands start a
//! SharePoint copy job and wait for it to finish.

mod commands;
mod config;
mod urls;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, PollArgs};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "m365")]
#[command(about = "Manage Microsoft 365 from the command line", long_about = None)]
struct Cli {
    /// Bearer token for the SharePoint resource
    #[arg(long, global = true, env = "M365_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(flatten)]
    poll: PollArgs,

    /// Log progress to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Log requests and job progress to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.debug);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let access_token = cli
        .access_token
        .context("No access token, pass --access-token or set M365_ACCESS_TOKEN")?;

    let config = Config {
        access_token,
        poller: cli.poll.into_config()?,
        verbose: cli.verbose || cli.debug,
        cancel,
    };

    handle_command(cli.command, &config).await
}

/// Initialize logging on stderr, honouring `RUST_LOG` when set
fn init_tracing(verbose: bool, debug: bool) {
    let default_filter = if debug {
        "m365_cli=debug,m365_client=debug"
    } else if verbose {
        "m365_cli=info,m365_client=info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Cancel running polls on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });
}
