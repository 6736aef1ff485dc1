//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod spo;

pub use spo::SpoCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// SharePoint Online
    Spo {
        #[command(subcommand)]
        command: SpoCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Spo { command } => spo::handle_spo_command(command, config).await,
    }
}
