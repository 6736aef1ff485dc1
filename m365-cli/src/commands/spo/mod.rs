//! SharePoint Online commands

mod transfer;

pub use transfer::TransferCommands;

use anyhow::Result;
use clap::Subcommand;
use m365_client::ObjectKind;

use crate::config::Config;

/// SharePoint Online subcommands
#[derive(Subcommand)]
pub enum SpoCommands {
    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: TransferCommands,
    },
    /// Manage files
    File {
        #[command(subcommand)]
        command: TransferCommands,
    },
}

/// Handle SharePoint Online commands
pub async fn handle_spo_command(command: SpoCommands, config: &Config) -> Result<()> {
    match command {
        SpoCommands::Folder { command } => {
            transfer::handle_transfer_command(command, ObjectKind::Folder, config).await
        }
        SpoCommands::File { command } => {
            transfer::handle_transfer_command(command, ObjectKind::File, config).await
        }
    }
}
