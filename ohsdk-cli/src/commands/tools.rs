//! Command-line tools commands.

use std::path::PathBuf;

use clap::Subcommand;
use ohsdk::manager::{remove_tools, ToolsInstaller};

use super::common::{print_install_result, print_removed, BarProgress, PromptArchivePicker};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Tools subcommands.
#[derive(Debug, Subcommand)]
pub enum ToolsCommands {
    /// Install the command-line tools
    Install {
        /// Install from a downloaded archive instead of the configured URL
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Remove the command-line tools
    Remove,
}

/// Run a tools subcommand.
pub fn run(command: ToolsCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("tools");

    match command {
        ToolsCommands::Install { archive } => {
            let cancel = runner.cancel_on_ctrlc();
            let installer = ToolsInstaller::new(
                runner.config().clone(),
                runner.platform(),
                runner.downloader()?,
            );

            let progress = BarProgress::new();
            let result = match archive {
                Some(path) => installer.install_from_archive(&path, &progress, &cancel),
                None => installer.install(&PromptArchivePicker, &progress, &cancel),
            };
            progress.finish();

            print_install_result(&result?);
            Ok(())
        }
        ToolsCommands::Remove => {
            remove_tools(runner.config())?;
            print_removed("command-line tools");
            Ok(())
        }
    }
}
