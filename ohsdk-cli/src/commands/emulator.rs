//! Emulator commands.

use clap::Subcommand;
use ohsdk::manager::{remove_emulator, EmulatorInstaller};

use super::common::{print_install_result, print_removed, BarProgress};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Emulator subcommands.
#[derive(Debug, Subcommand)]
pub enum EmulatorCommands {
    /// Download and install the emulator
    Install,

    /// Remove the emulator
    Remove,
}

/// Run an emulator subcommand.
pub fn run(command: EmulatorCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("emulator");

    match command {
        EmulatorCommands::Install => {
            let cancel = runner.cancel_on_ctrlc();
            let installer = EmulatorInstaller::new(
                runner.config().clone(),
                runner.platform(),
                runner.downloader()?,
            );

            let progress = BarProgress::new();
            let result = installer.install(&progress, &cancel);
            progress.finish();

            print_install_result(&result?);
            Ok(())
        }
        EmulatorCommands::Remove => {
            remove_emulator(runner.config())?;
            print_removed("emulator");
            Ok(())
        }
    }
}
