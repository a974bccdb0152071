//! Print paths of installed tools.

use clap::Subcommand;
use ohsdk::manager::locate;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Tools that can be located.
#[derive(Debug, Subcommand)]
pub enum LocateCommands {
    /// The ohpm package manager launcher
    Ohpm,

    /// The hdc device connector
    Hdc {
        /// API level to look in (defaults to the highest installed)
        #[arg(long)]
        api: Option<u32>,
    },
}

/// Run a locate subcommand.
pub fn run(command: LocateCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("locate");

    let path = match command {
        LocateCommands::Ohpm => locate::ohpm(runner.config(), runner.platform())?,
        LocateCommands::Hdc { api } => locate::hdc(runner.config(), runner.platform(), api)?,
    };
    println!("{}", path.display());
    Ok(())
}
