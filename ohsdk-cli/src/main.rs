//! ohsdk - OpenHarmony SDK manager
//!
//! Installs SDK API levels, the command-line tools and the emulator, and
//! locates the tools inside them.

mod commands;
mod error;
mod runner;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::emulator::EmulatorCommands;
use commands::locate::LocateCommands;
use commands::sdk::SdkCommands;
use commands::tools::ToolsCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "ohsdk", version, about = "OpenHarmony SDK manager")]
struct Cli {
    /// Log debug output to the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage SDK API levels
    #[command(subcommand)]
    Sdk(SdkCommands),

    /// Manage the command-line tools (ohpm, hvigor, signing tools)
    #[command(subcommand)]
    Tools(ToolsCommands),

    /// Manage the emulator
    #[command(subcommand)]
    Emulator(EmulatorCommands),

    /// Print the path of an installed tool
    #[command(subcommand)]
    Locate(LocateCommands),

    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Sdk(command) => commands::sdk::run(command, cli.verbose),
        Commands::Tools(command) => commands::tools::run(command, cli.verbose),
        Commands::Emulator(command) => commands::emulator::run(command, cli.verbose),
        Commands::Locate(command) => commands::locate::run(command, cli.verbose),
        Commands::Config(command) => commands::config::run(command),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            if code == error::EXIT_CANCELLED {
                eprintln!("{}", style("Cancelled.").yellow());
            } else {
                eprintln!("{} {}", style("Error:").red().bold(), e);
            }
            ExitCode::from(code as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sdk_install() {
        let cli = Cli::try_parse_from(["ohsdk", "-v", "sdk", "install", "5.0.2"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Sdk(SdkCommands::Install { ref release }) if release == "5.0.2"
        ));
    }

    #[test]
    fn test_parse_tools_archive() {
        let cli =
            Cli::try_parse_from(["ohsdk", "tools", "install", "--archive", "/tmp/tools.zip"])
                .unwrap();
        match cli.command {
            Commands::Tools(ToolsCommands::Install { archive }) => {
                assert_eq!(archive.unwrap().to_str(), Some("/tmp/tools.zip"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_locate_hdc_api() {
        let cli = Cli::try_parse_from(["ohsdk", "locate", "hdc", "--api", "14"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Locate(LocateCommands::Hdc { api: Some(14) })
        ));
    }
}
