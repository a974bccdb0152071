//! SDK commands: list, releases, install, remove.

use clap::Subcommand;
use console::style;
use ohsdk::manager::{installed_sdk_levels, remove_sdk, SdkInstaller, SdkRelease, SDK_RELEASES};

use super::common::{print_install_result, print_removed, BarProgress};
use crate::error::CliError;
use crate::runner::CliRunner;

/// SDK subcommands.
#[derive(Debug, Subcommand)]
pub enum SdkCommands {
    /// List installed API levels
    List,

    /// List known SDK releases
    Releases,

    /// Download and install an SDK release
    Install {
        /// Release version (e.g. 5.0.2) or API level (e.g. 14)
        release: String,
    },

    /// Remove an installed API level
    Remove {
        /// API level to remove
        api: u32,
    },
}

/// Run an SDK subcommand.
pub fn run(command: SdkCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("sdk");

    match command {
        SdkCommands::List => run_list(&runner),
        SdkCommands::Releases => run_releases(&runner),
        SdkCommands::Install { release } => run_install(&runner, &release),
        SdkCommands::Remove { api } => {
            remove_sdk(runner.config(), runner.platform(), api)?;
            print_removed(&format!("SDK API {}", api));
            Ok(())
        }
    }
}

fn run_list(runner: &CliRunner) -> Result<(), CliError> {
    let levels = installed_sdk_levels(runner.config(), runner.platform())?;
    if levels.is_empty() {
        println!("No SDK installed under {}", runner.config().sdk_root.display());
        return Ok(());
    }

    for api in levels {
        match SdkRelease::for_api(api) {
            Some(release) => println!("  API {:<3} ({})", api, release.version),
            None => println!("  API {:<3} (unknown release)", api),
        }
    }
    Ok(())
}

fn run_releases(runner: &CliRunner) -> Result<(), CliError> {
    let installed = installed_sdk_levels(runner.config(), runner.platform())?;

    println!("Known SDK releases");
    println!("==================");
    for release in SDK_RELEASES {
        let marker = if installed.contains(&release.api_level) {
            style("installed").green().to_string()
        } else {
            String::new()
        };
        println!("  {:<7} API {:<3} {}", release.version, release.api_level, marker);
    }
    Ok(())
}

fn run_install(runner: &CliRunner, query: &str) -> Result<(), CliError> {
    let release = SdkRelease::find(query)?;
    let cancel = runner.cancel_on_ctrlc();
    let installer = SdkInstaller::new(
        runner.config().clone(),
        runner.platform(),
        runner.downloader()?,
    );

    println!("Installing SDK {} for {}", release, runner.platform());
    let progress = BarProgress::new();
    let result = installer.install(release, &progress, &cancel);
    progress.finish();

    print_install_result(&result?);
    Ok(())
}
