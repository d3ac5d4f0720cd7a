use std::path::PathBuf;

use clap::Parser;

/// Downloads, updates and restores the Armory 3D engine SDK.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    #[clap(short, long, env = "ARMSDK_SDK_PATH")]
    /// Directory the SDK is installed into.
    /// Defaults to `sdk.path` from ~/.armsdk/config.toml
    pub sdk_path: Option<PathBuf>,
    #[clap(short, long)]
    /// Project directory. An `armsdk` directory inside it is used instead of the SDK path
    pub project_dir: Option<PathBuf>,
    #[clap(long)]
    /// Git executable used for cloning
    pub git: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Downloads and sets up the latest development version of the SDK
    Install,
    /// Updates the SDK to the latest development version, keeping the previous one as a backup
    Update,
    /// Restores the backed up version of the SDK
    Restore,
    /// Shows which SDK repositories are installed
    Status,
    /// Checks that git is installed and working
    Check,
}
