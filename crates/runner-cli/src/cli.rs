//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use runner_config::DEFAULT_CONFIG_PATH;

/// gitlab-multi-group-runner assigns specific GitLab runners to a given set
/// of projects and groups.
#[derive(Parser, Debug)]
#[command(name = "gitlab-multi-group-runner")]
#[command(long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Run with all config repositories in the given config file
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Print debug messages
    #[arg(long)]
    pub debug: bool,

    /// Custom configuration file path
    #[arg(short = 'f', long = "config-file", default_value = DEFAULT_CONFIG_PATH)]
    pub config_file: PathBuf,

    /// Only show what would be executed
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print an example configuration to stdout and exit
    #[arg(long, conflicts_with = "print_example_repo_config")]
    pub print_example_config: bool,

    /// Print an example configuration for a multi group runner config
    /// repository to stdout and exit
    #[arg(long)]
    pub print_example_repo_config: bool,

    /// Print the version number and exit
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// Path of the multi group runner config repository in GitLab, for
    /// example "myusername/myconfigrepo"
    pub config_repository_path: Option<String>,
}
