//! gitlab-multi-group-runner CLI
//!
//! Assigns specific GitLab runners to the projects and groups requested by
//! multi group runner config repositories.

mod cli;
mod commands;
mod error;
mod logging;

use std::path::Path;
use std::process;

use clap::Parser;
use colored::Colorize;

use runner_config::AdminConfig;
use runner_core::AssignOptions;
use runner_gitlab::Gitlab;

use cli::Cli;
use commands::{Example, Selection};
use error::{CliError, Result};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help goes to stdout and is not a failure
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.debug)
        .map_err(|e| CliError::user(format!("Could not set up logging: {}", e)))?;

    if cli.version {
        println!("{}, version {}", program_name(), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if cli.print_example_config {
        return commands::run_print_example(Example::Admin);
    }
    if cli.print_example_repo_config {
        return commands::run_print_example(Example::Repo);
    }

    let config = AdminConfig::load(&cli.config_file)?;
    let selection = Selection::from_args(cli.all, cli.config_repository_path)?;
    let grants = selection.grants(&config)?;

    let api = Gitlab::new(&config.gitlab.url, config.gitlab.auth_token.as_str())?;
    let options = AssignOptions {
        dry_run: cli.dry_run,
    };
    commands::run_assign(&api, &config.general, &selection, &grants, options)?;

    Ok(())
}

/// Name the binary was invoked as.
fn program_name() -> String {
    let arg0 = std::env::args().next();
    arg0.as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| env!("CARGO_BIN_NAME").to_string())
}
