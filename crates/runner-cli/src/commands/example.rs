//! `--print-example-config` and `--print-example-repo-config`

use std::io::{self, IsTerminal};

use colored::Colorize;
use runner_config::{AdminConfig, RepoRunnerConfig};

use crate::error::Result;

/// Which example document to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Example {
    /// The local admin configuration
    Admin,
    /// `multi-group-runner-config.yml` of a config repository
    Repo,
}

/// Render an example document as YAML.
pub fn render_example(example: Example) -> Result<String> {
    let yaml = match example {
        Example::Admin => AdminConfig::example().to_yaml()?,
        Example::Repo => RepoRunnerConfig::example().to_yaml()?,
    };
    Ok(yaml)
}

/// Print an example document to stdout, with highlighted keys on a terminal.
pub fn run_print_example(example: Example) -> Result<()> {
    let yaml = render_example(example)?;
    if io::stdout().is_terminal() {
        print!("{}", highlight_keys(&yaml));
    } else {
        print!("{}", yaml);
    }
    Ok(())
}

/// Color the mapping keys of a block-style YAML document.
fn highlight_keys(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    for line in yaml.lines() {
        let body = line.trim_start_matches([' ', '-']);
        let (indent, body) = line.split_at(line.len() - body.len());
        match body.split_once(':') {
            Some((key, rest)) if !key.is_empty() && !key.contains(' ') => {
                out.push_str(&format!("{}{}:{}", indent, key.cyan(), rest));
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}
