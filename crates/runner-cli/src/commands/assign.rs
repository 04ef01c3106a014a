//! Runner assignment command
//!
//! Selects the grants to process and drives one [`AssignmentEngine`] over
//! them.

use colored::Colorize;
use tracing::error;

use runner_config::{AdminConfig, GeneralConfig, RunnerGrant};
use runner_core::{AssignOptions, AssignmentEngine, AssignmentReport};
use runner_gitlab::GitlabApi;

use crate::error::{CliError, Result};

/// Grants chosen on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `--all`: every grant, in file order
    All,
    /// The grant of one config repository
    Repository(String),
}

impl Selection {
    /// `--all` wins over a positional config repository path.
    pub fn from_args(all: bool, config_repository_path: Option<String>) -> Result<Self> {
        match (all, config_repository_path) {
            (true, _) => Ok(Selection::All),
            (false, Some(path)) => Ok(Selection::Repository(path)),
            (false, None) => Err(CliError::user(
                "Please pass a config repository as first positional parameter or use the `--all` option. \
                 Run with `--help` for more details.",
            )),
        }
    }

    /// Look up the selected grants.
    pub fn grants<'c>(&self, config: &'c AdminConfig) -> Result<Vec<&'c RunnerGrant>> {
        match self {
            Selection::All => Ok(config.runners.iter().collect()),
            Selection::Repository(path) => config
                .find_grant(path)
                .map(|grant| vec![grant])
                .ok_or_else(|| CliError::NoMatchingGrant { path: path.clone() }),
        }
    }
}

/// Assign the runners of the selected grants.
///
/// For a single repository the first fatal error is returned as is. With
/// `--all` every grant is attempted and the run fails afterwards with the
/// exit code of the first failed grant.
pub fn run_assign<G: GitlabApi + ?Sized>(
    api: &G,
    general: &GeneralConfig,
    selection: &Selection,
    grants: &[&RunnerGrant],
    options: AssignOptions,
) -> Result<Vec<AssignmentReport>> {
    let mut engine = AssignmentEngine::new(api, general, options);
    let mut reports = Vec::with_capacity(grants.len());
    let mut first_exit_code = None;
    let mut failed = 0;

    for grant in grants {
        match engine.assign(grant) {
            Ok(report) => {
                print_summary(&report);
                reports.push(report);
            }
            Err(e) if *selection == Selection::All => {
                let e = CliError::from(e);
                error!("{}", e);
                failed += 1;
                first_exit_code.get_or_insert(e.exit_code());
            }
            Err(e) => return Err(e.into()),
        }
    }

    match first_exit_code {
        Some(exit_code) => Err(CliError::GrantsFailed {
            failed,
            total: grants.len(),
            exit_code,
        }),
        None => Ok(reports),
    }
}

fn print_summary(report: &AssignmentReport) {
    let label = if report.dry_run {
        "DRY-RUN".yellow().bold()
    } else {
        "OK".green().bold()
    };
    println!(
        "{} {}: {} change(s), {} skipped",
        label,
        report.config_repo.cyan(),
        report.changes(),
        report.skipped.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runner_config::REPO_CONFIG_FILENAME;
    use runner_gitlab::RunnerType;
    use runner_test_utils::{FakeGitlab, grant, repo_config_yaml};

    fn admin_config(grants: Vec<RunnerGrant>) -> AdminConfig {
        let mut config = AdminConfig::example();
        config.runners = grants;
        config
    }

    /// Config repositories `admin/a` (valid) and `admin/b` (no config file).
    fn gitlab() -> FakeGitlab {
        FakeGitlab::new()
            .with_project(1, "admin/a", true)
            .with_project(2, "admin/b", true)
            .with_project(10, "g/r1", true)
            .with_runner(5, RunnerType::ProjectType)
            .with_file(
                1,
                "main",
                REPO_CONFIG_FILENAME,
                &repo_config_yaml(&[(&[5], &["g/r1"])]),
            )
    }

    #[test]
    fn test_selection_requires_path_or_all() {
        let error = Selection::from_args(false, None).unwrap_err();
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().contains("`--all`"));
    }

    #[test]
    fn test_all_wins_over_path() {
        assert_eq!(
            Selection::from_args(true, Some("admin/a".to_string())).unwrap(),
            Selection::All
        );
    }

    #[test]
    fn test_unknown_repository_has_no_grant() {
        let config = admin_config(vec![grant(&[5], "admin/a", "main")]);
        let error = Selection::Repository("admin/x".to_string())
            .grants(&config)
            .unwrap_err();
        assert_eq!(error.exit_code(), 4);
    }

    #[test]
    fn test_single_repository_failure_keeps_its_exit_code() {
        let api = gitlab();
        let config = admin_config(vec![grant(&[5], "admin/b", "main")]);
        let selection = Selection::Repository("admin/b".to_string());
        let grants = selection.grants(&config).unwrap();

        let error = run_assign(
            &api,
            &config.general,
            &selection,
            &grants,
            AssignOptions::default(),
        )
        .unwrap_err();

        assert_eq!(error.exit_code(), 5);
    }

    #[test]
    fn test_all_attempts_every_grant() {
        let api = gitlab();
        let config = admin_config(vec![
            grant(&[5], "admin/b", "main"),
            grant(&[5], "admin/a", "main"),
        ]);
        let grants = Selection::All.grants(&config).unwrap();

        let error = run_assign(
            &api,
            &config.general,
            &Selection::All,
            &grants,
            AssignOptions::default(),
        )
        .unwrap_err();

        assert!(api.runner_enabled(10, 5));
        assert_eq!(error.exit_code(), 5);
        assert!(matches!(
            error,
            CliError::GrantsFailed {
                failed: 1,
                total: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_all_succeeds_with_one_report_per_grant() {
        let api = gitlab();
        let config = admin_config(vec![grant(&[5], "admin/a", "main")]);
        let grants = Selection::All.grants(&config).unwrap();

        let reports = run_assign(
            &api,
            &config.general,
            &Selection::All,
            &grants,
            AssignOptions { dry_run: true },
        )
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].dry_run);
        assert!(api.mutations().is_empty());
    }
}
