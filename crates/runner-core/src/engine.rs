//! AssignmentEngine implementation
//!
//! The AssignmentEngine reconciles the runner assignments requested by a
//! configuration repository with the projects on the GitLab instance.

use std::collections::HashSet;

use runner_config::{GeneralConfig, REPO_CONFIG_FILENAME, RepoRunnerConfig, RunnerGrant};
use runner_gitlab::{Error as GitlabError, GitlabApi, Ident, Project, Runner};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::report::{Action, AssignmentReport, Skip};
use crate::resolve::{ProjectRules, Target, resolve_target};

/// Options for assignment runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignOptions {
    /// If true, log the changes that would be made without making them.
    pub dry_run: bool,
}

/// Engine for assigning multi group runners
///
/// One engine is meant to process every grant of a run. Projects whose
/// shared runners were already handled are remembered across grants, so
/// each project is touched at most once.
pub struct AssignmentEngine<'a, G: GitlabApi + ?Sized> {
    api: &'a G,
    general: &'a GeneralConfig,
    options: AssignOptions,
    /// Project IDs whose shared runners setting was already handled
    shared_runners_handled: HashSet<u64>,
}

impl<'a, G: GitlabApi + ?Sized> AssignmentEngine<'a, G> {
    pub fn new(api: &'a G, general: &'a GeneralConfig, options: AssignOptions) -> Self {
        Self {
            api,
            general,
            options,
            shared_runners_handled: HashSet::new(),
        }
    }

    /// Apply the runner configuration of a grant's configuration repository.
    ///
    /// Runners outside the grant, inaccessible runners, unresolvable targets
    /// and projects rejected by the grant's rules are skipped with a warning
    /// and recorded in the report.
    ///
    /// # Errors
    ///
    /// Fails if the configuration repository or its runner configuration
    /// cannot be loaded, or on any GitLab error that is not a lookup miss.
    pub fn assign(&mut self, grant: &RunnerGrant) -> Result<AssignmentReport> {
        let repo = &grant.config_repo;
        info!(
            "Processing the config repository \"{}\" (branch \"{}\")",
            repo.path, repo.branch
        );

        let mut report = AssignmentReport::new(repo.path.as_str(), self.options.dry_run);
        let config = self.load_repo_config(grant)?;
        let rules = ProjectRules::resolve(self.api, &grant.allowed_projects_rules, &mut report)?;

        for (runner_id, targets) in config.assignments() {
            if !grant.allows(runner_id) {
                warn!(
                    "The runner with id `{}` is not allowed to be assigned to other projects, skipping.",
                    runner_id
                );
                report.skipped.push(Skip::RunnerNotAllowed { runner_id });
                continue;
            }

            let runner = match self.api.get_runner(runner_id, true) {
                Ok(runner) => runner,
                Err(GitlabError::NoMatchingRunner { .. }) => {
                    warn!("The runner with id `{}` is not accessible, skipping.", runner_id);
                    report.skipped.push(Skip::RunnerInaccessible { runner_id });
                    continue;
                }
                Err(GitlabError::NotASpecificRunner { .. }) => {
                    warn!("The runner with id `{}` is not a specific runner, skipping.", runner_id);
                    report.skipped.push(Skip::NotASpecificRunner { runner_id });
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            for target in targets {
                let projects = match resolve_target(self.api, target)? {
                    Target::Unresolved => {
                        warn!(
                            "\"{}\" is neither an accessible group nor project, skipping.",
                            target
                        );
                        report.skipped.push(Skip::UnresolvedTarget {
                            target: target.clone(),
                        });
                        continue;
                    }
                    Target::Group { group, projects } => {
                        debug!(
                            "Assigning runner `{}` to the {} project(s) of the group \"{}\"",
                            runner_id,
                            projects.len(),
                            group
                        );
                        projects
                    }
                    Target::Project(project) => vec![project],
                };

                for project in projects {
                    if !rules.allows(self.api, &project)? {
                        warn!(
                            "It is not allowed to assign the runner with id `{}` to the project \"{}\", skipping.",
                            runner_id, project.path_with_namespace
                        );
                        report.skipped.push(Skip::ProjectNotAllowed {
                            runner_id,
                            project: project.path_with_namespace.clone(),
                        });
                        continue;
                    }
                    self.converge(&runner, &project, &mut report)?;
                }
            }
        }

        debug!(
            "Finished the config repository \"{}\": {} change(s), {} skipped",
            repo.path,
            report.changes(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn load_repo_config(&self, grant: &RunnerGrant) -> Result<RepoRunnerConfig> {
        let repo = &grant.config_repo;
        let project = self.api.get_project(&Ident::from(repo.path.as_str()))?;

        let content = self
            .api
            .get_project_file(&project, REPO_CONFIG_FILENAME, &repo.branch)?
            .ok_or_else(|| Error::NoConfigFile {
                file: REPO_CONFIG_FILENAME.to_string(),
                repo: repo.path.clone(),
                branch: repo.branch.clone(),
            })?;

        Ok(RepoRunnerConfig::parse(&String::from_utf8_lossy(&content))?)
    }

    /// Bring one eligible project to the desired state for `runner`.
    fn converge(
        &mut self,
        runner: &Runner,
        project: &Project,
        report: &mut AssignmentReport,
    ) -> Result<()> {
        let path = &project.path_with_namespace;
        let dry_run = self.options.dry_run;

        if self.general.disable_shared_runners && !self.shared_runners_handled.contains(&project.id)
        {
            if project.shared_runners_enabled {
                if dry_run {
                    info!("Would disable shared runners in project \"{}\"", path);
                } else {
                    info!("Disable shared runners in project \"{}\"", path);
                    self.api.set_shared_runners_enabled(project, false)?;
                }
                report.actions.push(Action::SharedRunnersDisabled {
                    project: path.clone(),
                });
            } else {
                info!("Shared runners are already disabled in project \"{}\"", path);
                report.actions.push(Action::SharedRunnersAlreadyDisabled {
                    project: path.clone(),
                });
            }
            // Marked only once the update went through
            self.shared_runners_handled.insert(project.id);
        }

        let enabled = self.api.list_project_runners(project)?;
        if enabled.iter().any(|r| r.id == runner.id) {
            info!("Runner {} is already enabled in project \"{}\"", runner, path);
            report.actions.push(Action::RunnerAlreadyEnabled {
                runner_id: runner.id,
                project: path.clone(),
            });
        } else {
            if dry_run {
                info!("Would enable runner {} in project \"{}\"", runner, path);
            } else {
                info!("Enable runner {} in project \"{}\"", runner, path);
                self.api.enable_runner(runner, project)?;
            }
            report.actions.push(Action::RunnerEnabled {
                runner_id: runner.id,
                project: path.clone(),
            });
        }

        Ok(())
    }
}
