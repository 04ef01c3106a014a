//! The GitLab operations needed to assign runners

use crate::error::{Error, Result};
use crate::types::{AccessLevel, Group, Ident, Member, Project, Runner, User};

/// Remote capabilities used by the assignment engine.
///
/// Lookups by identifier fail with the matching `NoMatching*` error when
/// GitLab does not know the resource (or hides it from the token). List
/// operations always return every page.
pub trait GitlabApi {
    fn get_project(&self, project: &Ident) -> Result<Project>;

    fn get_group(&self, group: &Ident) -> Result<Group>;

    /// Projects directly contained in a group, with full project attributes.
    fn get_group_projects(&self, group: &Ident) -> Result<Vec<Project>>;

    /// Look up a runner without checking its type.
    fn fetch_runner(&self, runner_id: u64) -> Result<Runner>;

    /// Users are looked up by username when given a path.
    fn get_user(&self, user: &Ident) -> Result<User>;

    /// Members (including inherited ones) with at least `minimum_role`.
    fn get_project_members(&self, project: &Project, minimum_role: AccessLevel)
    -> Result<Vec<Member>>;

    /// Members (including inherited ones) with at least `minimum_role`.
    fn get_group_members(&self, group: &Group, minimum_role: AccessLevel) -> Result<Vec<Member>>;

    /// Raw content of `file_path` at `branch`, or `None` if there is no such file.
    fn get_project_file(
        &self,
        project: &Project,
        file_path: &str,
        branch: &str,
    ) -> Result<Option<Vec<u8>>>;

    /// Runners currently enabled in a project.
    fn list_project_runners(&self, project: &Project) -> Result<Vec<Runner>>;

    fn enable_runner(&self, runner: &Runner, project: &Project) -> Result<()>;

    fn set_shared_runners_enabled(&self, project: &Project, enabled: bool) -> Result<()>;

    /// Look up a runner, optionally requiring it to be a specific runner.
    fn get_runner(&self, runner_id: u64, require_specific: bool) -> Result<Runner> {
        let runner = self.fetch_runner(runner_id)?;
        if require_specific && !runner.is_specific() {
            return Err(Error::NotASpecificRunner { id: runner_id });
        }
        Ok(runner)
    }
}
