//! In-memory GitLab.
//!
//! [`FakeGitlab`] keeps projects, groups, runners, users and repository
//! files in memory and answers [`GitlabApi`] calls the way GitLab would,
//! including the `NoMatching*` errors. Every call is recorded so tests can
//! assert on what the engine asked for and, above all, what it changed.
//!
//! Builder methods panic on references to unknown IDs.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use runner_gitlab::{
    AccessLevel, Error, GitlabApi, Group, Ident, Member, Project, Result, Runner, RunnerType,
    User,
};

/// A recorded [`GitlabApi`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProject(Ident),
    GetGroup(Ident),
    GetGroupProjects(Ident),
    GetRunner(u64),
    GetUser(Ident),
    GetProjectMembers(u64),
    GetGroupMembers(u64),
    GetProjectFile {
        project_id: u64,
        path: String,
        branch: String,
    },
    ListProjectRunners(u64),
    EnableRunner {
        runner_id: u64,
        project_id: u64,
    },
    SetSharedRunnersEnabled {
        project_id: u64,
        enabled: bool,
    },
}

impl Call {
    /// Whether the call changes state on the GitLab side.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::EnableRunner { .. } | Call::SetSharedRunnersEnabled { .. }
        )
    }
}

struct FakeProject {
    project: Project,
    members: Vec<Member>,
    runners: BTreeSet<u64>,
}

struct FakeGroup {
    group: Group,
    projects: Vec<u64>,
    members: Vec<Member>,
}

#[derive(Default)]
struct State {
    projects: BTreeMap<u64, FakeProject>,
    groups: BTreeMap<u64, FakeGroup>,
    runners: BTreeMap<u64, Runner>,
    users: BTreeMap<u64, User>,
    /// Keyed by (project id, branch, file path).
    files: HashMap<(u64, String, String), Vec<u8>>,
    /// Projects whose shared runners update answers with a server error.
    failing_updates: BTreeSet<u64>,
}

impl State {
    fn project_id(&self, ident: &Ident) -> Option<u64> {
        match ident {
            Ident::Id(id) => self.projects.contains_key(id).then_some(*id),
            Ident::Path(path) => self
                .projects
                .values()
                .find(|p| &p.project.path_with_namespace == path)
                .map(|p| p.project.id),
        }
    }

    fn group_id(&self, ident: &Ident) -> Option<u64> {
        match ident {
            Ident::Id(id) => self.groups.contains_key(id).then_some(*id),
            Ident::Path(path) => self
                .groups
                .values()
                .find(|g| &g.group.full_path == path)
                .map(|g| g.group.id),
        }
    }

    fn member(&self, user_id: u64, access_level: AccessLevel) -> Member {
        let username = self
            .users
            .get(&user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| format!("user-{}", user_id));
        Member {
            id: user_id,
            username,
            access_level,
        }
    }
}

/// In-memory [`GitlabApi`] implementation.
#[derive(Default)]
pub struct FakeGitlab {
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
}

impl FakeGitlab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, id: u64, path: &str, shared_runners_enabled: bool) -> Self {
        self.state.borrow_mut().projects.insert(
            id,
            FakeProject {
                project: Project {
                    id,
                    path_with_namespace: path.to_string(),
                    shared_runners_enabled,
                },
                members: Vec::new(),
                runners: BTreeSet::new(),
            },
        );
        self
    }

    /// Add a group containing already added projects.
    pub fn with_group(self, id: u64, full_path: &str, project_ids: &[u64]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            for project_id in project_ids {
                assert!(
                    state.projects.contains_key(project_id),
                    "with_group: unknown project {project_id}"
                );
            }
            state.groups.insert(
                id,
                FakeGroup {
                    group: Group {
                        id,
                        full_path: full_path.to_string(),
                    },
                    projects: project_ids.to_vec(),
                    members: Vec::new(),
                },
            );
        }
        self
    }

    /// Add a runner described as `runner-{id}` and tagged `docker`.
    pub fn with_runner(self, id: u64, runner_type: RunnerType) -> Self {
        self.state.borrow_mut().runners.insert(
            id,
            Runner {
                id,
                description: Some(format!("runner-{}", id)),
                tag_list: vec!["docker".to_string()],
                runner_type,
            },
        );
        self
    }

    pub fn with_user(self, id: u64, username: &str) -> Self {
        self.state.borrow_mut().users.insert(
            id,
            User {
                id,
                username: username.to_string(),
            },
        );
        self
    }

    pub fn with_project_member(self, project_id: u64, user_id: u64, level: AccessLevel) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let member = state.member(user_id, level);
            state
                .projects
                .get_mut(&project_id)
                .unwrap_or_else(|| panic!("with_project_member: unknown project {project_id}"))
                .members
                .push(member);
        }
        self
    }

    pub fn with_group_member(self, group_id: u64, user_id: u64, level: AccessLevel) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let member = state.member(user_id, level);
            state
                .groups
                .get_mut(&group_id)
                .unwrap_or_else(|| panic!("with_group_member: unknown group {group_id}"))
                .members
                .push(member);
        }
        self
    }

    pub fn with_enabled_runner(self, project_id: u64, runner_id: u64) -> Self {
        self.state
            .borrow_mut()
            .projects
            .get_mut(&project_id)
            .unwrap_or_else(|| panic!("with_enabled_runner: unknown project {project_id}"))
            .runners
            .insert(runner_id);
        self
    }

    pub fn with_file(self, project_id: u64, branch: &str, path: &str, content: &str) -> Self {
        self.state.borrow_mut().files.insert(
            (project_id, branch.to_string(), path.to_string()),
            content.as_bytes().to_vec(),
        );
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Calls that changed state, in order.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn runner_enabled(&self, project_id: u64, runner_id: u64) -> bool {
        self.state
            .borrow()
            .projects
            .get(&project_id)
            .is_some_and(|p| p.runners.contains(&runner_id))
    }

    pub fn shared_runners_enabled(&self, project_id: u64) -> bool {
        self.state
            .borrow()
            .projects
            .get(&project_id)
            .is_some_and(|p| p.project.shared_runners_enabled)
    }

    /// Make the shared runners update of a project fail with a 500, or
    /// succeed again.
    pub fn fail_shared_runners_update(&self, project_id: u64, fail: bool) {
        let mut state = self.state.borrow_mut();
        if fail {
            state.failing_updates.insert(project_id);
        } else {
            state.failing_updates.remove(&project_id);
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GitlabApi for FakeGitlab {
    fn get_project(&self, project: &Ident) -> Result<Project> {
        self.record(Call::GetProject(project.clone()));
        let state = self.state.borrow();
        state
            .project_id(project)
            .map(|id| state.projects[&id].project.clone())
            .ok_or_else(|| Error::NoMatchingProject {
                ident: project.clone(),
            })
    }

    fn get_group(&self, group: &Ident) -> Result<Group> {
        self.record(Call::GetGroup(group.clone()));
        let state = self.state.borrow();
        state
            .group_id(group)
            .map(|id| state.groups[&id].group.clone())
            .ok_or_else(|| Error::NoMatchingGroup {
                ident: group.clone(),
            })
    }

    fn get_group_projects(&self, group: &Ident) -> Result<Vec<Project>> {
        self.record(Call::GetGroupProjects(group.clone()));
        let state = self.state.borrow();
        let id = state.group_id(group).ok_or_else(|| Error::NoMatchingGroup {
            ident: group.clone(),
        })?;
        Ok(state.groups[&id]
            .projects
            .iter()
            .map(|project_id| state.projects[project_id].project.clone())
            .collect())
    }

    fn fetch_runner(&self, runner_id: u64) -> Result<Runner> {
        self.record(Call::GetRunner(runner_id));
        self.state
            .borrow()
            .runners
            .get(&runner_id)
            .cloned()
            .ok_or(Error::NoMatchingRunner { id: runner_id })
    }

    fn get_user(&self, user: &Ident) -> Result<User> {
        self.record(Call::GetUser(user.clone()));
        let state = self.state.borrow();
        let found = match user {
            Ident::Id(id) => state.users.get(id),
            Ident::Path(username) => state.users.values().find(|u| &u.username == username),
        };
        found.cloned().ok_or_else(|| Error::NoMatchingUser {
            ident: user.clone(),
        })
    }

    fn get_project_members(
        &self,
        project: &Project,
        minimum_role: AccessLevel,
    ) -> Result<Vec<Member>> {
        self.record(Call::GetProjectMembers(project.id));
        let state = self.state.borrow();
        let fake = state
            .projects
            .get(&project.id)
            .ok_or_else(|| Error::NoMatchingProject {
                ident: Ident::Id(project.id),
            })?;
        Ok(fake
            .members
            .iter()
            .filter(|m| m.access_level >= minimum_role)
            .cloned()
            .collect())
    }

    fn get_group_members(&self, group: &Group, minimum_role: AccessLevel) -> Result<Vec<Member>> {
        self.record(Call::GetGroupMembers(group.id));
        let state = self.state.borrow();
        let fake = state
            .groups
            .get(&group.id)
            .ok_or_else(|| Error::NoMatchingGroup {
                ident: Ident::Id(group.id),
            })?;
        Ok(fake
            .members
            .iter()
            .filter(|m| m.access_level >= minimum_role)
            .cloned()
            .collect())
    }

    fn get_project_file(
        &self,
        project: &Project,
        file_path: &str,
        branch: &str,
    ) -> Result<Option<Vec<u8>>> {
        self.record(Call::GetProjectFile {
            project_id: project.id,
            path: file_path.to_string(),
            branch: branch.to_string(),
        });
        Ok(self
            .state
            .borrow()
            .files
            .get(&(project.id, branch.to_string(), file_path.to_string()))
            .cloned())
    }

    fn list_project_runners(&self, project: &Project) -> Result<Vec<Runner>> {
        self.record(Call::ListProjectRunners(project.id));
        let state = self.state.borrow();
        let fake = state
            .projects
            .get(&project.id)
            .ok_or_else(|| Error::NoMatchingProject {
                ident: Ident::Id(project.id),
            })?;
        Ok(fake
            .runners
            .iter()
            .map(|id| {
                state.runners.get(id).cloned().unwrap_or(Runner {
                    id: *id,
                    description: None,
                    tag_list: Vec::new(),
                    runner_type: RunnerType::ProjectType,
                })
            })
            .collect())
    }

    fn enable_runner(&self, runner: &Runner, project: &Project) -> Result<()> {
        self.record(Call::EnableRunner {
            runner_id: runner.id,
            project_id: project.id,
        });
        let mut state = self.state.borrow_mut();
        let fake = state
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| Error::NoMatchingProject {
                ident: Ident::Id(project.id),
            })?;
        fake.runners.insert(runner.id);
        Ok(())
    }

    fn set_shared_runners_enabled(&self, project: &Project, enabled: bool) -> Result<()> {
        self.record(Call::SetSharedRunnersEnabled {
            project_id: project.id,
            enabled,
        });
        let mut state = self.state.borrow_mut();
        if state.failing_updates.contains(&project.id) {
            return Err(Error::Api {
                status: 500,
                url: format!("projects/{}", project.id),
                message: "update failed".to_string(),
            });
        }
        let fake = state
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| Error::NoMatchingProject {
                ident: Ident::Id(project.id),
            })?;
        fake.project.shared_runners_enabled = enabled;
        Ok(())
    }
}
