//! Resolution of names from the configuration into GitLab resources
//!
//! Two lookups with a fixed order are needed:
//!
//! - `one_member_of` entries are tried as a username first, then as a group
//! - `groups_and_projects` entries are tried as a group first, then as a project
//!
//! Lookup misses are part of the result; any other GitLab error is returned.

use std::collections::BTreeSet;

use runner_config::AllowedProjectsRules;
use runner_gitlab::{AccessLevel, Error as GitlabError, GitlabApi, Group, Ident, Project, User};
use tracing::{debug, warn};

use crate::error::Result;
use crate::report::{AssignmentReport, Skip};

/// A `one_member_of` entry resolved to a user or a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    User(User),
    Group(Group),
}

/// A `groups_and_projects` entry resolved to the projects it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Group { group: String, projects: Vec<Project> },
    Project(Project),
    Unresolved,
}

/// Look up `name` as a username, then as a group path.
///
/// Returns `Ok(None)` when it is neither.
pub fn resolve_member<G: GitlabApi + ?Sized>(api: &G, name: &str) -> Result<Option<MemberRef>> {
    let ident = Ident::from(name);

    match api.get_user(&ident) {
        Ok(user) => {
            debug!("Identified \"{}\" as GitLab user", name);
            return Ok(Some(MemberRef::User(user)));
        }
        Err(GitlabError::NoMatchingUser { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    match api.get_group(&ident) {
        Ok(group) => {
            debug!("Identified \"{}\" as GitLab group", name);
            Ok(Some(MemberRef::Group(group)))
        }
        Err(GitlabError::NoMatchingGroup { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Look up `target` as a group (all its projects), then as a project.
pub fn resolve_target<G: GitlabApi + ?Sized>(api: &G, target: &str) -> Result<Target> {
    let ident = Ident::from(target);

    match api.get_group_projects(&ident) {
        Ok(projects) => {
            debug!("\"{}\" is a group with {} project(s)", target, projects.len());
            return Ok(Target::Group {
                group: target.to_string(),
                projects,
            });
        }
        Err(GitlabError::NoMatchingGroup { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    match api.get_project(&ident) {
        Ok(project) => Ok(Target::Project(project)),
        Err(GitlabError::NoMatchingProject { .. }) => Ok(Target::Unresolved),
        Err(e) => Err(e.into()),
    }
}

/// The `one_member_of` rule with its users and groups resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRule {
    /// Entries that resolved, for diagnostics
    pub names: Vec<String>,
    /// User IDs of the resolved users and of the maintainers of the
    /// resolved groups
    pub member_ids: BTreeSet<u64>,
}

impl MemberRule {
    fn resolve<G: GitlabApi + ?Sized>(
        api: &G,
        names: &[String],
        report: &mut AssignmentReport,
    ) -> Result<Self> {
        let mut rule = MemberRule {
            names: Vec::new(),
            member_ids: BTreeSet::new(),
        };

        for name in names {
            match resolve_member(api, name)? {
                Some(MemberRef::User(user)) => {
                    rule.member_ids.insert(user.id);
                }
                Some(MemberRef::Group(group)) => {
                    let members = api.get_group_members(&group, AccessLevel::MAINTAINER)?;
                    rule.member_ids.extend(members.iter().map(|m| m.id));
                }
                None => {
                    warn!("\"{}\" is neither a valid GitLab group nor user, skipping.", name);
                    report.skipped.push(Skip::UnresolvedMember { name: name.clone() });
                    continue;
                }
            }
            rule.names.push(name.clone());
        }

        Ok(rule)
    }

    /// Whether one of the rule's members maintains `project`.
    fn admits<G: GitlabApi + ?Sized>(&self, api: &G, project: &Project) -> Result<bool> {
        let maintainers = api.get_project_members(project, AccessLevel::MAINTAINER)?;
        let shared: Vec<&str> = maintainers
            .iter()
            .filter(|m| self.member_ids.contains(&m.id))
            .map(|m| m.username.as_str())
            .collect();

        if shared.is_empty() {
            debug!(
                "None of {:?} is a maintainer of the project \"{}\"",
                self.names, project.path_with_namespace
            );
            Ok(false)
        } else {
            debug!(
                "The users {:?} are maintainers of the project \"{}\"",
                shared, project.path_with_namespace
            );
            Ok(true)
        }
    }
}

/// A grant's `allowed_projects_rules`, resolved once per grant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectRules {
    pub one_member_of: Option<MemberRule>,
}

impl ProjectRules {
    /// Resolve the rules of a grant. Unresolvable entries are reported and
    /// dropped from the rule.
    pub fn resolve<G: GitlabApi + ?Sized>(
        api: &G,
        rules: &AllowedProjectsRules,
        report: &mut AssignmentReport,
    ) -> Result<Self> {
        let one_member_of = match &rules.one_member_of {
            Some(names) => Some(MemberRule::resolve(api, names, report)?),
            None => None,
        };
        Ok(Self { one_member_of })
    }

    /// Whether runners may be assigned to `project`.
    pub fn allows<G: GitlabApi + ?Sized>(&self, api: &G, project: &Project) -> Result<bool> {
        if let Some(rule) = &self.one_member_of
            && !rule.admits(api, project)?
        {
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runner_test_utils::{Call, FakeGitlab};

    fn fake() -> FakeGitlab {
        FakeGitlab::new()
            .with_user(1, "alice")
            .with_user(2, "bob")
            .with_project(10, "team/app", true)
            .with_project(11, "team/lib", true)
            .with_project(20, "alice/tool", false)
            .with_group(100, "team", &[10, 11])
            .with_group_member(100, 2, AccessLevel::OWNER)
            .with_group_member(100, 1, AccessLevel::DEVELOPER)
            .with_project_member(10, 2, AccessLevel::MAINTAINER)
            .with_project_member(20, 1, AccessLevel::MAINTAINER)
    }

    #[test]
    fn test_member_prefers_user_over_group() {
        let api = fake().with_user(3, "team");
        let resolved = resolve_member(&api, "team").unwrap();
        assert!(matches!(resolved, Some(MemberRef::User(User { id: 3, .. }))));
        assert!(!api.calls().contains(&Call::GetGroup(Ident::from("team"))));
    }

    #[test]
    fn test_member_falls_back_to_group() {
        let api = fake();
        let resolved = resolve_member(&api, "team").unwrap();
        assert!(matches!(resolved, Some(MemberRef::Group(Group { id: 100, .. }))));
    }

    #[test]
    fn test_member_unresolved() {
        assert_eq!(resolve_member(&fake(), "nobody").unwrap(), None);
    }

    #[test]
    fn test_target_prefers_group_over_project() {
        let api = fake().with_project(30, "team", true);
        match resolve_target(&api, "team").unwrap() {
            Target::Group { group, projects } => {
                assert_eq!(group, "team");
                let ids: Vec<u64> = projects.iter().map(|p| p.id).collect();
                assert_eq!(ids, vec![10, 11]);
            }
            other => panic!("expected a group, got {:?}", other),
        }
        assert!(!api.calls().contains(&Call::GetProject(Ident::from("team"))));
    }

    #[test]
    fn test_target_falls_back_to_project() {
        match resolve_target(&fake(), "alice/tool").unwrap() {
            Target::Project(project) => assert_eq!(project.id, 20),
            other => panic!("expected a project, got {:?}", other),
        }
    }

    #[test]
    fn test_target_unresolved() {
        assert_eq!(resolve_target(&fake(), "missing/neither").unwrap(), Target::Unresolved);
    }

    #[test]
    fn test_group_rule_uses_only_maintainers() {
        let api = fake();
        let mut report = AssignmentReport::new("cfg", false);
        let rules = ProjectRules::resolve(
            &api,
            &AllowedProjectsRules {
                one_member_of: Some(vec!["team".to_string()]),
            },
            &mut report,
        )
        .unwrap();

        let rule = rules.one_member_of.as_ref().unwrap();
        assert_eq!(rule.member_ids, BTreeSet::from([2]));

        let app = api.get_project(&Ident::Id(10)).unwrap();
        let tool = api.get_project(&Ident::Id(20)).unwrap();
        assert!(rules.allows(&api, &app).unwrap());
        assert!(!rules.allows(&api, &tool).unwrap());
    }

    #[test]
    fn test_unresolved_members_are_reported() {
        let api = fake();
        let mut report = AssignmentReport::new("cfg", false);
        let rules = ProjectRules::resolve(
            &api,
            &AllowedProjectsRules {
                one_member_of: Some(vec!["ghost".to_string(), "alice".to_string()]),
            },
            &mut report,
        )
        .unwrap();

        assert_eq!(
            report.skipped,
            vec![Skip::UnresolvedMember {
                name: "ghost".to_string()
            }]
        );
        assert_eq!(rules.one_member_of.unwrap().names, vec!["alice".to_string()]);
    }

    #[test]
    fn test_no_rules_allow_everything() {
        let api = fake();
        let rules = ProjectRules::default();
        let project = api.get_project(&Ident::Id(11)).unwrap();
        assert!(rules.allows(&api, &project).unwrap());
    }

    #[test]
    fn test_empty_member_list_rejects_everything() {
        let api = fake();
        let mut report = AssignmentReport::new("cfg", false);
        let rules = ProjectRules::resolve(
            &api,
            &AllowedProjectsRules {
                one_member_of: Some(Vec::new()),
            },
            &mut report,
        )
        .unwrap();
        let project = api.get_project(&Ident::Id(10)).unwrap();
        assert!(!rules.allows(&api, &project).unwrap());
    }
}
