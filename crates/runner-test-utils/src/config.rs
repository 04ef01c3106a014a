//! Configuration fixtures.

use runner_config::{AllowedProjectsRules, ConfigRepo, RunnerGrant};

/// A grant without project restrictions.
pub fn grant(ids: &[u64], repo_path: &str, branch: &str) -> RunnerGrant {
    RunnerGrant {
        ids: ids.to_vec(),
        config_repo: ConfigRepo {
            path: repo_path.to_string(),
            branch: branch.to_string(),
        },
        allowed_projects_rules: AllowedProjectsRules::default(),
    }
}

/// A grant restricted by a `one_member_of` rule.
pub fn grant_with_members(
    ids: &[u64],
    repo_path: &str,
    branch: &str,
    one_member_of: &[&str],
) -> RunnerGrant {
    RunnerGrant {
        allowed_projects_rules: AllowedProjectsRules {
            one_member_of: Some(one_member_of.iter().map(|s| s.to_string()).collect()),
        },
        ..grant(ids, repo_path, branch)
    }
}

/// Render a `multi-group-runner-config.yml` document.
///
/// Each entry pairs runner IDs with the groups/projects they target.
pub fn repo_config_yaml(entries: &[(&[u64], &[&str])]) -> String {
    let mut yaml = String::from("runners:\n");
    for (ids, targets) in entries {
        let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
        let targets: Vec<String> = targets.iter().map(|t| format!("\"{}\"", t)).collect();
        yaml.push_str(&format!("  - ids: [{}]\n", ids.join(", ")));
        yaml.push_str(&format!(
            "    groups_and_projects: [{}]\n",
            targets.join(", ")
        ));
    }
    yaml
}
