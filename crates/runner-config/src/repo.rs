//! Runner configuration stored in a configuration repository

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{Field, Schema};

/// File name looked up at the root of a configuration repository.
pub const REPO_CONFIG_FILENAME: &str = "multi-group-runner-config.yml";

const RUNNER_TARGETS_FIELDS: &[Field] = &[
    Field {
        name: "ids",
        required: true,
        schema: Schema::List(&Schema::Integer),
    },
    Field {
        name: "groups_and_projects",
        required: true,
        schema: Schema::List(&Schema::String),
    },
];

/// Schema of `multi-group-runner-config.yml`.
pub const REPO_SCHEMA: Schema = Schema::Dict(&[Field {
    name: "runners",
    required: true,
    schema: Schema::List(&Schema::Dict(RUNNER_TARGETS_FIELDS)),
}]);

/// Desired runner assignments requested by a configuration repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRunnerConfig {
    pub runners: Vec<RunnerTargets>,
}

/// Runners and the groups/projects they should be enabled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerTargets {
    pub ids: Vec<u64>,
    /// Group paths or project paths, e.g. `mygroup` or `myuser/myproject`.
    pub groups_and_projects: Vec<String>,
}

impl RepoRunnerConfig {
    /// Validate a fetched repository configuration.
    ///
    /// The document has no local origin, so validation errors carry no path.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(REPO_SCHEMA.parse_document(content, None)?)
    }

    /// Every `(runner_id, targets)` pair in document order.
    pub fn assignments(&self) -> impl Iterator<Item = (u64, &[String])> + '_ {
        self.runners.iter().flat_map(|entry| {
            entry
                .ids
                .iter()
                .map(move |&id| (id, entry.groups_and_projects.as_slice()))
        })
    }

    /// The documented example configuration.
    pub fn example() -> Self {
        Self {
            runners: vec![RunnerTargets {
                ids: vec![5, 9],
                groups_and_projects: vec![
                    "mygroup".to_string(),
                    "myusername/myproject".to_string(),
                ],
            }],
        }
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assignments_flatten_ids() {
        let config = RepoRunnerConfig::parse(
            r#"
runners:
  - ids: [5, 9]
    groups_and_projects: [a, b/c]
  - ids: [7]
    groups_and_projects: [d]
"#,
        )
        .unwrap();

        let pairs: Vec<(u64, Vec<&str>)> = config
            .assignments()
            .map(|(id, targets)| (id, targets.iter().map(String::as_str).collect()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                (5, vec!["a", "b/c"]),
                (9, vec!["a", "b/c"]),
                (7, vec!["d"]),
            ]
        );
    }

    #[test]
    fn test_example_round_trips() {
        let example = RepoRunnerConfig::example();
        let yaml = example.to_yaml().unwrap();
        assert_eq!(RepoRunnerConfig::parse(&yaml).unwrap(), example);
    }
}
