//! Local admin configuration
//!
//! The admin configuration is read once at startup (by default from
//! [`DEFAULT_CONFIG_PATH`]) and handed to the assignment engine explicitly.
//!
//! ```yaml
//! general:
//!   disable_shared_runners: true
//! gitlab:
//!   url: https://mygitlab.com
//!   auth_token: xxxxxxxxxxxxxxxxxxxx
//! runners:
//!   - ids: [1, 3]
//!     config_repo:
//!       path: administration/my-multi-group-runners
//!       branch: master
//!     allowed_projects_rules:
//!       one_member_of: [my-group-name, my-user-name]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{Field, Schema};

/// Location of the admin configuration when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gitlab_multi_group_runnerrc.yml";

const GENERAL_FIELDS: &[Field] = &[Field {
    name: "disable_shared_runners",
    required: false,
    schema: Schema::Boolean,
}];

const GITLAB_FIELDS: &[Field] = &[
    Field {
        name: "url",
        required: true,
        schema: Schema::String,
    },
    Field {
        name: "auth_token",
        required: true,
        schema: Schema::String,
    },
];

const CONFIG_REPO_FIELDS: &[Field] = &[
    Field {
        name: "path",
        required: true,
        schema: Schema::String,
    },
    Field {
        name: "branch",
        required: true,
        schema: Schema::String,
    },
];

const ALLOWED_PROJECTS_RULES_FIELDS: &[Field] = &[Field {
    name: "one_member_of",
    required: false,
    schema: Schema::List(&Schema::String),
}];

const GRANT_FIELDS: &[Field] = &[
    Field {
        name: "ids",
        required: true,
        schema: Schema::List(&Schema::Integer),
    },
    Field {
        name: "config_repo",
        required: true,
        schema: Schema::Dict(CONFIG_REPO_FIELDS),
    },
    Field {
        name: "allowed_projects_rules",
        required: true,
        schema: Schema::Dict(ALLOWED_PROJECTS_RULES_FIELDS),
    },
];

/// Schema of the admin configuration file.
pub const ADMIN_SCHEMA: Schema = Schema::Dict(&[
    Field {
        name: "general",
        required: false,
        schema: Schema::Dict(GENERAL_FIELDS),
    },
    Field {
        name: "gitlab",
        required: true,
        schema: Schema::Dict(GITLAB_FIELDS),
    },
    Field {
        name: "runners",
        required: true,
        schema: Schema::List(&Schema::Dict(GRANT_FIELDS)),
    },
]);

/// Validated admin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    pub gitlab: GitlabConfig,
    pub runners: Vec<RunnerGrant>,
}

/// Policy applied to every grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Turn off shared runners in every project a runner gets assigned to.
    #[serde(default = "default_disable_shared_runners")]
    pub disable_shared_runners: bool,
}

fn default_disable_shared_runners() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            disable_shared_runners: default_disable_shared_runners(),
        }
    }
}

/// Connection settings for the GitLab instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitlabConfig {
    pub url: String,
    pub auth_token: String,
}

/// Authorizes a set of runners to be reassigned by one configuration repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerGrant {
    /// Runner IDs the configuration repository may assign. Any other ID
    /// requested by the repository is ignored.
    pub ids: Vec<u64>,
    pub config_repo: ConfigRepo,
    pub allowed_projects_rules: AllowedProjectsRules,
}

impl RunnerGrant {
    /// Whether the configuration repository may assign `runner_id`.
    pub fn allows(&self, runner_id: u64) -> bool {
        self.ids.contains(&runner_id)
    }
}

/// Repository (and branch) holding a `multi-group-runner-config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRepo {
    pub path: String,
    pub branch: String,
}

/// Restrictions on the projects a grant may assign runners to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllowedProjectsRules {
    /// Users or groups; at least one of their maintainers must also be a
    /// maintainer of the target project. `None` disables the rule, while an
    /// empty list rejects every project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_member_of: Option<Vec<String>>,
}

impl AdminConfig {
    /// Validate and normalize an admin configuration document.
    ///
    /// `origin` is only used for diagnostics.
    pub fn from_yaml_str(content: &str, origin: Option<&Path>) -> Result<Self> {
        Ok(ADMIN_SCHEMA.parse_document(content, origin)?)
    }

    /// Load the admin configuration from `path`.
    ///
    /// A leading `~` is expanded to the home directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let resolved = expand_home(path);
        tracing::debug!("Loading admin configuration from {}", resolved.display());
        let content = fs::read_to_string(&resolved).map_err(|e| Error::io(&resolved, e))?;
        Self::from_yaml_str(&content, Some(path))
    }

    /// Find the grant belonging to a configuration repository.
    pub fn find_grant(&self, repo_path: &str) -> Option<&RunnerGrant> {
        self.runners
            .iter()
            .find(|grant| grant.config_repo.path == repo_path)
    }

    /// The documented example configuration.
    pub fn example() -> Self {
        Self {
            general: GeneralConfig {
                disable_shared_runners: true,
            },
            gitlab: GitlabConfig {
                url: "https://mygitlab.com".to_string(),
                auth_token: "xxxxxxxxxxxxxxxxxxxx".to_string(),
            },
            runners: vec![RunnerGrant {
                ids: vec![1, 3],
                config_repo: ConfigRepo {
                    path: "administration/my-multi-group-runners".to_string(),
                    branch: "master".to_string(),
                },
                allowed_projects_rules: AllowedProjectsRules {
                    one_member_of: Some(vec![
                        "my-group-name".to_string(),
                        "my-user-name".to_string(),
                    ]),
                },
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

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_defaults_to_disabling_shared_runners() {
        assert!(GeneralConfig::default().disable_shared_runners);
    }

    #[test]
    fn test_grant_allows_only_listed_ids() {
        let grant = AdminConfig::example().runners.remove(0);
        assert!(grant.allows(1));
        assert!(grant.allows(3));
        assert!(!grant.allows(2));
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(
            expand_home(Path::new("/etc/runnerrc.yml")),
            PathBuf::from("/etc/runnerrc.yml")
        );
    }

    #[test]
    fn test_expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/runnerrc.yml")),
                home.join("runnerrc.yml")
            );
        }
    }
}
