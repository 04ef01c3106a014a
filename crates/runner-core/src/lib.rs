//! Runner assignment for gitlab-multi-group-runner
//!
//! This crate reconciles the runner assignments requested by a configuration
//! repository with the state of the GitLab instance:
//!
//! - **Resolution**: turn `groups_and_projects` entries into projects and
//!   `one_member_of` entries into users or groups ([`resolve`])
//! - **Policy**: keep runners inside the grant's allow-list and the
//!   projects inside the grant's rules ([`ProjectRules`])
//! - **Convergence**: enable the runner and disable shared runners where
//!   needed, or only report it in dry-run mode ([`AssignmentEngine`])
//!
//! # Architecture
//!
//! ```text
//!                 runner-cli
//!                     |
//!                runner-core
//!                /         \
//!     runner-config    runner-gitlab
//! ```

pub mod engine;
pub mod error;
pub mod report;
pub mod resolve;

pub use engine::{AssignOptions, AssignmentEngine};
pub use error::{Error, Result};
pub use report::{Action, AssignmentReport, Skip};
pub use resolve::{MemberRef, ProjectRules, Target, resolve_member, resolve_target};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_no_config_file_names_repository_and_branch() {
        let error = Error::NoConfigFile {
            file: "multi-group-runner-config.yml".to_string(),
            repo: "admin/runners".to_string(),
            branch: "main".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Could not find a config file \"multi-group-runner-config.yml\" in the repository \"admin/runners\", branch \"main\"."
        );
    }
}
