//! Configuration schemas for gitlab-multi-group-runner.
//!
//! Two YAML documents drive the tool:
//!
//! - the local admin configuration ([`AdminConfig`]), which names the GitLab
//!   instance and grants runner IDs to configuration repositories
//! - the per-repository runner configuration ([`RepoRunnerConfig`]), fetched
//!   from `multi-group-runner-config.yml` inside a configuration repository
//!
//! Both are checked against a declarative [`schema::Schema`] before they are
//! turned into typed values, so a malformed document is rejected as a whole
//! with every offending field listed.

pub mod admin;
pub mod error;
pub mod repo;
pub mod schema;

pub use admin::{
    AdminConfig, AllowedProjectsRules, ConfigRepo, DEFAULT_CONFIG_PATH, GeneralConfig,
    GitlabConfig, RunnerGrant,
};
pub use error::{Error, FieldError, Result, ValidationError};
pub use repo::{REPO_CONFIG_FILENAME, RepoRunnerConfig, RunnerTargets};
pub use schema::{Field, Schema};
