//! Shared test utilities for the gitlab-multi-group-runner workspace.
//!
//! - [`gitlab`]: [`FakeGitlab`], an in-memory [`runner_gitlab::GitlabApi`]
//!   that records every call
//! - [`config`]: builders for grants and repository configuration documents

pub mod config;
pub mod gitlab;

pub use config::{grant, grant_with_members, repo_config_yaml};
pub use gitlab::{Call, FakeGitlab};
