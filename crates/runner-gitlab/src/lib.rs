//! GitLab access for gitlab-multi-group-runner.
//!
//! The [`GitlabApi`] trait is the only view of GitLab the assignment engine
//! has. [`Gitlab`] implements it against the REST v4 API with a blocking
//! HTTP client; tests substitute an in-memory implementation.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::GitlabApi;
pub use client::Gitlab;
pub use error::{Error, Result};
pub use types::{AccessLevel, Group, Ident, Member, Project, Runner, RunnerType, User};
