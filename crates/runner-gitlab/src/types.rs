//! GitLab resources as seen by the runner assignment

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric ID or full path of a GitLab resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ident {
    Id(u64),
    Path(String),
}

impl Ident {
    /// The identifier as a single URL path segment (`group/sub` becomes
    /// `group%2Fsub`).
    pub fn as_segment(&self) -> String {
        match self {
            Ident::Id(id) => id.to_string(),
            Ident::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl From<u64> for Ident {
    fn from(id: u64) -> Self {
        Ident::Id(id)
    }
}

impl From<&str> for Ident {
    fn from(path: &str) -> Self {
        Ident::Path(path.to_string())
    }
}

impl From<String> for Ident {
    fn from(path: String) -> Self {
        Ident::Path(path)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Id(id) => write!(f, "with id \"{}\"", id),
            Ident::Path(path) => write!(f, "\"{}\"", path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub shared_runners_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub full_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

/// Scope of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerType {
    /// Shared with every project of the instance.
    InstanceType,
    GroupType,
    /// Specific runner, enabled per project.
    ProjectType,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub runner_type: RunnerType,
}

impl Runner {
    /// Only specific runners can be enabled in individual projects.
    pub fn is_specific(&self) -> bool {
        self.runner_type == RunnerType::ProjectType
    }
}

impl fmt::Display for Runner {
    /// `"description", (id: `5`, tags: ["a", "b"])`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\", (id: `{}`, tags: [{}])",
            self.description.as_deref().unwrap_or_default(),
            self.id,
            self.tag_list
                .iter()
                .map(|tag| format!("\"{}\"", tag))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// GitLab role of a project or group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(pub u32);

impl AccessLevel {
    pub const GUEST: AccessLevel = AccessLevel(10);
    pub const REPORTER: AccessLevel = AccessLevel(20);
    pub const DEVELOPER: AccessLevel = AccessLevel(30);
    pub const MAINTAINER: AccessLevel = AccessLevel(40);
    pub const OWNER: AccessLevel = AccessLevel(50);
}

/// Project or group membership, including inherited ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// User ID of the member.
    pub id: u64,
    pub username: String,
    pub access_level: AccessLevel,
}
