//! Error types for runner-gitlab

use crate::types::Ident;

/// Result type for GitLab operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`GitlabApi`](crate::GitlabApi) implementations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The project {ident} is not accessible.")]
    NoMatchingProject { ident: Ident },

    #[error("The group {ident} is not accessible.")]
    NoMatchingGroup { ident: Ident },

    #[error("The runner with id \"{id}\" is not accessible.")]
    NoMatchingRunner { id: u64 },

    #[error("The user {ident} is not accessible.")]
    NoMatchingUser { ident: Ident },

    #[error("The runner with id \"{id}\" is not a specific / project type runner.")]
    NotASpecificRunner { id: u64 },

    /// GitLab answered with an unexpected status.
    #[error("GitLab request to {url} failed with status {status}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether GitLab refused to reveal the requested resource.
    ///
    /// GitLab answers 404 for missing resources and 403 for resources the
    /// token may not see; both mean "no such thing" to the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status == 404 || *status == 403)
    }

    /// Replace a not-found API error with a domain specific one.
    pub(crate) fn or_missing(self, missing: impl FnOnce() -> Error) -> Error {
        if self.is_not_found() { missing() } else { self }
    }
}
