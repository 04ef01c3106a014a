//! Error types for runner-core

/// Result type for runner-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions that abort the processing of a grant
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration repository has no runner configuration on the branch
    #[error("Could not find a config file \"{file}\" in the repository \"{repo}\", branch \"{branch}\".")]
    NoConfigFile {
        file: String,
        repo: String,
        branch: String,
    },

    /// Invalid runner configuration in the configuration repository
    #[error(transparent)]
    Config(#[from] runner_config::Error),

    /// GitLab error that is not a recoverable lookup miss
    #[error(transparent)]
    Gitlab(#[from] runner_gitlab::Error),
}
