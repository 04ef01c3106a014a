//! Error types for runner-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the process
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from runner-config (the admin configuration)
    #[error(transparent)]
    Config(#[from] runner_config::Error),

    /// Error from runner-core
    #[error(transparent)]
    Core(#[from] runner_core::Error),

    /// Error from runner-gitlab
    #[error(transparent)]
    Gitlab(#[from] runner_gitlab::Error),

    /// The admin configuration has no grant for the requested repository
    #[error(
        "Could not find a matching configuration entry for the configuration repository \"{path}\"."
    )]
    NoMatchingGrant { path: String },

    /// Some grants failed in `--all` mode
    #[error("{failed} of {total} config repositories could not be processed.")]
    GrantsFailed {
        failed: usize,
        total: usize,
        /// Exit code of the first failure
        exit_code: i32,
    },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(e) | CliError::Core(runner_core::Error::Config(e)) => match e {
                runner_config::Error::Validation(_) => 3,
                _ => 1,
            },
            CliError::NoMatchingGrant { .. } => 4,
            CliError::Core(runner_core::Error::NoConfigFile { .. }) => 5,
            CliError::Gitlab(e) | CliError::Core(runner_core::Error::Gitlab(e)) => match e {
                runner_gitlab::Error::NoMatchingProject { .. } => 6,
                runner_gitlab::Error::NoMatchingGroup { .. } => 7,
                runner_gitlab::Error::NoMatchingRunner { .. } => 8,
                _ => 1,
            },
            CliError::GrantsFailed { exit_code, .. } => *exit_code,
            CliError::User { .. } => 1,
        }
    }
}
