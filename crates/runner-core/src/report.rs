//! Outcome of processing one grant

/// A decision taken for an eligible project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SharedRunnersDisabled { project: String },
    SharedRunnersAlreadyDisabled { project: String },
    RunnerEnabled { runner_id: u64, project: String },
    RunnerAlreadyEnabled { runner_id: u64, project: String },
}

impl Action {
    /// Whether the action changes the project (or would, in dry-run mode).
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Action::SharedRunnersDisabled { .. } | Action::RunnerEnabled { .. }
        )
    }
}

/// A unit of work that was skipped with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// The runner is not in the grant's allow-list.
    RunnerNotAllowed { runner_id: u64 },
    RunnerInaccessible { runner_id: u64 },
    NotASpecificRunner { runner_id: u64 },
    /// Neither a group nor a project.
    UnresolvedTarget { target: String },
    /// The project does not satisfy the grant's rules.
    ProjectNotAllowed { runner_id: u64, project: String },
    /// A `one_member_of` entry is neither a user nor a group.
    UnresolvedMember { name: String },
}

/// Report from assigning the runners of one grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Path of the configuration repository
    pub config_repo: String,
    /// Whether changes were only logged
    pub dry_run: bool,
    /// Decisions in processing order
    pub actions: Vec<Action>,
    /// Skipped units in processing order
    pub skipped: Vec<Skip>,
}

impl AssignmentReport {
    pub fn new(config_repo: impl Into<String>, dry_run: bool) -> Self {
        Self {
            config_repo: config_repo.into(),
            dry_run,
            actions: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Number of changes made (or planned, in dry-run mode)
    pub fn changes(&self) -> usize {
        self.actions.iter().filter(|a| a.is_change()).count()
    }
}
