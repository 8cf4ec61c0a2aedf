use crate::sheet::RowStore;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle of one pipeline: `Idle -> Running -> (Completed | Cancelled | Failed) -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Completed => write!(f, "completed"),
            RunState::Cancelled => write!(f, "cancelled"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub remote_calls: usize,
}

/// What a finished worker hands back: the store it owned plus how the run ended.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub state: RunState,
    pub store: RowStore,
    pub output: PathBuf,
    pub counts: RunCounts,
    /// Rows handled before the run stopped, skipped rows included.
    pub rows_processed: usize,
    pub error: Option<String>,
}
