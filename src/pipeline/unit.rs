use std::fmt;

use crate::config::OutputSchema;
use crate::types::{UnitId, WorkerId};

/// One named piece of work bound to a worker.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub id: UnitId,
    pub worker: WorkerId,
    pub prerequisites: Vec<UnitId>,
    pub description: String,
    pub expected_output: String,
    /// Only the terminal unit carries a schema.
    pub output_schema: Option<OutputSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
