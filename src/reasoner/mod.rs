//! Reasoning substrate: the black box that turns a worker, its task and the
//! accumulated context into the unit's text output, calling tools as needed.

mod chat;
mod prompt;

pub use chat::{ChatConfig, ChatReasoner};
pub use prompt::{system_prompt, task_prompt};

use async_trait::async_trait;

use crate::error::PlanResult;
use crate::pipeline::{RunContext, WorkUnit};
use crate::tools::ToolBelt;
use crate::workers::Worker;

/// Everything the substrate needs to carry out one unit.
pub struct TaskRequest<'a> {
    pub worker: &'a Worker,
    pub unit: &'a WorkUnit,
    pub context: &'a RunContext,
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Produce the unit's raw output. Tool calls go through `tools`, which
    /// only exposes the worker's own capabilities.
    async fn perform(&self, request: TaskRequest<'_>, tools: &ToolBelt<'_>) -> PlanResult<String>;
}
