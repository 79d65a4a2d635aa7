//! Worker registry.
//!
//! Workers are built once at startup from the crew definition. Each holds a
//! fixed capability set and may never hand work to another worker.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::WorkerConfig;
use crate::error::{PlanError, PlanResult};
use crate::tools::{ToolBelt, ToolRegistry};
use crate::types::{ToolId, WorkerId};

/// A named role bound to its tools.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<ToolId>,
}

impl Worker {
    /// Delegation is statically disabled for every worker.
    pub fn allows_delegation(&self) -> bool {
        false
    }

    /// The view of `registry` this worker is allowed to use.
    pub fn tool_belt<'a>(&'a self, registry: &'a ToolRegistry) -> ToolBelt<'a> {
        ToolBelt::new(registry, &self.tools)
    }
}

/// Process-wide, read-only table of workers.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<WorkerId, Arc<Worker>>,
    order: Vec<WorkerId>,
}

impl WorkerRegistry {
    /// Build the registry, checking every bound tool exists.
    pub fn from_config(configs: &[WorkerConfig], tools: &ToolRegistry) -> PlanResult<Self> {
        let mut registry = Self::default();

        for cfg in configs {
            let id = WorkerId::new(cfg.id.trim());
            if id.as_str().is_empty() {
                return Err(PlanError::Config("worker id must not be empty".to_string()));
            }
            if registry.workers.contains_key(&id) {
                return Err(PlanError::Config(format!("duplicate worker `{}`", id)));
            }
            if cfg.allow_delegation {
                return Err(PlanError::Config(format!(
                    "worker `{}` enables delegation, which is not supported",
                    id
                )));
            }

            let mut bound = Vec::with_capacity(cfg.tools.len());
            for tool in &cfg.tools {
                if !tools.contains(tool) {
                    return Err(PlanError::Config(format!(
                        "worker `{}` is bound to unknown tool `{}`",
                        id, tool
                    )));
                }
                let tool = ToolId::new(tool.as_str());
                if !bound.contains(&tool) {
                    bound.push(tool);
                }
            }

            info!(worker = %id, tools = ?bound, "registered worker");
            registry.order.push(id.clone());
            registry.workers.insert(
                id.clone(),
                Arc::new(Worker {
                    id,
                    role: cfg.role.clone(),
                    goal: cfg.goal.clone(),
                    backstory: cfg.backstory.clone(),
                    tools: bound,
                }),
            );
        }

        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Worker>> {
        self.workers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.workers.contains_key(id)
    }

    /// Workers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Worker>> {
        self.order.iter().filter_map(|id| self.workers.get(id))
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
