//! Task pipeline: dependency-ordered execution of work units.
//!
//! Units run in declaration order. A unit starts only when every prerequisite
//! has completed; its output is appended to the run context before the next
//! unit starts. The first failure stops the pipeline. The terminal unit's
//! output is coerced into a `TravelPlan`.

mod context;
mod schema;
mod unit;

pub use context::{RunContext, UnitOutput};
pub use schema::{coerce_travel_plan, validate_travel_plan};
pub use unit::{PipelineState, UnitState, WorkUnit};

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::config::{OutputSchema, TaskConfig};
use crate::error::{PlanError, PlanResult};
use crate::model::TravelPlan;
use crate::types::{UnitId, WorkerId};
use crate::workers::WorkerRegistry;

/// Executes a single unit against the context accumulated so far.
#[async_trait]
pub trait UnitRunner: Send + Sync {
    async fn run_unit(&self, unit: &WorkUnit, ctx: &RunContext) -> PlanResult<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Run units whose prerequisites are all met concurrently.
    pub parallel_independent: bool,
    /// Reject plans whose total cost disagrees with referenced prices.
    pub strict_cost_check: bool,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    units: Vec<WorkUnit>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Build the pipeline from task definitions.
    ///
    /// Prerequisites must name earlier units, so declaration order is always
    /// a valid execution order and cycles cannot be expressed. Exactly the
    /// last unit carries an output schema.
    pub fn from_config(
        tasks: &[TaskConfig],
        workers: &WorkerRegistry,
        options: PipelineOptions,
    ) -> PlanResult<Self> {
        if tasks.is_empty() {
            return Err(PlanError::Config("crew defines no tasks".to_string()));
        }

        let mut seen: HashSet<UnitId> = HashSet::new();
        let mut units = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let id = UnitId::new(task.id.trim());
            if id.as_str().is_empty() {
                return Err(PlanError::Config("task id must not be empty".to_string()));
            }
            if seen.contains(&id) {
                return Err(PlanError::Config(format!("duplicate task `{}`", id)));
            }
            if !workers.contains(&task.worker) {
                return Err(PlanError::Config(format!(
                    "task `{}` is assigned to unknown worker `{}`",
                    id, task.worker
                )));
            }

            let mut prerequisites = Vec::with_capacity(task.depends_on.len());
            for dep in &task.depends_on {
                if !seen.contains(dep.as_str()) {
                    return Err(PlanError::Config(format!(
                        "task `{}` depends on `{}`, which is not declared before it",
                        id, dep
                    )));
                }
                prerequisites.push(UnitId::new(dep.as_str()));
            }

            let is_last = index + 1 == tasks.len();
            match (is_last, task.output_schema) {
                (true, None) => {
                    return Err(PlanError::Config(format!(
                        "terminal task `{}` must declare an output schema",
                        id
                    )));
                }
                (false, Some(_)) => {
                    return Err(PlanError::Config(format!(
                        "only the terminal task may declare an output schema (found on `{}`)",
                        id
                    )));
                }
                _ => {}
            }

            seen.insert(id.clone());
            units.push(WorkUnit {
                id,
                worker: WorkerId::new(task.worker.as_str()),
                prerequisites,
                description: task.description.clone(),
                expected_output: task.expected_output.clone(),
                output_schema: task.output_schema,
            });
        }

        Ok(Self { units, options })
    }

    pub fn units(&self) -> &[WorkUnit] {
        &self.units
    }

    fn is_ready(unit: &WorkUnit, ctx: &RunContext) -> bool {
        unit.prerequisites
            .iter()
            .all(|p| ctx.has_completed(p.as_str()))
    }

    /// Execute every unit and return the validated travel plan.
    pub async fn run(&self, ctx: &mut RunContext, runner: &dyn UnitRunner) -> PlanResult<TravelPlan> {
        let mut states = vec![UnitState::Pending; self.units.len()];
        let mut state = PipelineState::Pending;
        debug!(run_id = %ctx.run_id(), %state, "pipeline created");
        state = PipelineState::Running;
        info!(run_id = %ctx.run_id(), units = self.units.len(), %state, "pipeline started");

        while let Some(first) = states.iter().position(|s| *s == UnitState::Pending) {
            // Units whose prerequisites are all met. Sequential mode takes
            // only the first one.
            let view: &RunContext = ctx;
            let mut batch: Vec<usize> = (first..self.units.len())
                .filter(|&i| states[i] == UnitState::Pending && Self::is_ready(&self.units[i], view))
                .collect();
            if !self.options.parallel_independent {
                batch.truncate(1);
            }
            if batch.is_empty() {
                state = PipelineState::Failed;
                error!(run_id = %ctx.run_id(), %state, "no runnable unit");
                return Err(PlanError::pipeline(
                    Some(self.units[first].id.clone()),
                    "prerequisites never completed",
                ));
            }

            for &i in &batch {
                states[i] = UnitState::Running;
                info!(
                    run_id = %ctx.run_id(),
                    unit = %self.units[i].id,
                    worker = %self.units[i].worker,
                    "unit started"
                );
            }

            let shared: &RunContext = ctx;
            let results = join_all(
                batch
                    .iter()
                    .map(|&i| runner.run_unit(&self.units[i], shared)),
            )
            .await;

            for (&i, result) in batch.iter().zip(results) {
                let unit = &self.units[i];
                match result {
                    Ok(output) => {
                        states[i] = UnitState::Completed;
                        debug!(unit = %unit.id, output_len = output.len(), "unit output");
                        ctx.record(unit.id.clone(), output)?;
                        info!(run_id = %ctx.run_id(), unit = %unit.id, state = %states[i], "unit finished");
                    }
                    Err(err) => {
                        states[i] = UnitState::Failed;
                        state = PipelineState::Failed;
                        error!(
                            run_id = %ctx.run_id(),
                            unit = %unit.id,
                            kind = err.kind(),
                            %state,
                            "unit failed: {}",
                            err
                        );
                        return Err(err);
                    }
                }
            }
        }

        let terminal = self
            .units
            .last()
            .ok_or_else(|| PlanError::pipeline(None, "pipeline has no units"))?;
        let raw = ctx.output_of(terminal.id.as_str()).ok_or_else(|| {
            PlanError::pipeline(Some(terminal.id.clone()), "terminal unit produced no output")
        })?;

        let plan = match terminal.output_schema {
            Some(OutputSchema::TravelPlan) => coerce_travel_plan(raw, self.options.strict_cost_check),
            None => Err(PlanError::pipeline(
                Some(terminal.id.clone()),
                "terminal unit has no output schema",
            )),
        };

        state = match plan {
            Ok(_) => PipelineState::Completed,
            Err(_) => PipelineState::Failed,
        };
        info!(run_id = %ctx.run_id(), %state, "pipeline finished");
        plan
    }
}
