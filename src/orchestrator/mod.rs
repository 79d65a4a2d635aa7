//! The orchestrator: entry point that turns one traveller message into a
//! rendered travel plan by running the crew's pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::CrewConfig;
use crate::error::{PlanError, PlanResult};
use crate::model::TravelPlan;
use crate::pipeline::{Pipeline, PipelineOptions, RunContext, UnitRunner, WorkUnit};
use crate::reasoner::{Reasoner, TaskRequest};
use crate::tools::ToolRegistry;
use crate::workers::WorkerRegistry;

const ENVELOPE_TITLE: &str = "✈️ Your Personalized Travel Plan";

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDelivery {
    pub run_id: Uuid,
    pub plan: TravelPlan,
    /// The plan wrapped in its presentation envelope.
    pub rendered: String,
}

/// Wrap a plan in the titled presentation envelope.
pub fn render_envelope(plan: &TravelPlan) -> PlanResult<String> {
    let body = serde_json::to_string_pretty(plan)
        .map_err(|e| PlanError::pipeline(None, format!("failed to render plan: {}", e)))?;
    Ok(format!(
        "<div class=\"travel-plan\">\n<h2>{}</h2>\n{}\n</div>",
        ENVELOPE_TITLE, body
    ))
}

pub struct Orchestrator {
    tools: ToolRegistry,
    workers: WorkerRegistry,
    pipeline: Pipeline,
    reasoner: Arc<dyn Reasoner>,
}

impl Orchestrator {
    /// Build workers and the pipeline from the crew definition.
    pub fn new(
        crew: &CrewConfig,
        tools: ToolRegistry,
        reasoner: Arc<dyn Reasoner>,
        options: PipelineOptions,
    ) -> PlanResult<Self> {
        let workers = WorkerRegistry::from_config(&crew.workers, &tools)?;
        if workers.is_empty() {
            return Err(PlanError::Config("crew defines no workers".to_string()));
        }
        let pipeline = Pipeline::from_config(&crew.tasks, &workers, options)?;
        info!(
            workers = workers.len(),
            units = pipeline.units().len(),
            tools = tools.len(),
            parallel_research = options.parallel_independent,
            "orchestrator ready"
        );
        Ok(Self {
            tools,
            workers,
            pipeline,
            reasoner,
        })
    }

    /// Plan a trip for `message`. An empty message is rejected before any
    /// unit runs.
    pub async fn plan_trip(&self, message: &str, timestamp: &str) -> PlanResult<PlanDelivery> {
        let mut ctx = RunContext::new(message, timestamp)?;
        let run_id = ctx.run_id();
        info!(%run_id, message_len = message.len(), "planning trip");

        let plan = match self.pipeline.run(&mut ctx, self).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(%run_id, kind = err.kind(), "trip planning failed");
                return Err(err);
            }
        };
        let rendered = render_envelope(&plan)?;
        info!(%run_id, days = plan.day_plans.len(), "trip planned");

        Ok(PlanDelivery {
            run_id,
            plan,
            rendered,
        })
    }

    /// Plan a trip and return only the rendered envelope.
    pub async fn run(&self, message: &str, timestamp: &str) -> PlanResult<String> {
        Ok(self.plan_trip(message, timestamp).await?.rendered)
    }
}

#[async_trait]
impl UnitRunner for Orchestrator {
    async fn run_unit(&self, unit: &WorkUnit, ctx: &RunContext) -> PlanResult<String> {
        let worker = self.workers.get(unit.worker.as_str()).ok_or_else(|| {
            PlanError::pipeline(
                Some(unit.id.clone()),
                format!("worker `{}` is not registered", unit.worker),
            )
        })?;
        let belt = worker.tool_belt(&self.tools);
        self.reasoner
            .perform(
                TaskRequest {
                    worker: &worker,
                    unit,
                    context: ctx,
                },
                &belt,
            )
            .await
    }
}
