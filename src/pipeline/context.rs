//! Per-request run context.
//!
//! Holds the user's request and an append-only log of completed unit
//! outputs. Every unit sees all outputs recorded before it started.

use uuid::Uuid;

use crate::error::{PlanError, PlanResult};
use crate::types::UnitId;

#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutput {
    pub unit: UnitId,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Uuid,
    message: String,
    timestamp: String,
    outputs: Vec<UnitOutput>,
}

impl RunContext {
    /// Start a run. An empty message is rejected before any work begins.
    pub fn new(message: &str, timestamp: &str) -> PlanResult<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PlanError::validation("No message provided"));
        }
        Ok(Self {
            run_id: Uuid::new_v4(),
            message: message.to_string(),
            timestamp: timestamp.to_string(),
            outputs: Vec::new(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Completed outputs, in completion order.
    pub fn outputs(&self) -> &[UnitOutput] {
        &self.outputs
    }

    pub fn output_of(&self, unit: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.unit.as_str() == unit)
            .map(|o| o.output.as_str())
    }

    pub fn has_completed(&self, unit: &str) -> bool {
        self.output_of(unit).is_some()
    }

    /// Append a completed unit's output. A unit is recorded at most once.
    pub(crate) fn record(&mut self, unit: UnitId, output: String) -> PlanResult<()> {
        if self.has_completed(unit.as_str()) {
            return Err(PlanError::pipeline(
                Some(unit),
                "unit output already recorded",
            ));
        }
        self.outputs.push(UnitOutput { unit, output });
        Ok(())
    }

    /// Fill `{message}` and `{timestamp}` placeholders of a task text.
    pub fn interpolate(&self, template: &str) -> String {
        template
            .replace("{message}", &self.message)
            .replace("{timestamp}", &self.timestamp)
    }
}
