//! Error taxonomy for trip planning.
//!
//! Every failure in the core is one of these kinds and reaches the caller
//! unchanged; nothing is recovered locally.

use std::fmt;

use crate::types::UnitId;

/// Errors that can occur while planning a trip.
#[derive(Debug, Clone)]
pub enum PlanError {
    /// Malformed or missing caller input (user message or tool arguments).
    Validation(String),

    /// The external search provider failed, timed out, or returned garbage.
    Provider(String),

    /// The terminal unit's output does not satisfy the travel-plan contract.
    SchemaValidation(String),

    /// A unit failed (or the pipeline definition is unusable), so the
    /// downstream units never ran.
    Pipeline {
        unit: Option<UnitId>,
        reason: String,
    },

    /// The reasoning substrate could not produce an answer.
    Reasoning(String),

    /// Invalid startup configuration.
    Config(String),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Provider(msg) => write!(f, "Provider error: {}", msg),
            Self::SchemaValidation(msg) => write!(f, "Schema validation error: {}", msg),
            Self::Pipeline {
                unit: Some(unit),
                reason,
            } => write!(f, "Pipeline error in unit `{}`: {}", unit, reason),
            Self::Pipeline { unit: None, reason } => write!(f, "Pipeline error: {}", reason),
            Self::Reasoning(msg) => write!(f, "Reasoning error: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PlanError {}

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Provider(_) => "provider",
            Self::SchemaValidation(_) => "schema_validation",
            Self::Pipeline { .. } => "pipeline",
            Self::Reasoning(_) => "reasoning",
            Self::Config(_) => "config",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaValidation(msg.into())
    }

    pub fn pipeline(unit: Option<UnitId>, reason: impl Into<String>) -> Self {
        Self::Pipeline {
            unit,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for PlanError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors may echo the request URL; strip it so query
        // credentials never leak into messages.
        Self::Provider(err.without_url().to_string())
    }
}
