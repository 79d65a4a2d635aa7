// Core modules
pub mod api;
pub mod config;
mod error;
pub mod model;
mod orchestrator;
pub mod pipeline;
pub mod reasoner;
pub mod tools;
mod types;
mod workers;

// Re-export key types and functions
pub use config::{CrewConfig, load_crew_config};
pub use error::{PlanError, PlanResult};
pub use model::{DayPlan, FlightOption, FlightQuery, HotelOption, HotelQuery, TravelPlan};
pub use orchestrator::{Orchestrator, PlanDelivery, render_envelope};
pub use pipeline::PipelineOptions;
pub use reasoner::{ChatConfig, ChatReasoner, Reasoner};
pub use tools::{ProviderConfig, SearchProvider, SerpApiProvider, ToolRegistry};
pub use types::{ToolId, UnitId, WorkerId};
pub use workers::{Worker, WorkerRegistry};

use std::sync::Arc;

/// Convenience function to create a fully wired orchestrator.
///
/// Registers the search tools against `provider`, builds the crew's workers
/// and pipeline, and hands every unit to `reasoner`.
pub fn create_orchestrator(
    crew: &CrewConfig,
    provider: Arc<dyn SearchProvider>,
    reasoner: Arc<dyn Reasoner>,
    options: PipelineOptions,
) -> PlanResult<Arc<Orchestrator>> {
    let tools = tools::default_registry(provider);
    let orchestrator = Orchestrator::new(crew, tools, reasoner, options)?;
    Ok(Arc::new(orchestrator))
}
