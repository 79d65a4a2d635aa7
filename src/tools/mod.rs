//! Search tools and the registry that binds them to workers.
//!
//! Each tool validates its structured input, makes one call to the external
//! provider, and returns formatted text.

mod registry;

pub use registry::{Tool, ToolBelt, ToolRegistry};

mod flight_search;
mod format;
mod hotel_search;
pub mod provider;

pub use flight_search::{FLIGHT_SEARCH, FlightSearchTool};
pub use format::{NO_FLIGHTS, NO_HOTELS, format_flights, format_hotels};
pub use hotel_search::{HOTEL_SEARCH, HotelSearchTool};
pub use provider::{ProviderConfig, SearchParams, SearchProvider, SerpApiProvider};

use std::sync::Arc;

/// Registry holding both search tools over one provider.
pub fn default_registry(provider: Arc<dyn SearchProvider>) -> ToolRegistry {
    ToolRegistry::new()
        .register_tool(FlightSearchTool::new(provider.clone()))
        .register_tool(HotelSearchTool::new(provider))
}
