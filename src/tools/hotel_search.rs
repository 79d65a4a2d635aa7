//! The `hotel_search` tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::format::format_hotels;
use super::provider::{SearchParams, SearchProvider};
use super::registry::Tool;
use crate::error::PlanResult;
use crate::model::HotelQuery;
use crate::types::ToolId;

pub const HOTEL_SEARCH: &str = "hotel_search";

pub struct HotelSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl HotelSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn search(&self, query: &HotelQuery) -> PlanResult<String> {
        query.validate()?;
        debug!(
            location = query.location.trim(),
            nights = query.nights(),
            adults = query.adults,
            "searching hotels"
        );
        let response = self.provider.search(&hotel_params(query)).await?;
        Ok(format_hotels(&response))
    }
}

fn hotel_params(query: &HotelQuery) -> SearchParams {
    vec![
        ("engine", "google_hotels".to_string()),
        ("q", query.location.trim().to_string()),
        ("check_in_date", query.check_in_date.to_string()),
        ("check_out_date", query.check_out_date.to_string()),
        ("adults", query.adults.to_string()),
        ("currency", query.currency.clone()),
        ("gl", "us".to_string()),
        ("hl", "en".to_string()),
    ]
}

#[async_trait]
impl Tool for HotelSearchTool {
    fn id(&self) -> ToolId {
        ToolId::new(HOTEL_SEARCH)
    }

    fn description(&self) -> &str {
        "Search for hotels in a specific location. Input should be a JSON object with \
         location, check_in_date, and check_out_date."
    }

    fn input_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(HotelQuery)).unwrap_or(Value::Null)
    }

    fn return_direct(&self) -> bool {
        true
    }

    async fn invoke(&self, args: Value) -> PlanResult<String> {
        let query = HotelQuery::from_args(args)?;
        self.search(&query).await
    }
}
