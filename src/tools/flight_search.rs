//! The `flight_search` tool.
//!
//! Validates a `FlightQuery`, issues one provider call, and renders the
//! `best_flights` list as text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::format::format_flights;
use super::provider::{SearchParams, SearchProvider};
use super::registry::Tool;
use crate::error::PlanResult;
use crate::model::FlightQuery;
use crate::types::ToolId;

pub const FLIGHT_SEARCH: &str = "flight_search";

pub struct FlightSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl FlightSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Search flights for an already-built query.
    pub async fn search(&self, query: &FlightQuery) -> PlanResult<String> {
        query.validate()?;
        let response = self.provider.search(&flight_params(query)).await?;
        Ok(format_flights(&response))
    }
}

fn flight_params(query: &FlightQuery) -> SearchParams {
    let mut params: SearchParams = vec![
        ("engine", "google_flights".to_string()),
        ("departure_id", query.departure_id.trim().to_string()),
        ("arrival_id", query.arrival_id.trim().to_string()),
        ("outbound_date", query.outbound_date.to_string()),
        ("currency", query.currency.clone()),
        ("hl", "en".to_string()),
    ];
    if let Some(ret) = query.return_date {
        params.push(("return_date", ret.to_string()));
    }
    params
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn id(&self) -> ToolId {
        ToolId::new(FLIGHT_SEARCH)
    }

    fn description(&self) -> &str {
        "Search for flights between airports. Input should be a JSON object with \
         departure_id, arrival_id, outbound_date, and optional return_date."
    }

    fn input_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(FlightQuery)).unwrap_or(Value::Null)
    }

    fn return_direct(&self) -> bool {
        true
    }

    async fn invoke(&self, args: Value) -> PlanResult<String> {
        let query = FlightQuery::from_args(args)?;
        self.search(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::tools::testing::MockProvider;
    use crate::tools::NO_FLIGHTS;
    use serde_json::json;

    fn args() -> Value {
        json!({
            "departure_id": "IXC",
            "arrival_id": "CDG",
            "outbound_date": "2025-03-10",
            "return_date": "2025-03-13"
        })
    }

    #[tokio::test]
    async fn test_search_builds_provider_params() {
        let provider = Arc::new(MockProvider::returning(json!({
            "best_flights": [ { "price": 650, "flights": [] } ]
        })));
        let tool = FlightSearchTool::new(provider.clone());

        let out = tool.invoke(args()).await.unwrap();
        assert!(out.contains("Flight Option - Price: $650"));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let params = &calls[0];
        assert!(params.contains(&("engine", "google_flights".to_string())));
        assert!(params.contains(&("return_date", "2025-03-13".to_string())));
        assert!(params.contains(&("currency", "USD".to_string())));
        assert!(params.contains(&("hl", "en".to_string())));
        assert!(params.iter().all(|(k, _)| *k != "api_key"));
    }

    #[tokio::test]
    async fn test_empty_result_returns_sentinel() {
        let provider = Arc::new(MockProvider::returning(json!({})));
        let tool = FlightSearchTool::new(provider);
        let out = tool.invoke(args()).await.unwrap();
        assert_eq!(out, NO_FLIGHTS);
        assert!(!out.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_query_makes_no_call() {
        let provider = Arc::new(MockProvider::returning(json!({})));
        let tool = FlightSearchTool::new(provider.clone());
        let err = tool
            .invoke(json!({ "departure_id": "IXC", "arrival_id": "IXC", "outbound_date": "2025-03-10" }))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockProvider::failing("operation timed out"));
        let tool = FlightSearchTool::new(provider);
        let err = tool.invoke(args()).await.unwrap_err();
        assert!(matches!(err, PlanError::Provider(_)));
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let tool = FlightSearchTool::new(Arc::new(MockProvider::returning(json!({}))));
        let schema = tool.input_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("departure_id")));
        assert!(required.contains(&json!("outbound_date")));
        assert!(!required.contains(&json!("return_date")));
        assert!(tool.return_direct());
    }
}
