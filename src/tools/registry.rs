//! Tool registry for the search capabilities.
//!
//! Provides a `Tool` trait for implementing capabilities, a `ToolRegistry`
//! holding every tool of the process, and a `ToolBelt` that scopes the
//! registry to the tools one worker is allowed to use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PlanError, PlanResult};
use crate::types::ToolId;

/// Trait for capabilities a worker can invoke.
///
/// Each tool defines its schema and execution logic. Tools return plain text;
/// downstream units consume text, not structured options.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's id (e.g., "flight_search").
    fn id(&self) -> ToolId;

    /// Returns the tool's description, shown to the reasoning substrate.
    fn description(&self) -> &str;

    /// Returns the JSON schema of the tool's arguments.
    fn input_schema(&self) -> Value;

    /// Whether the tool's output is the unit's final answer.
    fn return_direct(&self) -> bool {
        false
    }

    /// Executes the tool with the given arguments.
    async fn invoke(&self, args: Value) -> PlanResult<String>;
}

/// Registry for managing tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolId, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool from a type that implements `Tool`.
    pub fn register_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.insert(tool.id(), Arc::new(tool));
        self
    }

    /// Get a tool by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).cloned()
    }

    /// List all registered tool ids, sorted.
    pub fn list_ids(&self) -> Vec<ToolId> {
        let mut ids: Vec<ToolId> = self.tools.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Execute a tool by id with the given arguments.
    pub async fn call_tool(&self, id: &str, args: Value) -> PlanResult<String> {
        let tool = self
            .get(id)
            .ok_or_else(|| PlanError::validation(format!("Tool not found: {}", id)))?;
        tool.invoke(args).await
    }

    /// Check if a tool with the given id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// The subset of the registry a single worker may use.
pub struct ToolBelt<'a> {
    registry: &'a ToolRegistry,
    allowed: &'a [ToolId],
}

impl<'a> ToolBelt<'a> {
    pub fn new(registry: &'a ToolRegistry, allowed: &'a [ToolId]) -> Self {
        Self { registry, allowed }
    }

    /// Tools available through this belt, in the worker's declared order.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.allowed
            .iter()
            .filter_map(|id| self.registry.get(id.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allows(&self, id: &str) -> bool {
        self.allowed.iter().any(|t| t.as_str() == id)
    }

    /// Whether a bound tool's output ends the unit.
    pub fn returns_direct(&self, id: &str) -> bool {
        self.allows(id)
            && self
                .registry
                .get(id)
                .map(|t| t.return_direct())
                .unwrap_or(false)
    }

    /// Invoke a bound tool. Tools outside the worker's capability set are
    /// refused.
    pub async fn invoke(&self, id: &str, args: Value) -> PlanResult<String> {
        if !self.allows(id) {
            return Err(PlanError::validation(format!(
                "tool `{}` is not available to this worker",
                id
            )));
        }
        info!(tool = %id, "invoking tool");
        let output = self.registry.call_tool(id, args).await?;
        debug!(tool = %id, output_len = output.len(), "tool returned");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn id(&self) -> ToolId {
            ToolId::new("echo")
        }

        fn description(&self) -> &str {
            "Echo the arguments back."
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn invoke(&self, args: Value) -> PlanResult<String> {
            Ok(args.to_string())
        }
    }

    #[test]
    fn test_registry_basics() {
        let registry = ToolRegistry::new().register_tool(EchoTool);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert!(registry.contains("echo"));
        assert_eq!(registry.list_ids(), vec![ToolId::new("echo")]);
        assert!(!registry.get("echo").unwrap().return_direct());
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_validation_error() {
        let registry = ToolRegistry::new();
        let err = registry.call_tool("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[tokio::test]
    async fn test_belt_refuses_unbound_tool() {
        let registry = ToolRegistry::new().register_tool(EchoTool);
        let none: Vec<ToolId> = Vec::new();
        let belt = ToolBelt::new(&registry, &none);
        assert!(belt.is_empty());
        assert!(belt.tools().is_empty());
        let err = belt.invoke("echo", json!({})).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));

        let allowed = vec![ToolId::new("echo")];
        let belt = ToolBelt::new(&registry, &allowed);
        let out = belt.invoke("echo", json!({"a": 1})).await.unwrap();
        assert_eq!(out, r#"{"a":1}"#);
    }
}
