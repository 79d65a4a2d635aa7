//! OpenAI-compatible chat-completions reasoner with function calling.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::prompt::{system_prompt, task_prompt};
use super::{Reasoner, TaskRequest};
use crate::error::{PlanError, PlanResult};
use crate::tools::ToolBelt;

const MAX_LOG_CHARS: usize = 2_000;

#[derive(Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Upper bound on model round trips per unit.
    pub max_iterations: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(120),
            max_iterations: 8,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}

/// Function specs for every tool on the belt.
fn tool_specs(tools: &ToolBelt<'_>) -> Vec<Value> {
    tools
        .tools()
        .iter()
        .map(|tool| {
            let mut parameters = tool.input_schema();
            if let Some(obj) = parameters.as_object_mut() {
                obj.remove("$schema");
            }
            json!({
                "type": "function",
                "function": {
                    "name": tool.id(),
                    "description": tool.description(),
                    "parameters": parameters,
                }
            })
        })
        .collect()
}

pub struct ChatReasoner {
    client: Client,
    config: ChatConfig,
}

impl ChatReasoner {
    pub fn new(config: ChatConfig) -> PlanResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlanError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn complete(&self, body: &Value) -> PlanResult<AssistantMessage> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| PlanError::Config("api key is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| PlanError::Reasoning(format!("http error: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PlanError::Reasoning(format!(
                "HTTP {}: {}",
                status,
                truncate_for_log(&text, 300)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PlanError::Reasoning(format!("invalid response: {}", e.without_url())))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| PlanError::Reasoning("missing choices".to_string()))
    }
}

#[async_trait]
impl Reasoner for ChatReasoner {
    async fn perform(&self, request: TaskRequest<'_>, tools: &ToolBelt<'_>) -> PlanResult<String> {
        let unit = request.unit;
        let mut messages = vec![
            json!({ "role": "system", "content": system_prompt(request.worker) }),
            json!({ "role": "user", "content": task_prompt(unit, request.context) }),
        ];
        let specs = tool_specs(tools);

        info!(
            unit = %unit.id,
            worker = %request.worker.id,
            model = %self.config.model,
            tool_count = specs.len(),
            "reasoner request prepared"
        );

        for iteration in 0..self.config.max_iterations {
            let mut body = json!({
                "model": self.config.model,
                "temperature": self.config.temperature,
                "messages": messages,
            });
            if !specs.is_empty() {
                body["tools"] = Value::Array(specs.clone());
            }
            if unit.output_schema.is_some() {
                body["response_format"] = json!({ "type": "json_object" });
            }

            let message = self.complete(&body).await?;
            let calls = message.tool_calls.clone().unwrap_or_default();

            if calls.is_empty() {
                let content = message.content.unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(PlanError::Reasoning(format!(
                        "empty answer for unit `{}`",
                        unit.id
                    )));
                }
                debug!(
                    unit = %unit.id,
                    iteration,
                    answer = %truncate_for_log(&content, MAX_LOG_CHARS),
                    "reasoner final answer"
                );
                return Ok(content);
            }

            messages.push(json!({
                "role": "assistant",
                "content": message.content,
                "tool_calls": calls,
            }));

            for call in &calls {
                let name = call.function.name.as_str();
                let args: Value = if call.function.arguments.trim().is_empty() {
                    json!({})
                } else {
                    serde_json::from_str(&call.function.arguments).map_err(|e| {
                        PlanError::validation(format!("arguments for `{}` are not JSON: {}", name, e))
                    })?
                };
                debug!(unit = %unit.id, tool = name, %args, "reasoner tool call");

                let output = tools.invoke(name, args).await?;
                if tools.returns_direct(name) {
                    return Ok(output);
                }
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": output,
                }));
            }
        }

        Err(PlanError::Reasoning(format!(
            "no final answer for unit `{}` after {} iterations",
            unit.id, self.config.max_iterations
        )))
    }
}
