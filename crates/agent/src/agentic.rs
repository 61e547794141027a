use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompt::build_agent_messages;
use crate::tools::ToolRegistry;
use generate::{ChatMessage, CompletionClient, CompletionRequest, DecodingParams};
use graph::{Error, Result};

pub const DEFAULT_AGENT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_MAX_STEPS: usize = 15;

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub schema: String,
    pub max_tokens: u32,
    /// Upper bound on completion rounds before giving up
    pub max_steps: usize,
}

impl AgentSettings {
    pub fn new(schema: String) -> Self {
        Self {
            schema,
            max_tokens: DEFAULT_AGENT_MAX_TOKENS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub answer: String,
    pub trace: AgentTrace,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentTrace {
    pub steps: usize,
    pub tool_calls: usize,
    pub tool_errors: usize,
}

/// Tool-using reasoning loop; the model decides which tool to call next.
pub struct AgentLoop {
    client: Arc<dyn CompletionClient>,
    registry: ToolRegistry,
    settings: AgentSettings,
}

impl AgentLoop {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        registry: ToolRegistry,
        settings: AgentSettings,
    ) -> Self {
        Self {
            client,
            registry,
            settings,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn run(&self, question: &str) -> Result<AgentResult> {
        let mut messages = build_agent_messages(&self.settings.schema, question);
        let tools = self.registry.specs();
        let params = DecodingParams::greedy(self.settings.max_tokens);
        let mut trace = AgentTrace::default();

        while trace.steps < self.settings.max_steps {
            trace.steps += 1;

            let completion = self
                .client
                .complete(CompletionRequest {
                    messages: messages.clone(),
                    params: params.clone(),
                    tools: tools.clone(),
                })
                .await
                .map_err(|e| Error::generation(format!("agent completion failed: {e}")))?;

            if completion.tool_calls.is_empty() {
                let answer = completion
                    .non_empty_content()
                    .ok_or_else(|| Error::generation("agent returned an empty answer"))?
                    .to_string();

                info!(
                    steps = trace.steps,
                    tool_calls = trace.tool_calls,
                    tool_errors = trace.tool_errors,
                    "Agent produced final answer"
                );
                return Ok(AgentResult { answer, trace });
            }

            messages.push(ChatMessage::assistant_tool_calls(
                completion.content.clone(),
                completion.tool_calls.clone(),
            ));

            for call in completion.tool_calls {
                trace.tool_calls += 1;
                debug!(step = trace.steps, tool = %call.name, args = %call.arguments, "Agent requested tool");

                let content = match self.registry.invoke(&call.name, call.arguments).await {
                    Ok(output) => render_output(&output),
                    Err(e) => {
                        trace.tool_errors += 1;
                        warn!(tool = %call.name, error = %e, "Tool call failed");
                        format!("Error: {e}")
                    }
                };

                messages.push(ChatMessage::tool_result(call.id, content));
            }
        }

        Err(Error::generation(format!(
            "agent did not reach an answer within {} steps",
            self.settings.max_steps
        )))
    }
}

/// Strings go back to the model bare, anything else as compact JSON.
fn render_output(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
