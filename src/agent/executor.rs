//! Agent Executor
//!
//! Composes model + tools + prompt + memory into a single invocable
//! unit: one payload in, one reply out. The model decides which tools
//! to call; the executor runs them and feeds results back until the
//! model produces a final answer.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::hub::{ChatPromptTemplate, PromptTemplate};
use crate::toolkit::{tools_to_inference_format, HederaTool, HederaToolkit};
use crate::types::{
    ChatMessage, InferenceClient, InferenceOptions, InferenceToolDefinition, ToolCallResult,
};

use super::memory::BufferMemory;

/// Maximum model/tool round trips per turn before the executor gives up.
const MAX_TOOL_ROUNDS: usize = 8;

/// The agent: a model handle plus the rendered prompt and the tool
/// definitions the model may call.
pub struct StructuredChatAgent {
    llm: Arc<dyn InferenceClient>,
    system_prompt: String,
    human_template: Option<PromptTemplate>,
    tool_definitions: Vec<InferenceToolDefinition>,
}

impl StructuredChatAgent {
    /// Build the agent by rendering the fetched prompt template with the
    /// toolkit's tool list.
    pub fn new(
        llm: Arc<dyn InferenceClient>,
        tools: &[HederaTool],
        template: &ChatPromptTemplate,
    ) -> Result<Self> {
        let tool_lines: Vec<String> = tools
            .iter()
            .map(|t| format!("{}: {}, args: {}", t.name, t.description, t.parameters))
            .collect();
        let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        let mut vars = HashMap::new();
        vars.insert("tools".to_string(), tool_lines.join("\n"));
        vars.insert("tool_names".to_string(), tool_names.join(", "));

        let system_prompt = template.system_text(&vars)?;

        Ok(Self {
            llm,
            system_prompt,
            human_template: template.human_template().cloned(),
            tool_definitions: tools_to_inference_format(tools),
        })
    }

    /// Render the per-turn user message. Falls back to the raw input if
    /// the fetched human template needs variables we do not supply.
    fn user_message(&self, input: &str) -> ChatMessage {
        if let Some(ref template) = self.human_template {
            let mut vars = HashMap::new();
            vars.insert("input".to_string(), input.to_string());
            vars.insert("agent_scratchpad".to_string(), String::new());

            if let Ok(rendered) = template.format(&vars) {
                return ChatMessage::user(rendered.trim_end().to_string());
            }
        }
        ChatMessage::user(input)
    }
}

/// Executor binding agent + toolkit + memory. One `invoke` per turn,
/// strictly sequential.
pub struct AgentExecutor {
    agent: StructuredChatAgent,
    toolkit: HederaToolkit,
    memory: BufferMemory,
    return_intermediate_steps: bool,
}

impl AgentExecutor {
    pub fn new(agent: StructuredChatAgent, toolkit: HederaToolkit, memory: BufferMemory) -> Self {
        Self {
            agent,
            toolkit,
            memory,
            return_intermediate_steps: false,
        }
    }

    /// Process one payload of the form `{ "input": <text> }` and return
    /// a reply carrying the memory's output field.
    ///
    /// Memory is updated only on success; an error here is recoverable
    /// and leaves the conversation as it was.
    pub async fn invoke(&mut self, payload: Value) -> Result<Value> {
        let input = payload[self.memory.input_key()]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Payload is missing '{}'", self.memory.input_key()))?
            .to_string();

        let mut messages = vec![ChatMessage::system(self.agent.system_prompt.clone())];
        messages.extend(self.memory.history());
        messages.push(self.agent.user_message(&input));

        let options = InferenceOptions {
            tools: Some(self.agent.tool_definitions.clone()),
            ..Default::default()
        };

        let mut steps: Vec<ToolCallResult> = Vec::new();

        for round in 0..MAX_TOOL_ROUNDS {
            let response = self
                .agent
                .llm
                .chat(messages.clone(), Some(options.clone()))
                .await?;

            let tool_calls = response.tool_calls.clone().unwrap_or_default();

            if tool_calls.is_empty() {
                let output = response.message.content;
                self.memory.save_turn(&input, &output);

                let mut reply = serde_json::Map::new();
                reply.insert(self.memory.input_key().to_string(), Value::String(input));
                reply.insert(self.memory.output_key().to_string(), Value::String(output));
                if self.return_intermediate_steps {
                    reply.insert("intermediate_steps".to_string(), serde_json::to_value(&steps)?);
                }
                return Ok(Value::Object(reply));
            }

            messages.push(response.message.clone());

            for tc in &tool_calls {
                let args: Value = serde_json::from_str(&tc.function.arguments).unwrap_or_default();
                debug!(round, tool = %tc.function.name, "executing tool call");

                let mut result = self.toolkit.execute(&tc.function.name, &args).await;
                result.id = tc.id.clone();

                let content = match result.error {
                    Some(ref err) => format!("Error: {}", err),
                    None => result.result.clone(),
                };
                messages.push(ChatMessage::tool(content, tc.id.clone()));
                steps.push(result);
            }
        }

        anyhow::bail!(
            "Agent exceeded {} tool rounds without a final answer",
            MAX_TOOL_ROUNDS
        )
    }

    pub fn memory(&self) -> &BufferMemory {
        &self.memory
    }
}
