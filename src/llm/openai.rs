//! OpenAI Chat Completions Client
//!
//! Wraps the /v1/chat/completions endpoint. The model's reasoning is
//! opaque to this crate: messages and tool definitions go in, one
//! message (possibly carrying tool calls) comes out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::types::{
    ChatMessage, ChatRole, InferenceClient, InferenceOptions, InferenceResponse,
    InferenceToolCall, InferenceToolCallFunction, TokenUsage,
};

/// Default completion budget per turn.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Chat completions client bound to one model.
pub struct OpenAiChatClient {
    base_url: String,
    api_key: String,
    model: String,
    http: Client,
}

impl OpenAiChatClient {
    /// Create a new client.
    ///
    /// * `base_url` - API base, e.g. `https://api.openai.com`.
    /// * `api_key` - Bearer token.
    /// * `model` - Model identifier, e.g. `gpt-4o-mini`.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl InferenceClient for OpenAiChatClient {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: Option<InferenceOptions>,
    ) -> Result<InferenceResponse> {
        let formatted_messages: Vec<Value> = messages.iter().map(format_message).collect();

        let max_tokens = options
            .as_ref()
            .and_then(|o| o.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": formatted_messages,
            "max_tokens": max_tokens,
            "stream": false,
        });

        if let Some(ref opts) = options {
            if let Some(temp) = opts.temperature {
                body["temperature"] = serde_json::json!(temp);
            }
            if let Some(ref tool_defs) = opts.tools {
                if !tool_defs.is_empty() {
                    body["tools"] = serde_json::json!(tool_defs);
                    body["tool_choice"] = serde_json::json!("auto");
                }
            }
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        parse_response(&data, &self.model)
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}

/// Parse a chat completion body into an `InferenceResponse`.
fn parse_response(data: &Value, requested_model: &str) -> Result<InferenceResponse> {
    let choice = data["choices"]
        .get(0)
        .ok_or_else(|| anyhow::anyhow!("No completion choice returned"))?;

    let message = &choice["message"];

    let usage = TokenUsage {
        prompt_tokens: data["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: data["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        total_tokens: data["usage"]["total_tokens"].as_u64().unwrap_or(0),
    };

    let tool_calls: Option<Vec<InferenceToolCall>> = message["tool_calls"].as_array().map(|tcs| {
        tcs.iter()
            .map(|tc| InferenceToolCall {
                id: tc["id"].as_str().unwrap_or("").to_string(),
                call_type: "function".to_string(),
                function: InferenceToolCallFunction {
                    name: tc["function"]["name"].as_str().unwrap_or("").to_string(),
                    arguments: tc["function"]["arguments"]
                        .as_str()
                        .unwrap_or("{}")
                        .to_string(),
                },
            })
            .collect()
    });

    let role = match message["role"].as_str().unwrap_or("assistant") {
        "system" => ChatRole::System,
        "user" => ChatRole::User,
        "tool" => ChatRole::Tool,
        _ => ChatRole::Assistant,
    };

    let response_message = ChatMessage {
        role,
        content: message["content"].as_str().unwrap_or("").to_string(),
        tool_calls: tool_calls.clone(),
        tool_call_id: message["tool_call_id"].as_str().map(|s| s.to_string()),
    };

    Ok(InferenceResponse {
        id: data["id"].as_str().unwrap_or("").to_string(),
        model: data["model"].as_str().unwrap_or(requested_model).to_string(),
        message: response_message,
        tool_calls,
        usage,
        finish_reason: choice["finish_reason"].as_str().unwrap_or("stop").to_string(),
    })
}

/// Format a `ChatMessage` into the JSON shape the API expects.
fn format_message(msg: &ChatMessage) -> Value {
    let mut formatted = serde_json::json!({
        "role": msg.role,
        "content": msg.content,
    });

    if let Some(ref tool_calls) = msg.tool_calls {
        let tc_json: Vec<Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": tc.call_type,
                    "function": {
                        "name": tc.function.name,
                        "arguments": tc.function.arguments,
                    }
                })
            })
            .collect();
        formatted["tool_calls"] = serde_json::json!(tc_json);
    }

    if let Some(ref tool_call_id) = msg.tool_call_id {
        formatted["tool_call_id"] = serde_json::json!(tool_call_id);
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_plain_text() {
        let data = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": { "role": "assistant", "content": "Hello there." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14 }
        });

        let parsed = parse_response(&data, "gpt-4o-mini").unwrap();
        assert_eq!(parsed.message.content, "Hello there.");
        assert!(parsed.tool_calls.is_none());
        assert_eq!(parsed.finish_reason, "stop");
        assert_eq!(parsed.usage.total_tokens, 14);
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let data = json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_hbar_balance",
                            "arguments": "{\"account_id\":\"0.0.1\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {}
        });

        let parsed = parse_response(&data, "gpt-4o-mini").unwrap();
        let calls = parsed.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_hbar_balance");
        assert_eq!(parsed.finish_reason, "tool_calls");
    }

    #[test]
    fn test_parse_response_requires_a_choice() {
        let data = json!({ "choices": [] });
        assert!(parse_response(&data, "gpt-4o-mini").is_err());
    }

    #[test]
    fn test_format_message_carries_tool_call_id() {
        let msg = ChatMessage::tool("result text", "call_9");
        let formatted = format_message(&msg);
        assert_eq!(formatted["role"], "tool");
        assert_eq!(formatted["tool_call_id"], "call_9");
    }
}
