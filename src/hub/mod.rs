//! Prompt Registry Client
//!
//! Pulls a named prompt from the public LangChain Hub API and parses its
//! manifest into a `ChatPromptTemplate`. A fetch failure is fatal to the
//! bootstrap; nothing here retries.

pub mod template;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

pub use template::{ChatPromptTemplate, PromptMessage, PromptTemplate};

/// Public hub API base.
const DEFAULT_HUB_BASE_URL: &str = "https://api.hub.langchain.com";

/// Prompt registry client.
pub struct HubClient {
    base_url: String,
    http: Client,
}

impl Default for HubClient {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_BASE_URL.to_string())
    }
}

impl HubClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Fetch the latest commit of `owner/repo` and parse its manifest.
    pub async fn pull(&self, repo: &str) -> Result<ChatPromptTemplate> {
        let url = format!("{}/commits/{}/latest", self.base_url, repo);

        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Prompt registry request failed for {:?}", repo))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Prompt registry error for {:?}: {}: {}",
                repo,
                status.as_u16(),
                text
            );
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse prompt registry response")?;

        parse_manifest(&data["manifest"])
            .with_context(|| format!("Prompt {:?} has an unusable manifest", repo))
    }
}

/// Parse a serialized `ChatPromptTemplate` manifest.
pub fn parse_manifest(manifest: &Value) -> Result<ChatPromptTemplate> {
    let kwargs = &manifest["kwargs"];
    let messages = kwargs["messages"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Manifest has no messages"))?;

    let input_variables = string_array(&kwargs["input_variables"]);

    let mut parsed = Vec::with_capacity(messages.len());
    for entry in messages {
        parsed.push(parse_message(entry)?);
    }

    if parsed.is_empty() {
        anyhow::bail!("Manifest messages list is empty");
    }

    Ok(ChatPromptTemplate {
        input_variables,
        messages: parsed,
    })
}

fn parse_message(entry: &Value) -> Result<PromptMessage> {
    let kind = entry["id"]
        .as_array()
        .and_then(|id| id.last())
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Manifest message has no id"))?;

    if kind.contains("MessagesPlaceholder") {
        let variable_name = entry["kwargs"]["variable_name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("MessagesPlaceholder has no variable_name"))?
            .to_string();
        return Ok(PromptMessage::Placeholder {
            variable_name,
            optional: entry["kwargs"]["optional"].as_bool().unwrap_or(false),
        });
    }

    let prompt_kwargs = &entry["kwargs"]["prompt"]["kwargs"];
    let template = prompt_kwargs["template"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Message template body missing for {:?}", kind))?
        .to_string();

    let prompt = PromptTemplate {
        template,
        input_variables: string_array(&prompt_kwargs["input_variables"]),
    };

    if kind.contains("System") {
        Ok(PromptMessage::System(prompt))
    } else if kind.contains("Human") {
        Ok(PromptMessage::Human(prompt))
    } else if kind.contains("AI") {
        Ok(PromptMessage::Ai(prompt))
    } else {
        anyhow::bail!("Unsupported prompt message kind: {}", kind)
    }
}

fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_manifest() -> Value {
        json!({
            "lc": 1,
            "type": "constructor",
            "id": ["langchain", "prompts", "chat", "ChatPromptTemplate"],
            "kwargs": {
                "input_variables": ["agent_scratchpad", "input", "tool_names", "tools"],
                "messages": [
                    {
                        "id": ["langchain", "prompts", "chat", "SystemMessagePromptTemplate"],
                        "kwargs": {
                            "prompt": {
                                "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
                                "kwargs": {
                                    "template": "You have access to: {tools}. Valid names: {tool_names}.",
                                    "input_variables": ["tools", "tool_names"]
                                }
                            }
                        }
                    },
                    {
                        "id": ["langchain", "prompts", "chat", "MessagesPlaceholder"],
                        "kwargs": { "variable_name": "chat_history", "optional": true }
                    },
                    {
                        "id": ["langchain", "prompts", "chat", "HumanMessagePromptTemplate"],
                        "kwargs": {
                            "prompt": {
                                "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
                                "kwargs": {
                                    "template": "{input}\n\n{agent_scratchpad}",
                                    "input_variables": ["input", "agent_scratchpad"]
                                }
                            }
                        }
                    }
                ]
            }
        })
    }

    #[test]
    fn test_parse_manifest_roundtrip() {
        let template = parse_manifest(&sample_manifest()).unwrap();
        assert_eq!(template.messages.len(), 3);
        assert!(template.has_placeholder("chat_history"));
        assert_eq!(
            template.input_variables,
            vec!["agent_scratchpad", "input", "tool_names", "tools"]
        );

        let human = template.human_template().unwrap();
        assert!(human.template.contains("{input}"));
    }

    #[test]
    fn test_parse_manifest_rejects_empty() {
        assert!(parse_manifest(&json!({ "kwargs": { "messages": [] } })).is_err());
        assert!(parse_manifest(&json!({})).is_err());
    }

    #[test]
    fn test_parse_message_rejects_unknown_kind() {
        let entry = json!({
            "id": ["langchain", "prompts", "chat", "FunctionMessagePromptTemplate"],
            "kwargs": { "prompt": { "kwargs": { "template": "x", "input_variables": [] } } }
        });
        assert!(parse_message(&entry).is_err());
    }
}
