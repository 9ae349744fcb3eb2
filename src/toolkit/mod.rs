//! Hedera Toolkit
//!
//! Bundles the Hedera operations the agent may call, bound to one
//! network client. The executor consumes the toolkit through
//! `get_tools()` and `execute()`; the REPL never touches it.

pub mod tools;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hedera::HederaClient;
use crate::types::ToolCallResult;

pub use tools::{create_hedera_tools, tools_to_inference_format, HederaTool};

/// How the toolkit executes operations on behalf of the agent.
///
/// `Autonomous` executes directly with the operator's credentials.
/// `ReturnBytes` is reserved for flows where a human signs elsewhere;
/// query operations behave identically in both modes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AgentMode {
    Autonomous,
    ReturnBytes,
}

/// Execution context the toolkit is configured with.
#[derive(Clone, Debug)]
pub struct ToolkitContext {
    pub mode: AgentMode,
}

/// Toolkit configuration: an explicit tool allow-list (empty means
/// "expose every tool") and the execution context.
#[derive(Clone, Debug)]
pub struct ToolkitConfiguration {
    pub tools: Vec<String>,
    pub context: ToolkitContext,
}

impl Default for ToolkitConfiguration {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            context: ToolkitContext {
                mode: AgentMode::Autonomous,
            },
        }
    }
}

/// The toolkit: tool descriptors bound to a network client.
pub struct HederaToolkit {
    client: HederaClient,
    mode: AgentMode,
    tools: Vec<HederaTool>,
}

impl HederaToolkit {
    /// Build the toolkit. An unknown name in the allow-list is a
    /// configuration error and fails the bootstrap.
    pub fn new(client: HederaClient, configuration: ToolkitConfiguration) -> Result<Self> {
        let all = create_hedera_tools();

        let tools = if configuration.tools.is_empty() {
            all
        } else {
            let mut selected = Vec::with_capacity(configuration.tools.len());
            for name in &configuration.tools {
                match all.iter().find(|t| &t.name == name) {
                    Some(tool) => selected.push(tool.clone()),
                    None => anyhow::bail!("Unknown tool in allow-list: {}", name),
                }
            }
            selected
        };

        Ok(Self {
            client,
            mode: configuration.context.mode,
            tools,
        })
    }

    /// The tool descriptor list lent to the agent executor.
    pub fn get_tools(&self) -> Vec<HederaTool> {
        self.tools.clone()
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn operator_account(&self) -> &str {
        &self.client.operator.account_id
    }

    /// Execute one tool call. Failures surface inside the result, never
    /// as a panic or an `Err` that could kill the turn loop.
    pub async fn execute(&self, name: &str, args: &Value) -> ToolCallResult {
        tools::execute_tool(name, args, &self.tools, &self.client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::hedera::Operator;
    use crate::types::Network;

    fn test_client() -> HederaClient {
        let settings = Settings {
            operator_account_id: "0.0.2".to_string(),
            operator_private_key: format!("0x{}", "5".repeat(64)),
            network: Network::Testnet,
            model: "gpt-4o-mini".to_string(),
            prompt_repo: "hwchase17/structured-chat-agent".to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
        };
        let operator = Operator::from_settings(&settings).unwrap();
        HederaClient::for_network(Network::Testnet, operator)
    }

    #[test]
    fn test_empty_allow_list_exposes_every_tool() {
        let toolkit = HederaToolkit::new(test_client(), ToolkitConfiguration::default()).unwrap();
        assert_eq!(toolkit.get_tools().len(), create_hedera_tools().len());
        assert_eq!(toolkit.mode(), AgentMode::Autonomous);
    }

    #[test]
    fn test_allow_list_filters_by_name() {
        let configuration = ToolkitConfiguration {
            tools: vec!["get_hbar_balance".to_string(), "get_token_info".to_string()],
            context: ToolkitContext {
                mode: AgentMode::Autonomous,
            },
        };
        let toolkit = HederaToolkit::new(test_client(), configuration).unwrap();
        let names: Vec<String> = toolkit.get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["get_hbar_balance", "get_token_info"]);
    }

    #[test]
    fn test_unknown_allow_list_entry_is_rejected() {
        let configuration = ToolkitConfiguration {
            tools: vec!["transfer_everything".to_string()],
            context: ToolkitContext {
                mode: AgentMode::Autonomous,
            },
        };
        assert!(HederaToolkit::new(test_client(), configuration).is_err());
    }
}
