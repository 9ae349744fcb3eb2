//! Hedera Chat - Type Definitions
//!
//! Shared types for the chatbot runtime: chat messages, inference wire
//! types, tool call results, and the client traits the agent executor
//! consumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─── Network ─────────────────────────────────────────────────────

/// Which Hedera network the operator is bound to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Base URL of the public mirror node REST API for this network.
    pub fn mirror_base_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://testnet.mirrornode.hedera.com",
            Network::Mainnet => "https://mainnet-public.mirrornode.hedera.com",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

// ─── Chat Messages ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<InferenceToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::Assistant, content)
    }

    /// A tool-result message answering the given tool call id.
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

// ─── Inference Wire Types ────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: InferenceToolCallFunction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolCallFunction {
    pub name: String,
    /// JSON-encoded arguments exactly as the model produced them.
    pub arguments: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolDefinition {
    #[serde(rename = "type")]
    pub def_type: String,
    pub function: InferenceToolDefinitionFunction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolDefinitionFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Clone, Debug)]
pub struct InferenceResponse {
    pub id: String,
    pub model: String,
    pub message: ChatMessage,
    pub tool_calls: Option<Vec<InferenceToolCall>>,
    pub usage: TokenUsage,
    pub finish_reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct InferenceOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub tools: Option<Vec<InferenceToolDefinition>>,
}

/// Handle to a remote text-generation service. The executor treats the
/// model's reasoning as opaque: messages in, one response out.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: Option<InferenceOptions>,
    ) -> anyhow::Result<InferenceResponse>;

    fn model_id(&self) -> String;
}

// ─── Tool Calls ──────────────────────────────────────────────────

/// Outcome of one toolkit invocation, as recorded by the executor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    pub result: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─── Mirror Node Types ───────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_address: Option<String>,
    /// Balance in tinybars (1 hbar = 100,000,000 tinybars).
    pub balance_tinybars: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_account_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMessage {
    pub sequence_number: u64,
    pub consensus_timestamp: String,
    /// Decoded message payload (UTF-8 where possible, hex otherwise).
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub name: String,
    pub result: String,
    pub consensus_timestamp: String,
    pub charged_fee_tinybars: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub cent_equivalent: u64,
    pub hbar_equivalent: u64,
    pub expiration_time: u64,
}

/// Read-side surface of the Hedera mirror node REST API. Everything the
/// toolkit knows how to do goes through this trait, so tests can swap in
/// a canned implementation.
#[async_trait]
pub trait MirrorClient: Send + Sync {
    async fn get_account(&self, account_id: &str) -> anyhow::Result<AccountInfo>;

    async fn get_hbar_balance(&self, account_id: &str) -> anyhow::Result<u64>;

    async fn get_token_balances(&self, account_id: &str) -> anyhow::Result<Vec<TokenBalance>>;

    async fn get_token_info(&self, token_id: &str) -> anyhow::Result<TokenInfo>;

    async fn get_topic_messages(
        &self,
        topic_id: &str,
        limit: Option<u32>,
    ) -> anyhow::Result<Vec<TopicMessage>>;

    async fn get_transaction(&self, transaction_id: &str) -> anyhow::Result<Vec<TransactionRecord>>;

    async fn get_exchange_rate(&self) -> anyhow::Result<ExchangeRate>;
}

/// Convert a tinybar amount to whole hbar.
pub fn tinybars_to_hbar(tinybars: u64) -> f64 {
    tinybars as f64 / 100_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_base_url_per_network() {
        assert!(Network::Testnet.mirror_base_url().contains("testnet"));
        assert!(Network::Mainnet.mirror_base_url().contains("mainnet"));
    }

    #[test]
    fn test_tinybars_to_hbar() {
        assert_eq!(tinybars_to_hbar(100_000_000), 1.0);
        assert_eq!(tinybars_to_hbar(0), 0.0);
        assert_eq!(tinybars_to_hbar(250_000_000), 2.5);
    }

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::tool("ok", "tc_1");
        assert_eq!(msg.role, ChatRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("tc_1"));

        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, ChatRole::User);
        assert!(msg.tool_calls.is_none());
    }
}
