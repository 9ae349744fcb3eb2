//! Hedera Tool Definitions
//!
//! Every operation the toolkit exposes, with its JSON schema and its
//! dispatch arm. Account arguments default to the operator account so
//! the model can ask "what is my balance" without knowing the id.

use std::time::Instant;

use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::hedera::HederaClient;
use crate::types::{
    tinybars_to_hbar, InferenceToolDefinition, InferenceToolDefinitionFunction, ToolCallResult,
};

/// A named, schema-described Hedera operation.
#[derive(Debug, Clone)]
pub struct HederaTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Create every tool the toolkit knows how to expose.
pub fn create_hedera_tools() -> Vec<HederaTool> {
    vec![
        HederaTool {
            name: "get_hbar_balance".to_string(),
            description: "Get the HBAR balance of a Hedera account. Defaults to the operator account when no account is given.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "description": "Account to query, in shard.realm.num form (e.g. 0.0.12345). Optional."
                    }
                }
            }),
        },
        HederaTool {
            name: "get_account_info".to_string(),
            description: "Get details for a Hedera account: balance, EVM address alias, key type, and memo.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "description": "Account to query (shard.realm.num). Optional, defaults to the operator account."
                    }
                }
            }),
        },
        HederaTool {
            name: "get_account_token_balances".to_string(),
            description: "List the fungible token balances held by a Hedera account.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "description": "Account to query (shard.realm.num). Optional, defaults to the operator account."
                    }
                }
            }),
        },
        HederaTool {
            name: "get_token_info".to_string(),
            description: "Get metadata for a Hedera token: name, symbol, decimals, supply, and treasury.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "token_id": {
                        "type": "string",
                        "description": "Token id (shard.realm.num)"
                    }
                },
                "required": ["token_id"]
            }),
        },
        HederaTool {
            name: "get_topic_messages".to_string(),
            description: "Read the most recent messages from a Hedera consensus topic.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "topic_id": {
                        "type": "string",
                        "description": "Topic id (shard.realm.num)"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum messages to return (default: 10)"
                    }
                },
                "required": ["topic_id"]
            }),
        },
        HederaTool {
            name: "get_transaction_record".to_string(),
            description: "Look up a transaction by id and report its outcome and fee.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "transaction_id": {
                        "type": "string",
                        "description": "Transaction id, e.g. 0.0.12345-1700000000-000000001"
                    }
                },
                "required": ["transaction_id"]
            }),
        },
        HederaTool {
            name: "get_exchange_rate".to_string(),
            description: "Get the network's current HBAR to USD cent exchange rate.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// Convert the tool list to OpenAI-compatible tool definitions.
pub fn tools_to_inference_format(tools: &[HederaTool]) -> Vec<InferenceToolDefinition> {
    tools
        .iter()
        .map(|t| InferenceToolDefinition {
            def_type: "function".to_string(),
            function: InferenceToolDefinitionFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}

/// Execute a tool call and return the result.
///
/// Tool execution is dispatched by name in `execute_tool_inner`; every
/// failure lands in the result's `error` field so one bad call never
/// ends the chat session.
pub async fn execute_tool(
    tool_name: &str,
    args: &Value,
    tools: &[HederaTool],
    client: &HederaClient,
) -> ToolCallResult {
    let start = Instant::now();

    if !tools.iter().any(|t| t.name == tool_name) {
        return ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: 0,
            error: Some(format!("Unknown tool: {}", tool_name)),
        };
    }

    match execute_tool_inner(tool_name, args, client).await {
        Ok(output) => ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: output,
            duration_ms: start.elapsed().as_millis() as u64,
            error: None,
        },
        Err(err) => ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: Some(err.to_string()),
        },
    }
}

/// Internal tool execution dispatch.
async fn execute_tool_inner(tool_name: &str, args: &Value, client: &HederaClient) -> Result<String> {
    match tool_name {
        "get_hbar_balance" => {
            let account = account_arg(args, client);
            let tinybars = client.mirror().get_hbar_balance(account).await?;
            Ok(format!(
                "Account {} balance: {:.8} hbar ({} tinybars)",
                account,
                tinybars_to_hbar(tinybars),
                tinybars
            ))
        }

        "get_account_info" => {
            let account = account_arg(args, client);
            let info = client.mirror().get_account(account).await?;

            let mut lines = vec![
                format!("Account: {}", info.account_id),
                format!("Balance: {:.8} hbar", tinybars_to_hbar(info.balance_tinybars)),
            ];
            if let Some(evm) = info.evm_address {
                lines.push(format!("EVM address: {}", evm));
            }
            if let Some(key_type) = info.key_type {
                lines.push(format!("Key type: {}", key_type));
            }
            if let Some(memo) = info.memo {
                lines.push(format!("Memo: {}", memo));
            }
            if info.deleted {
                lines.push("Status: DELETED".to_string());
            }
            Ok(lines.join("\n"))
        }

        "get_account_token_balances" => {
            let account = account_arg(args, client);
            let balances = client.mirror().get_token_balances(account).await?;

            if balances.is_empty() {
                return Ok(format!("Account {} holds no tokens.", account));
            }
            let lines: Vec<String> = balances
                .iter()
                .map(|b| format!("{}: {}", b.token_id, b.balance))
                .collect();
            Ok(lines.join("\n"))
        }

        "get_token_info" => {
            let token_id = args["token_id"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Missing 'token_id' argument"))?;
            let info = client.mirror().get_token_info(token_id).await?;

            let mut lines = vec![
                format!("Token: {} ({})", info.name, info.symbol),
                format!("Id: {}", info.token_id),
                format!("Type: {}", info.token_type),
                format!("Decimals: {}", info.decimals),
                format!("Total supply: {}", info.total_supply),
            ];
            if let Some(treasury) = info.treasury_account_id {
                lines.push(format!("Treasury: {}", treasury));
            }
            Ok(lines.join("\n"))
        }

        "get_topic_messages" => {
            let topic_id = args["topic_id"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Missing 'topic_id' argument"))?;
            let limit = args["limit"].as_u64().map(|l| l as u32);

            let messages = client.mirror().get_topic_messages(topic_id, limit).await?;
            if messages.is_empty() {
                return Ok(format!("No messages on topic {}.", topic_id));
            }

            let lines: Vec<String> = messages
                .iter()
                .map(|m| {
                    format!(
                        "#{} [{}] {}",
                        m.sequence_number, m.consensus_timestamp, m.message
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }

        "get_transaction_record" => {
            let transaction_id = args["transaction_id"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Missing 'transaction_id' argument"))?;

            let records = client.mirror().get_transaction(transaction_id).await?;
            if records.is_empty() {
                return Ok(format!("No record found for transaction {}.", transaction_id));
            }

            let lines: Vec<String> = records
                .iter()
                .map(|r| {
                    format!(
                        "{} {} at {}: {} (fee {:.8} hbar)",
                        r.name,
                        r.transaction_id,
                        r.consensus_timestamp,
                        r.result,
                        tinybars_to_hbar(r.charged_fee_tinybars)
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }

        "get_exchange_rate" => {
            let rate = client.mirror().get_exchange_rate().await?;
            if rate.hbar_equivalent == 0 {
                anyhow::bail!("Exchange rate reported zero hbar equivalent");
            }
            let cents_per_hbar = rate.cent_equivalent as f64 / rate.hbar_equivalent as f64;
            let expires = chrono::DateTime::from_timestamp(rate.expiration_time as i64, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| rate.expiration_time.to_string());
            Ok(format!(
                "1 hbar = {:.4} US cents (rate expires {})",
                cents_per_hbar, expires
            ))
        }

        other => anyhow::bail!("Unknown tool: {}", other),
    }
}

/// Resolve the account argument, defaulting to the operator account.
fn account_arg<'a>(args: &'a Value, client: &'a HederaClient) -> &'a str {
    args["account_id"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&client.operator.account_id)
}
