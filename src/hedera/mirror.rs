//! Hedera Mirror Node Client
//!
//! Talks to the public mirror node REST API for account, token, topic,
//! and transaction queries. All toolkit reads go through here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;

use crate::types::{
    AccountInfo, ExchangeRate, MirrorClient, TokenBalance, TokenInfo, TopicMessage,
    TransactionRecord,
};

/// Default page size for list queries.
const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Mirror node REST client for one network.
pub struct MirrorNodeClient {
    base_url: String,
    http: Client,
}

impl MirrorNodeClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Internal helper: GET a mirror node path and return the JSON body.
    async fn get_json(&self, path_and_query: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Mirror node request failed: GET {}", path_and_query))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Mirror node error: GET {} -> {}: {}",
                path_and_query,
                status.as_u16(),
                text
            );
        }

        let json: Value = resp
            .json()
            .await
            .context("Failed to parse mirror node response")?;
        Ok(json)
    }
}

#[async_trait]
impl MirrorClient for MirrorNodeClient {
    async fn get_account(&self, account_id: &str) -> Result<AccountInfo> {
        let encoded = urlencoding::encode(account_id);
        let data = self
            .get_json(&format!("/api/v1/accounts/{}", encoded))
            .await?;
        parse_account(&data)
    }

    async fn get_hbar_balance(&self, account_id: &str) -> Result<u64> {
        let info = self.get_account(account_id).await?;
        Ok(info.balance_tinybars)
    }

    async fn get_token_balances(&self, account_id: &str) -> Result<Vec<TokenBalance>> {
        let encoded = urlencoding::encode(account_id);
        let data = self
            .get_json(&format!("/api/v1/accounts/{}/tokens?limit=100", encoded))
            .await?;
        parse_token_balances(&data)
    }

    async fn get_token_info(&self, token_id: &str) -> Result<TokenInfo> {
        let encoded = urlencoding::encode(token_id);
        let data = self.get_json(&format!("/api/v1/tokens/{}", encoded)).await?;
        parse_token_info(&data)
    }

    async fn get_topic_messages(
        &self,
        topic_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<TopicMessage>> {
        let encoded = urlencoding::encode(topic_id);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let data = self
            .get_json(&format!(
                "/api/v1/topics/{}/messages?limit={}&order=desc",
                encoded, limit
            ))
            .await?;
        parse_topic_messages(&data)
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Vec<TransactionRecord>> {
        let encoded = urlencoding::encode(transaction_id);
        let data = self
            .get_json(&format!("/api/v1/transactions/{}", encoded))
            .await?;
        parse_transactions(&data)
    }

    async fn get_exchange_rate(&self) -> Result<ExchangeRate> {
        let data = self.get_json("/api/v1/network/exchangerate").await?;
        parse_exchange_rate(&data)
    }
}

// ── Response parsing ───────────────────────────────────────────────
// The mirror node is inconsistent about numeric encoding (some fields
// are numbers, some are decimal strings), so all numeric reads go
// through as_u64_lossy.

fn parse_account(data: &Value) -> Result<AccountInfo> {
    let account_id = data["account"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Mirror account response missing 'account'"))?
        .to_string();

    Ok(AccountInfo {
        account_id,
        evm_address: data["evm_address"].as_str().map(|s| s.to_string()),
        balance_tinybars: as_u64_lossy(&data["balance"]["balance"]),
        key_type: data["key"]["_type"].as_str().map(|s| s.to_string()),
        deleted: data["deleted"].as_bool().unwrap_or(false),
        memo: data["memo"].as_str().filter(|m| !m.is_empty()).map(|s| s.to_string()),
    })
}

fn parse_token_balances(data: &Value) -> Result<Vec<TokenBalance>> {
    let tokens = data["tokens"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Mirror token response missing 'tokens'"))?;

    Ok(tokens
        .iter()
        .filter_map(|t| {
            let token_id = t["token_id"].as_str()?.to_string();
            Some(TokenBalance {
                token_id,
                balance: as_u64_lossy(&t["balance"]),
            })
        })
        .collect())
}

fn parse_token_info(data: &Value) -> Result<TokenInfo> {
    let token_id = data["token_id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Mirror token response missing 'token_id'"))?
        .to_string();

    Ok(TokenInfo {
        token_id,
        name: data["name"].as_str().unwrap_or("").to_string(),
        symbol: data["symbol"].as_str().unwrap_or("").to_string(),
        decimals: as_u64_lossy(&data["decimals"]) as u32,
        total_supply: match &data["total_supply"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        token_type: data["type"].as_str().unwrap_or("").to_string(),
        treasury_account_id: data["treasury_account_id"].as_str().map(|s| s.to_string()),
    })
}

fn parse_topic_messages(data: &Value) -> Result<Vec<TopicMessage>> {
    let messages = data["messages"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Mirror topic response missing 'messages'"))?;

    Ok(messages
        .iter()
        .map(|m| TopicMessage {
            sequence_number: as_u64_lossy(&m["sequence_number"]),
            consensus_timestamp: m["consensus_timestamp"].as_str().unwrap_or("").to_string(),
            message: decode_message(m["message"].as_str().unwrap_or("")),
        })
        .collect())
}

fn parse_transactions(data: &Value) -> Result<Vec<TransactionRecord>> {
    let transactions = data["transactions"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Mirror transaction response missing 'transactions'"))?;

    Ok(transactions
        .iter()
        .map(|t| TransactionRecord {
            transaction_id: t["transaction_id"].as_str().unwrap_or("").to_string(),
            name: t["name"].as_str().unwrap_or("").to_string(),
            result: t["result"].as_str().unwrap_or("").to_string(),
            consensus_timestamp: t["consensus_timestamp"].as_str().unwrap_or("").to_string(),
            charged_fee_tinybars: as_u64_lossy(&t["charged_tx_fee"]),
        })
        .collect())
}

fn parse_exchange_rate(data: &Value) -> Result<ExchangeRate> {
    let current = &data["current_rate"];
    if current.is_null() {
        anyhow::bail!("Mirror exchange rate response missing 'current_rate'");
    }

    Ok(ExchangeRate {
        cent_equivalent: as_u64_lossy(&current["cent_equivalent"]),
        hbar_equivalent: as_u64_lossy(&current["hbar_equivalent"]),
        expiration_time: as_u64_lossy(&current["expiration_time"]),
    })
}

/// Read a numeric field that the mirror node may encode as a number or
/// a decimal string.
fn as_u64_lossy(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Topic message payloads arrive base64-encoded. Decode to UTF-8 where
/// possible, hex otherwise.
fn decode_message(encoded: &str) -> String {
    match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => format!("0x{}", hex::encode(err.as_bytes())),
        },
        Err(_) => encoded.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_account() {
        let data = json!({
            "account": "0.0.12345",
            "evm_address": "0xabc0000000000000000000000000000000000001",
            "balance": { "balance": 250_000_000u64, "timestamp": "1.2" },
            "key": { "_type": "ECDSA_SECP256K1", "key": "02ab" },
            "deleted": false,
            "memo": ""
        });

        let info = parse_account(&data).unwrap();
        assert_eq!(info.account_id, "0.0.12345");
        assert_eq!(info.balance_tinybars, 250_000_000);
        assert_eq!(info.key_type.as_deref(), Some("ECDSA_SECP256K1"));
        assert!(info.memo.is_none());
        assert!(!info.deleted);
    }

    #[test]
    fn test_parse_account_requires_account_field() {
        assert!(parse_account(&json!({ "balance": {} })).is_err());
    }

    #[test]
    fn test_parse_token_info_with_string_numerics() {
        let data = json!({
            "token_id": "0.0.400",
            "name": "Demo Token",
            "symbol": "DEMO",
            "decimals": "6",
            "total_supply": "1000000",
            "type": "FUNGIBLE_COMMON",
            "treasury_account_id": "0.0.2"
        });

        let info = parse_token_info(&data).unwrap();
        assert_eq!(info.decimals, 6);
        assert_eq!(info.total_supply, "1000000");
        assert_eq!(info.token_type, "FUNGIBLE_COMMON");
    }

    #[test]
    fn test_parse_topic_messages_decodes_base64() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("hello hashgraph");
        let data = json!({
            "messages": [{
                "sequence_number": 7,
                "consensus_timestamp": "1700000000.000000001",
                "message": encoded
            }]
        });

        let messages = parse_topic_messages(&data).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sequence_number, 7);
        assert_eq!(messages[0].message, "hello hashgraph");
    }

    #[test]
    fn test_parse_exchange_rate() {
        let data = json!({
            "current_rate": {
                "cent_equivalent": 12,
                "hbar_equivalent": 1,
                "expiration_time": 1700003600
            },
            "next_rate": {}
        });

        let rate = parse_exchange_rate(&data).unwrap();
        assert_eq!(rate.cent_equivalent, 12);
        assert_eq!(rate.hbar_equivalent, 1);
    }

    #[test]
    fn test_as_u64_lossy_handles_numbers_and_strings() {
        assert_eq!(as_u64_lossy(&json!(42)), 42);
        assert_eq!(as_u64_lossy(&json!("42")), 42);
        assert_eq!(as_u64_lossy(&json!(null)), 0);
    }
}
