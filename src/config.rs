//! Chatbot Configuration
//!
//! Loads operator credentials and runtime settings from the process
//! environment. Credentials are validated here so a bad environment
//! fails the bootstrap, never the first chat turn.

use regex::Regex;
use thiserror::Error;

use crate::types::Network;

/// Default model identifier for the language-model client.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default prompt registry entry for the structured chat agent.
pub const DEFAULT_PROMPT_REPO: &str = "hwchase17/structured-chat-agent";

/// Default base URL for the OpenAI-compatible chat completions API.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// DER prefix Hedera tooling emits in front of raw ECDSA private key bytes.
const ECDSA_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";

/// A configuration failure. Always fatal: reported to the operator and
/// the process exits before the REPL starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("malformed {name}: {reason}")]
    Malformed { name: &'static str, reason: String },
}

/// Immutable runtime settings, resolved once at bootstrap.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Operator account in `shard.realm.num` form, e.g. `0.0.12345`.
    pub operator_account_id: String,
    /// Normalized (0x-prefixed, 64 hex chars) ECDSA private key.
    pub operator_private_key: String,
    pub network: Network,
    pub model: String,
    pub prompt_repo: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
}

impl Settings {
    /// Resolve settings from the environment, applying CLI overrides.
    ///
    /// Credentials accept both the `HEDERA_`-prefixed variable names and
    /// the bare `ACCOUNT_ID` / `PRIVATE_KEY` names.
    pub fn from_env(
        network: Network,
        model: Option<String>,
        prompt_repo: Option<String>,
    ) -> Result<Self, ConfigError> {
        let account_raw = env_any(&["HEDERA_ACCOUNT_ID", "ACCOUNT_ID"])
            .ok_or(ConfigError::Missing("ACCOUNT_ID"))?;
        let key_raw = env_any(&["HEDERA_PRIVATE_KEY", "PRIVATE_KEY"])
            .ok_or(ConfigError::Missing("PRIVATE_KEY"))?;

        let operator_account_id = validate_account_id(&account_raw)?;
        let operator_private_key = normalize_private_key(&key_raw)?;

        let openai_api_key =
            env_any(&["OPENAI_API_KEY"]).ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;
        let openai_base_url = env_any(&["OPENAI_BASE_URL"])
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Settings {
            operator_account_id,
            operator_private_key,
            network,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            prompt_repo: prompt_repo.unwrap_or_else(|| DEFAULT_PROMPT_REPO.to_string()),
            openai_api_key,
            openai_base_url,
        })
    }
}

/// Return the first non-empty value among the given environment variables.
fn env_any(names: &[&str]) -> Option<String> {
    for name in names {
        if let Ok(value) = std::env::var(name) {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
    }
    None
}

/// Validate an account identifier of the form `shard.realm.num`.
pub fn validate_account_id(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    let re = Regex::new(r"^\d+\.\d+\.\d+$").map_err(|err| ConfigError::Malformed {
        name: "ACCOUNT_ID",
        reason: format!("pattern error: {}", err),
    })?;
    if re.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::Malformed {
            name: "ACCOUNT_ID",
            reason: format!("expected shard.realm.num, got {:?}", trimmed),
        })
    }
}

/// Normalize an ECDSA private key to 0x-prefixed raw hex.
///
/// Accepts raw 32-byte hex (with or without `0x`) and the DER-encoded
/// form Hedera key tooling produces. The scalar itself is validated when
/// the signer is constructed in `hedera::client`.
pub fn normalize_private_key(value: &str) -> Result<String, ConfigError> {
    let mut key = value.trim().to_lowercase();
    if let Some(stripped) = key.strip_prefix("0x") {
        key = stripped.to_string();
    }
    if let Some(stripped) = key.strip_prefix(ECDSA_DER_PREFIX) {
        key = stripped.to_string();
    }

    if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Malformed {
            name: "PRIVATE_KEY",
            reason: "expected 32 bytes of hex (raw or DER-encoded ECDSA key)".to_string(),
        });
    }

    Ok(format!("0x{}", key))
}
