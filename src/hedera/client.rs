//! Hedera Operator & Network Client
//!
//! Binds the operator's validated credentials to a network. The private
//! key is parsed into a real secp256k1 signer at construction, so a bad
//! key fails the bootstrap rather than a later tool call.

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

use crate::config::Settings;
use crate::types::{MirrorClient, Network};

use super::mirror::MirrorNodeClient;

/// The operator identity: account, parsed ECDSA key, and the EVM address
/// alias derived from it.
pub struct Operator {
    pub account_id: String,
    pub evm_address: String,
    signer: PrivateKeySigner,
}

impl Operator {
    /// Build the operator from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let signer: PrivateKeySigner = settings
            .operator_private_key
            .parse()
            .context("Failed to parse operator private key")?;
        let evm_address = signer.address().to_checksum(None);

        Ok(Self {
            account_id: settings.operator_account_id.clone(),
            evm_address,
            signer,
        })
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

/// A network client: operator credentials bound to one Hedera network
/// and its mirror node.
pub struct HederaClient {
    pub network: Network,
    pub operator: Operator,
    mirror: Box<dyn MirrorClient>,
}

impl HederaClient {
    /// Construct a client for the given network, wired to that network's
    /// public mirror node.
    pub fn for_network(network: Network, operator: Operator) -> Self {
        let mirror = Box::new(MirrorNodeClient::new(
            network.mirror_base_url().to_string(),
        ));
        Self {
            network,
            operator,
            mirror,
        }
    }

    /// Construct a client with an explicit mirror implementation.
    pub fn with_mirror(
        network: Network,
        operator: Operator,
        mirror: Box<dyn MirrorClient>,
    ) -> Self {
        Self {
            network,
            operator,
            mirror,
        }
    }

    pub fn mirror(&self) -> &dyn MirrorClient {
        self.mirror.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            operator_account_id: "0.0.12345".to_string(),
            operator_private_key: format!("0x{}", "7".repeat(64)),
            network: Network::Testnet,
            model: "gpt-4o-mini".to_string(),
            prompt_repo: "hwchase17/structured-chat-agent".to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
        }
    }

    #[test]
    fn test_operator_from_settings_derives_evm_address() {
        let operator = Operator::from_settings(&test_settings()).unwrap();
        assert_eq!(operator.account_id, "0.0.12345");
        assert!(operator.evm_address.starts_with("0x"));
        assert_eq!(operator.evm_address.len(), 42);
    }

    #[test]
    fn test_operator_rejects_zero_key() {
        let mut settings = test_settings();
        settings.operator_private_key = format!("0x{}", "0".repeat(64));
        assert!(Operator::from_settings(&settings).is_err());
    }

    #[test]
    fn test_for_network_binds_mirror_base_url() {
        let operator = Operator::from_settings(&test_settings()).unwrap();
        let client = HederaClient::for_network(Network::Testnet, operator);
        assert_eq!(client.network, Network::Testnet);
    }
}
