//! Client configuration

use std::{env, fmt, time::Duration};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

use crate::{
    constants::{AERODROME_QUOTER, BASE_CNGN, BASE_USDC},
    error::{AutoSwapprError, Result},
    utils::is_valid_token_address,
};

fn env_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        AutoSwapprError::invalid_input(format!("missing environment variable {}", name))
    })
}

pub(crate) fn parse_felt(value: &str, field: &str) -> Result<Felt> {
    Felt::from_hex(value.trim())
        .map_err(|e| AutoSwapprError::invalid_input(format!("invalid {}: {}", field, e)))
}

/// Starknet client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSwapprConfig {
    /// AutoSwappr router contract address
    pub contract_address: String,

    /// Starknet JSON-RPC endpoint
    pub rpc_url: String,

    /// Address of the account contract that signs swaps
    pub account_address: String,

    /// Private key of the signing account, never serialized
    #[serde(skip_serializing)]
    pub private_key: String,
}

impl fmt::Debug for AutoSwapprConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSwapprConfig")
            .field("contract_address", &self.contract_address)
            .field("rpc_url", &self.rpc_url)
            .field("account_address", &self.account_address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl AutoSwapprConfig {
    pub fn new(
        contract_address: impl Into<String>,
        rpc_url: impl Into<String>,
        account_address: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            rpc_url: rpc_url.into(),
            account_address: account_address.into(),
            private_key: private_key.into(),
        }
    }

    /// Load from `AUTOSWAPPR_CONTRACT_ADDRESS`, `STARKNET_RPC_URL`,
    /// `ACCOUNT_ADDRESS` and `PRIVATE_KEY`
    pub fn from_env() -> Result<Self> {
        let config = Self::new(
            env_var("AUTOSWAPPR_CONTRACT_ADDRESS")?,
            env_var("STARKNET_RPC_URL")?,
            env_var("ACCOUNT_ADDRESS")?,
            env_var("PRIVATE_KEY")?,
        );
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(AutoSwapprError::invalid_input("rpc_url is empty"));
        }
        for (field, value) in [
            ("contract_address", &self.contract_address),
            ("account_address", &self.account_address),
        ] {
            if !is_valid_token_address(value) {
                return Err(AutoSwapprError::invalid_input(format!(
                    "{} must be 0x followed by 64 hex characters",
                    field
                )));
            }
        }
        parse_felt(&self.private_key, "private_key")?;
        Ok(())
    }

    pub fn contract_felt(&self) -> Result<Felt> {
        parse_felt(&self.contract_address, "contract_address")
    }

    pub fn account_felt(&self) -> Result<Felt> {
        parse_felt(&self.account_address, "account_address")
    }
}

/// Base (Aerodrome) client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    pub rpc_url: String,

    /// Signing key; read-only operations work without one. Never serialized.
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,

    pub pool_address: Address,

    #[serde(default = "default_quoter")]
    pub quoter_address: Address,

    #[serde(default = "default_usdc")]
    pub usdc_address: Address,

    #[serde(default = "default_cngn")]
    pub cngn_address: Address,
}

fn default_quoter() -> Address {
    AERODROME_QUOTER
}

fn default_usdc() -> Address {
    BASE_USDC
}

fn default_cngn() -> Address {
    BASE_CNGN
}

impl fmt::Debug for BaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("pool_address", &self.pool_address)
            .field("quoter_address", &self.quoter_address)
            .field("usdc_address", &self.usdc_address)
            .field("cngn_address", &self.cngn_address)
            .finish()
    }
}

impl BaseConfig {
    /// Base mainnet USDC, cNGN and quoter addresses for the given pool
    pub fn mainnet(rpc_url: impl Into<String>, pool_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: None,
            pool_address,
            quoter_address: default_quoter(),
            usdc_address: default_usdc(),
            cngn_address: default_cngn(),
        }
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// Load from `BASE_RPC_URL`, `AERODROME_POOL_ADDRESS` and optionally `BASE_PRIVATE_KEY`
    pub fn from_env() -> Result<Self> {
        let pool_address = env_var("AERODROME_POOL_ADDRESS")?
            .parse::<Address>()
            .map_err(|e| AutoSwapprError::invalid_input(format!("invalid pool address: {}", e)))?;
        let mut config = Self::mainnet(env_var("BASE_RPC_URL")?, pool_address);
        config.private_key = env::var("BASE_PRIVATE_KEY").ok();
        Ok(config)
    }
}

/// Bounded retry with a fixed delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, nothing retried
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample_config() -> AutoSwapprConfig {
        AutoSwapprConfig::new(
            "0x05582ad635c43b4c14dbfa53cbde0df32266164a0d1b36e5b510e5b34aeb364b",
            "https://starknet-mainnet.public.blastapi.io",
            "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
            "0x1",
        )
    }

    #[test]
    fn test_validate_config() {
        assert!(sample_config().validate().is_ok());

        let mut config = sample_config();
        config.account_address = "0x1234".to_string();
        assert_matches!(config.validate(), Err(AutoSwapprError::InvalidInput { .. }));

        let mut config = sample_config();
        config.rpc_url = " ".to_string();
        assert_matches!(config.validate(), Err(AutoSwapprError::InvalidInput { .. }));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let rendered = format!("{:?}", sample_config().clone());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("private_key: \"0x1\""));
    }

    #[test]
    fn test_config_serialization() {
        let json = serde_json::to_string(&sample_config()).unwrap();
        assert!(json.contains("contractAddress"));
        assert!(!json.contains("privateKey"));

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["privateKey"] = serde_json::Value::from("0x1");
        let parsed: AutoSwapprConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.rpc_url, sample_config().rpc_url);
        assert_eq!(parsed.private_key, "0x1");
    }

    #[test]
    fn test_base_config_never_serializes_key() {
        let config = BaseConfig::mainnet("https://mainnet.base.org", BASE_USDC)
            .with_private_key("0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("poolAddress"));
        assert!(!json.contains("privateKey"));
        assert!(!json.contains("59c6995e"));

        let parsed: BaseConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.private_key.is_none());
        assert_eq!(parsed.pool_address, BASE_USDC);
    }

    #[test]
    fn test_base_config_defaults() {
        let json = r#"{
            "rpcUrl": "https://mainnet.base.org",
            "poolAddress": "0x0000000000000000000000000000000000000001"
        }"#;
        let config: BaseConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.usdc_address, BASE_USDC);
        assert_eq!(config.cngn_address, BASE_CNGN);
        assert!(config.private_key.is_none());
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay(), Duration::from_millis(1000));

        let once = RetryPolicy::once();
        assert_eq!(once.max_attempts, 1);
        assert_eq!(once.delay(), Duration::ZERO);
    }
}
