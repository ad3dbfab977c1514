use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::{Num, ToPrimitive};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use starknet::core::types::Felt;

use super::{PoolDescriptor, PoolSource};
use crate::{
    config::RetryPolicy,
    constants::EKUBO_API_BASE_URL,
    error::{AutoSwapprError, Result},
    utils::retry_with_policy,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response of `GET /pair/{token0}/{token1}/pools`
#[derive(Debug, Clone, Deserialize)]
pub struct EkuboPoolsResponse {
    #[serde(rename = "topPools", default)]
    pub top_pools: Vec<EkuboPool>,
}

/// One pool as ranked by the Ekubo API
#[derive(Debug, Clone, Deserialize)]
pub struct EkuboPool {
    #[serde(deserialize_with = "string_or_number")]
    pub fee: String,
    #[serde(deserialize_with = "string_or_number")]
    pub tick_spacing: String,
    #[serde(deserialize_with = "string_or_number")]
    pub extension: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume0_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume1_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub fees0_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub fees1_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tvl0_total: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tvl1_total: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tvl0_delta_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tvl1_delta_24h: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub depth0: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub depth1: String,
    #[serde(default)]
    pub depth_percent: Option<f64>,
}

// The API mixes JSON numbers and numeric strings
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn parse_numeric(value: &str) -> Option<BigUint> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => BigUint::from_str_radix(hex, 16).ok(),
        None => BigUint::from_str_radix(value, 10).ok(),
    }
}

fn invalid_pool(token_a: Felt, token_b: Felt, field: &str, value: &str) -> AutoSwapprError {
    log::warn!("Ekubo API returned an unparsable {}: {:?}", field, value);
    AutoSwapprError::InvalidPoolConfig {
        token_a: format!("{:#x}", token_a),
        token_b: format!("{:#x}", token_b),
    }
}

/// Map the best ranked pool of an API response onto a descriptor
///
/// Only the first entry is used. token0/token1 keep the query order and the
/// price limit is the fixed default.
///
/// # Returns
/// Returns `None` when the response holds no pools
pub fn parse_top_pool(
    token_a: Felt,
    token_b: Felt,
    response: &EkuboPoolsResponse,
) -> Result<Option<PoolDescriptor>> {
    let Some(top) = response.top_pools.first() else {
        return Ok(None);
    };

    let fee = parse_numeric(&top.fee)
        .and_then(|v| v.to_u128())
        .ok_or_else(|| invalid_pool(token_a, token_b, "fee", &top.fee))?;
    let tick_spacing = parse_numeric(&top.tick_spacing)
        .and_then(|v| v.to_u128())
        .ok_or_else(|| invalid_pool(token_a, token_b, "tick_spacing", &top.tick_spacing))?;
    let extension = parse_numeric(&top.extension)
        .filter(|v| v.bits() <= 251)
        .map(|v| Felt::from_bytes_be_slice(&v.to_bytes_be()))
        .ok_or_else(|| invalid_pool(token_a, token_b, "extension", &top.extension))?;

    Ok(Some(PoolDescriptor::new(
        token_a,
        token_b,
        fee,
        tick_spacing,
        extension,
    )))
}

/// Pool source backed by the Ekubo HTTP API
#[derive(Debug, Clone)]
pub struct EkuboApiPoolSource {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl EkuboApiPoolSource {
    /// Client for the mainnet Ekubo API
    pub fn new() -> Result<Self> {
        Self::with_base_url(EKUBO_API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AutoSwapprError::PoolFetchFailed {
                message: "failed to build http client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::once(),
        })
    }

    /// Retry failed requests. Requests are sent once unless this is set.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the ranked pools for a pair
    pub async fn fetch_top_pools(
        &self,
        token_a: Felt,
        token_b: Felt,
    ) -> Result<EkuboPoolsResponse> {
        let url = format!(
            "{}/pair/{}/{}/pools",
            self.base_url,
            token_a.to_fixed_hex_string(),
            token_b.to_fixed_hex_string()
        );
        log::debug!("Fetching Ekubo pools from {}", url);

        retry_with_policy(|| self.get_pools(&url), &self.retry).await
    }

    async fn get_pools(&self, url: &str) -> Result<EkuboPoolsResponse> {
        let fetch_failed = |e: reqwest::Error| AutoSwapprError::PoolFetchFailed {
            message: format!("GET {}", url),
            source: Some(Box::new(e)),
        };

        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(fetch_failed)?
            .error_for_status()
            .map_err(fetch_failed)?
            .json::<EkuboPoolsResponse>()
            .await
            .map_err(fetch_failed)
    }

    /// Resolve a pair through the API, using its best ranked pool
    pub async fn lookup_remote(
        &self,
        token_a: Felt,
        token_b: Felt,
    ) -> Result<Option<PoolDescriptor>> {
        let response = self.fetch_top_pools(token_a, token_b).await?;
        let pool = parse_top_pool(token_a, token_b, &response)?;
        if pool.is_none() {
            log::debug!("Ekubo API has no pools for {:#x}/{:#x}", token_a, token_b);
        }
        Ok(pool)
    }
}

#[async_trait]
impl PoolSource for EkuboApiPoolSource {
    async fn pool_for(&self, token_a: Felt, token_b: Felt) -> Result<Option<PoolDescriptor>> {
        self.lookup_remote(token_a, token_b).await
    }
}
