use num_bigint::BigUint;
use starknet::core::types::Felt;

use crate::constants::{ENTRYPOINT_EKUBO_MANUAL_SWAP, ENTRYPOINT_EKUBO_SWAP};

/// Signed 129-bit integer: a u128 magnitude and a separate sign flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I129 {
    pub mag: u128,
    pub sign: bool, // true when negative
}

impl I129 {
    pub fn positive(mag: u128) -> Self {
        Self { mag, sign: false }
    }

    pub fn negative(mag: u128) -> Self {
        Self { mag, sign: true }
    }

    pub fn is_negative(&self) -> bool {
        self.sign && self.mag != 0
    }
}

/// Swap parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParameters {
    pub amount: I129,
    pub is_token1: bool,
    pub sqrt_ratio_limit: BigUint, // u256
    pub skip_ahead: u128,
}

/// Ekubo pool key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolKey {
    pub token0: Felt,
    pub token1: Felt,
    pub fee: u128,
    pub tick_spacing: u128,
    pub extension: Felt,
}

/// Argument of the router's swap entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapData {
    pub params: SwapParameters,
    pub pool_key: PoolKey,
    pub caller: Felt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub amount0: I129,
    pub amount1: I129,
}

/// Settlement amounts moved by a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapResult {
    pub delta: Delta,
}

/// A confirmed swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub transaction_hash: Felt,
    pub result: SwapResult,
}

/// How `SwapOptions::amount` is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountUnit {
    /// Already in the token's smallest unit
    #[default]
    Smallest,
    /// Human decimal amount, scaled by the input token's registered decimals
    Decimal,
}

/// Caller input for a swap. Unset fields fall back to the pool's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapOptions {
    pub amount: String,
    pub unit: AmountUnit,
    pub is_token1: Option<bool>,
    pub sqrt_ratio_limit: Option<BigUint>,
    pub skip_ahead: Option<u128>,
}

impl SwapOptions {
    /// Options for an amount given in the token's smallest unit
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Default::default()
        }
    }

    /// Options for a human decimal amount such as `"0.5"`
    pub fn decimal(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            unit: AmountUnit::Decimal,
            ..Default::default()
        }
    }

    pub fn with_is_token1(mut self, is_token1: bool) -> Self {
        self.is_token1 = Some(is_token1);
        self
    }

    pub fn with_sqrt_ratio_limit(mut self, limit: BigUint) -> Self {
        self.sqrt_ratio_limit = Some(limit);
        self
    }

    pub fn with_skip_ahead(mut self, skip_ahead: u128) -> Self {
        self.skip_ahead = Some(skip_ahead);
        self
    }
}

/// Which router entry point a swap is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterEntrypoint {
    #[default]
    ManualSwap,
    Swap,
}

impl RouterEntrypoint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ManualSwap => ENTRYPOINT_EKUBO_MANUAL_SWAP,
            Self::Swap => ENTRYPOINT_EKUBO_SWAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeType {
    Fixed,
    Percentage,
}

/// Router configuration returned by `contract_parameters`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub fees_collector: Felt,
    pub fibrous_exchange_address: Felt,
    pub avnu_exchange_address: Felt,
    pub oracle_address: Felt,
    pub owner: Felt,
    pub fee_type: FeeType,
    pub percentage_fee: u16,
}

/// Static token metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Felt,
    pub symbol: &'static str,
    pub decimals: u8,
    pub name: &'static str,
}

impl TokenInfo {
    pub(crate) fn new(
        address: Felt,
        symbol: &'static str,
        decimals: u8,
        name: &'static str,
    ) -> Self {
        Self {
            address,
            symbol,
            decimals,
            name,
        }
    }
}

/// Router support status of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSupport {
    pub supported: bool,
    pub price_feed_id: Felt,
}

/// `SwapSuccessful` event emitted by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSuccessfulEvent {
    pub token_from_address: Felt,
    pub token_from_amount: BigUint,
    pub token_to_address: Felt,
    pub token_to_amount: BigUint,
    pub beneficiary: Felt,
    pub provider: Felt,
}
