use std::collections::HashMap;

use alloy::primitives::{Address, U256, address, uint};
use lazy_static::lazy_static;
use starknet::{
    core::types::Felt,
    macros::{felt, selector},
};

use crate::{pools::PoolDescriptor, types::TokenInfo};

// Starknet mainnet tokens
pub const STRK: Felt = felt!("0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d");
pub const ETH: Felt = felt!("0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7");
pub const USDC: Felt = felt!("0x053c91253bc9682c04929ca02ed00b3e423f6710d2ee7e0d5ebb06f3ecf368a8");
pub const USDT: Felt = felt!("0x068f5c6a61780768455de69077e07e89787839bf8166decfbf92b645209c0fb8");
pub const WBTC: Felt = felt!("0x03fe2b97c1fd336e750087d68b9b867997fd64a2661ff3ca5a7c771641e8e7ac");

pub const EKUBO_CORE: Felt =
    felt!("0x00000005dd3d2f4429af886cd1a3b08289dbcea99a294197e9eb43b0e0325b4b");

// Ekubo fees are 0.128 fixed point fractions of the swapped amount
pub const FEE_0_05_PCT: u128 = 170141183460469235273462165868118016;
pub const FEE_0_01_PCT: u128 = 34028236692093847977029636859101184;

pub const STRK_USDT_EXTENSION: Felt =
    felt!("0x43e4f09c32d13d43a880e85f69f7de93ceda62d6cf2581a582c6db635548fdc");

/// Price limit used for every registered pool and for pools fetched from the Ekubo API
pub const DEFAULT_SQRT_RATIO_LIMIT: u128 = 18446748437148339061;

pub const EKUBO_API_BASE_URL: &str = "https://mainnet-api.ekubo.org";

// Entry points
pub const ENTRYPOINT_APPROVE: &str = "approve";
pub const ENTRYPOINT_ALLOWANCE: &str = "allowance";
pub const ENTRYPOINT_BALANCE_OF: &str = "balance_of";
pub const ENTRYPOINT_EKUBO_MANUAL_SWAP: &str = "ekubo_manual_swap";
pub const ENTRYPOINT_EKUBO_SWAP: &str = "ekubo_swap";
pub const ENTRYPOINT_CONTRACT_PARAMETERS: &str = "contract_parameters";
pub const ENTRYPOINT_TOKEN_STATUS: &str = "get_token_from_status_and_value";

// Event keys
pub const SWAP_SUCCESSFUL_SELECTOR: Felt = selector!("SwapSuccessful");
pub const SWAPPED_SELECTOR: Felt = selector!("Swapped");

// Concentrated liquidity sqrt price bounds (Q64.96)
pub const MIN_SQRT_RATIO: U256 = uint!(4295128740_U256);
pub const MAX_SQRT_RATIO: U256 =
    uint!(1461446703485210103287273052203988822378723970341_U256);

// Base mainnet
pub const BASE_USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const BASE_CNGN: Address = address!("0x46C85152bFe9f96829aA94755D9f915F9B10EF5F");
pub const AERODROME_QUOTER: Address = address!("0x254cF9E1E6e233aa1AC962CB9B05b2cfeAaE15b0");

pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

lazy_static! {
    pub static ref TOKENS: HashMap<Felt, TokenInfo> = [
        TokenInfo::new(STRK, "STRK", 18, "Starknet Token"),
        TokenInfo::new(ETH, "ETH", 18, "Ether"),
        TokenInfo::new(USDC, "USDC", 6, "USD Coin"),
        TokenInfo::new(USDT, "USDT", 6, "Tether USD"),
        TokenInfo::new(WBTC, "WBTC", 8, "Wrapped BTC"),
    ]
    .into_iter()
    .map(|token| (token.address, token))
    .collect();

    pub static ref DEFAULT_POOLS: Vec<PoolDescriptor> = vec![
        PoolDescriptor::new(STRK, USDC, FEE_0_05_PCT, 1000, Felt::ZERO),
        PoolDescriptor::new(STRK, USDT, FEE_0_01_PCT, 354892, STRK_USDT_EXTENSION),
        PoolDescriptor::new(ETH, USDC, FEE_0_05_PCT, 1000, Felt::ZERO),
        PoolDescriptor::new(ETH, USDT, FEE_0_05_PCT, 1000, Felt::ZERO),
    ];
}
