//! # AutoSwappr SDK
//!
//! A client SDK for the AutoSwappr router. It covers two chains:
//!
//! 1. **Starknet**: swaps routed through the AutoSwappr contract into Ekubo pools (`AutoSwappr`)
//! 2. **Base**: USDC → cNGN swaps against an Aerodrome Slipstream pool (`AutoSwapprBase`)
//!
//! ## 🚀 Quick Start
//!
//! ### Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! autoswappr-sdk = "0.1.0"
//! ```
//!
//! ### Basic Setup
//!
//! ```rust,ignore
//! use autoswappr_sdk::{AutoSwappr, AutoSwapprConfig};
//!
//! let config = AutoSwapprConfig::new(
//!     "0xYOUR_AUTOSWAPPR_CONTRACT_ADDRESS",
//!     "https://starknet-mainnet.public.blastapi.io",
//!     "0x0123...", // account
//!     "0x0456...", // private key
//! );
//! let sdk = AutoSwappr::connect(&config).await?;
//! ```
//!
//! Configuration can also come from the environment with `AutoSwapprConfig::from_env()`
//! (`AUTOSWAPPR_CONTRACT_ADDRESS`, `STARKNET_RPC_URL`, `ACCOUNT_ADDRESS`,
//! `PRIVATE_KEY`).
//!
//! ## 📖 Usage Patterns
//!
//! ### 1. Atomic Swap (`execute_swap`)
//!
//! Sends `approve` and the router swap as a single multicall, waits for the
//! receipt and decodes the settled pool deltas:
//!
//! ```rust,ignore
//! use autoswappr_sdk::{SwapOptions, STRK, USDC};
//!
//! let outcome = sdk.execute_swap(STRK, USDC, &SwapOptions::decimal("0.5")).await?;
//! println!("tx {:#x}, delta {:?}", outcome.transaction_hash, outcome.result.delta);
//! ```
//!
//! ### 2. Checked Swap (`execute_ekubo_manual_swap`)
//!
//! Verifies router support, balance and allowance before sending the swap
//! alone. Approve first with `approve_tokens`:
//!
//! ```rust,ignore
//! let options = SwapOptions::new("1000000000000000000"); // 1 STRK
//! sdk.approve_tokens(STRK, &1_000_000_000_000_000_000u128.into()).await?;
//! let outcome = sdk.execute_ekubo_manual_swap(STRK, USDC, &options).await?;
//! ```
//!
//! ### 3. Building Calls Yourself
//!
//! `create_swap_data` and `swap_calls` return the exact calls the SDK would
//! send, for wallets that submit transactions on their own.
//!
//! ### 4. Base (Aerodrome)
//!
//! ```rust,ignore
//! use alloy::primitives::{U256, address};
//! use autoswappr_sdk::{AutoSwapprBase, BaseConfig};
//!
//! let config = BaseConfig::mainnet(
//!     "https://mainnet.base.org",
//!     address!("0x0000000000000000000000000000000000000000"), // your Slipstream pool
//! )
//! .with_private_key("0x...");
//! let base = AutoSwapprBase::connect(config)?;
//! let quote = base.estimate_cngn_output(U256::from(1_000_000u64)).await?; // 1 USDC
//! let outcome = base.swap_usdc_for_cngn(U256::from(1_000_000u64), 50, None).await?;
//! ```
//!
//! ## 🏊 Pools
//!
//! Starknet pools come from a `PoolSource`. `StaticPoolRegistry` holds the
//! built-in STRK/ETH × USDC/USDT table; `EkuboApiPoolSource` queries the Ekubo
//! API and `FallbackPoolSource` chains the two.
//!
//! ## 📡 Events
//!
//! `AutoSwappr::swap_events` returns a `SwapEventWatcher` for the router's
//! `SwapSuccessful` events. It does not spawn anything; call `poll` on your
//! own schedule.
//!
//! ## ⚠️ Errors
//!
//! Every fallible call returns `AutoSwapprError`. `error_code()` gives a stable
//! string code and `kind()` a comparable discriminant.
//!
//! ## 📄 License
//!
//! MIT License - see LICENSE file for details.

mod aerodrome;
mod calldata;
mod config;
mod constants;
mod error;
mod events;
mod gateway;
mod pools;
mod sdk;
mod slippage;
mod swap_builder;
mod types;
pub mod utils;

pub use sdk::{AutoSwappr, ConfirmationPolicy, settle_swap};

pub use aerodrome::{
    AlloyBaseGateway, AutoSwapprBase, BaseGateway, BaseReceipt, BaseSwapOutcome, IAerodromePool,
    PoolState, SwapPlan, decode_swap_amounts, plan_swap, verify_pool_tokens,
};

pub use config::{AutoSwapprConfig, BaseConfig, RetryPolicy};

pub use error::{AutoSwapprError, BoxError, ErrorKind, Result};

pub use events::{SubscriptionId, SwapEventWatcher, SwapHandler, SwapNotification};

pub use gateway::{
    ChainEvent, ContractCall, EventPage, EventQuery, ExecutionStatus, Receipt, RpcGateway,
    StarknetGateway,
};

pub use pools::{
    EkuboApiPoolSource, EkuboPool, EkuboPoolsResponse, FallbackPoolSource, PairKey,
    PoolDescriptor, PoolSource, StaticPoolRegistry, parse_top_pool,
};

pub use slippage::{MAX_BPS, PriceBounds, PriceDirection, min_output, price_limit_from_spot};

pub use swap_builder::{
    assemble_swap_data, build_swap_data, resolve_is_token1, resolve_magnitude,
    resolve_skip_ahead, resolve_sqrt_ratio_limit,
};

pub use calldata::{
    allowance_calldata, approve_calldata, balance_of_calldata, decode_contract_info,
    decode_i129, decode_pool_key, decode_swap_successful, decode_swapped, decode_token_support,
    decode_u256, u256_felts,
};

pub use types::{
    AmountUnit, ContractInfo, Delta, FeeType, I129, PoolKey, RouterEntrypoint, SwapData,
    SwapOptions, SwapOutcome, SwapParameters, SwapResult, SwapSuccessfulEvent, TokenInfo,
    TokenSupport,
};

pub use constants::{
    AERODROME_QUOTER, BASE_CNGN, BASE_USDC, DEFAULT_POOLS, DEFAULT_SLIPPAGE_BPS,
    DEFAULT_SQRT_RATIO_LIMIT, EKUBO_API_BASE_URL, EKUBO_CORE, ETH, FEE_0_01_PCT, FEE_0_05_PCT,
    MAX_SQRT_RATIO, MIN_SQRT_RATIO, STRK, STRK_USDT_EXTENSION, TOKENS, USDC, USDT, WBTC,
};
