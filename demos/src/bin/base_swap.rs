//! Quote and swap 1 USDC for cNGN on Base.
//!
//! Reads `BASE_RPC_URL`, `AERODROME_POOL_ADDRESS` and `BASE_PRIVATE_KEY`
//! from the environment.

use alloy::primitives::U256;
use anyhow::{Context, Result};
use autoswappr_sdk::{AutoSwapprBase, BaseConfig, DEFAULT_SLIPPAGE_BPS};
use tracing_subscriber::EnvFilter;

const ONE_USDC: u64 = 1_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BaseConfig::from_env().context("loading Base config")?;
    let base = AutoSwapprBase::connect(config)?;
    log::info!("AutoSwappr Base SDK initialized");

    let state = base.pool_state().await?;
    log::info!(
        "Pool price {} at tick {}, liquidity {}",
        state.sqrt_price_x96,
        state.tick,
        state.liquidity
    );

    let amount = U256::from(ONE_USDC);
    let quote = base.estimate_cngn_output(amount).await?;
    log::info!("1 USDC -> {} cNGN (smallest unit)", quote);

    let outcome = base
        .swap_usdc_for_cngn(amount, DEFAULT_SLIPPAGE_BPS, None)
        .await?;
    log::info!(
        "Swap {} confirmed: expected {}, min {}, amounts {:?} / {:?}",
        outcome.transaction_hash,
        outcome.expected_output,
        outcome.min_output,
        outcome.amount0,
        outcome.amount1
    );

    Ok(())
}
