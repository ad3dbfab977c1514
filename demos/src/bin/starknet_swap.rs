//! Swap a small amount of ETH for USDC through the AutoSwappr router.
//!
//! Reads `AUTOSWAPPR_CONTRACT_ADDRESS`, `STARKNET_RPC_URL`, `ACCOUNT_ADDRESS`
//! and `PRIVATE_KEY` from the environment.

use anyhow::{Context, Result};
use autoswappr_sdk::{AutoSwappr, AutoSwapprConfig, ETH, SwapOptions, USDC, utils};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AutoSwapprConfig::from_env().context("loading Starknet config")?;
    let sdk = AutoSwappr::connect(&config).await?;
    log::info!("AutoSwappr SDK initialized for {:#x}", sdk.account_address());

    let balance = sdk.get_token_balance(ETH).await?;
    log::info!(
        "ETH balance: {}",
        utils::format_token_amount(&balance.to_string(), 18, "ETH")?
    );

    let options = SwapOptions::decimal("0.00001");
    let fee = sdk.estimate_swap_gas(ETH, USDC, &options).await?;
    log::info!("Estimated fee: {}", fee);

    log::info!("Executing swap: ETH -> USDC");
    let outcome = sdk.execute_swap(ETH, USDC, &options).await?;
    log::info!(
        "Swap {:#x} settled, delta: {:?}",
        outcome.transaction_hash,
        outcome.result.delta
    );

    Ok(())
}
