//! Swap data assembly
//!
//! Amount validation happens before any pool lookup so a bad amount never
//! costs a network round trip. The defaulting rules for `SwapOptions` are
//! plain functions so they can be checked without a pool source.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use starknet::core::types::Felt;

use crate::{
    constants::TOKENS,
    error::{AutoSwapprError, Result},
    pools::{PoolDescriptor, PoolSource},
    types::{AmountUnit, I129, SwapData, SwapOptions, SwapParameters},
    utils::{parse_biguint, to_smallest_unit},
};

/// `is_token1` override, or whether the input token is the pool's token1
pub fn resolve_is_token1(options: &SwapOptions, pool: &PoolDescriptor, token_in: Felt) -> bool {
    options.is_token1.unwrap_or(token_in == pool.token1)
}

pub fn resolve_sqrt_ratio_limit(options: &SwapOptions, pool: &PoolDescriptor) -> BigUint {
    options
        .sqrt_ratio_limit
        .clone()
        .unwrap_or_else(|| pool.sqrt_ratio_limit.clone())
}

pub fn resolve_skip_ahead(options: &SwapOptions) -> u128 {
    options.skip_ahead.unwrap_or(0)
}

/// Swap amount in the input token's smallest unit
///
/// # Returns
/// Returns the magnitude, or `ZeroAmount` for an empty or zero amount
pub fn resolve_magnitude(token_in: Felt, options: &SwapOptions) -> Result<u128> {
    if options.amount.trim().is_empty() {
        return Err(AutoSwapprError::ZeroAmount);
    }

    let smallest = match options.unit {
        AmountUnit::Smallest => parse_biguint(&options.amount)?,
        AmountUnit::Decimal => {
            let token = TOKENS
                .get(&token_in)
                .ok_or_else(|| AutoSwapprError::UnsupportedToken {
                    token: format!("{:#x}", token_in),
                })?;
            parse_biguint(&to_smallest_unit(&options.amount, token.decimals)?)?
        }
    };

    if smallest.is_zero() {
        return Err(AutoSwapprError::ZeroAmount);
    }

    smallest.to_u128().ok_or_else(|| {
        AutoSwapprError::invalid_input(format!("amount {} does not fit in u128", smallest))
    })
}

/// Assemble swap data from an already resolved pool
pub fn assemble_swap_data(
    token_in: Felt,
    pool: &PoolDescriptor,
    options: &SwapOptions,
    magnitude: u128,
    caller: Felt,
) -> SwapData {
    SwapData {
        params: SwapParameters {
            amount: I129::positive(magnitude),
            is_token1: resolve_is_token1(options, pool, token_in),
            sqrt_ratio_limit: resolve_sqrt_ratio_limit(options, pool),
            skip_ahead: resolve_skip_ahead(options),
        },
        pool_key: pool.pool_key(),
        caller,
    }
}

/// Validate the amount, resolve the pool and assemble swap data
///
/// # Arguments
/// * `pools` - Pool source used to resolve the pair
/// * `token_in` - Token being sold
/// * `token_out` - Token being bought
/// * `options` - Amount and optional overrides
/// * `caller` - Account declared as the swap caller
///
/// # Returns
/// Returns the `SwapData` and the pool it was built against
pub async fn build_swap_data<P: PoolSource + ?Sized>(
    pools: &P,
    token_in: Felt,
    token_out: Felt,
    options: &SwapOptions,
    caller: Felt,
) -> Result<(SwapData, PoolDescriptor)> {
    let magnitude = resolve_magnitude(token_in, options)?;

    let pool = pools
        .pool_for(token_in, token_out)
        .await?
        .ok_or_else(|| AutoSwapprError::InvalidPoolConfig {
            token_a: format!("{:#x}", token_in),
            token_b: format!("{:#x}", token_out),
        })?;

    let swap_data = assemble_swap_data(token_in, &pool, options, magnitude, caller);
    log::debug!(
        "Built swap of {} {:#x} -> {:#x} (is_token1: {})",
        magnitude,
        token_in,
        token_out,
        swap_data.params.is_token1
    );

    Ok((swap_data, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{DEFAULT_SQRT_RATIO_LIMIT, FEE_0_05_PCT, STRK, USDC, WBTC},
        pools::StaticPoolRegistry,
    };
    use assert_matches::assert_matches;

    fn strk_usdc() -> PoolDescriptor {
        StaticPoolRegistry::default().lookup(STRK, USDC).unwrap()
    }

    #[test]
    fn test_defaults() {
        let pool = strk_usdc();
        let options = SwapOptions::new("1");

        assert!(!resolve_is_token1(&options, &pool, STRK));
        assert!(resolve_is_token1(&options, &pool, USDC));
        assert_eq!(
            resolve_sqrt_ratio_limit(&options, &pool),
            BigUint::from(DEFAULT_SQRT_RATIO_LIMIT)
        );
        assert_eq!(resolve_skip_ahead(&options), 0);
    }

    #[test]
    fn test_overrides() {
        let pool = strk_usdc();
        let options = SwapOptions::new("1")
            .with_is_token1(true)
            .with_sqrt_ratio_limit(BigUint::from(42u8))
            .with_skip_ahead(5);

        assert!(resolve_is_token1(&options, &pool, STRK));
        assert_eq!(resolve_sqrt_ratio_limit(&options, &pool), BigUint::from(42u8));
        assert_eq!(resolve_skip_ahead(&options), 5);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(
            resolve_magnitude(STRK, &SwapOptions::new("1000000000000000000")).unwrap(),
            1_000_000_000_000_000_000
        );
        assert_eq!(
            resolve_magnitude(STRK, &SwapOptions::decimal("0.00001")).unwrap(),
            10_000_000_000_000
        );
        assert_eq!(resolve_magnitude(USDC, &SwapOptions::decimal("2.5")).unwrap(), 2_500_000);
    }

    #[test]
    fn test_magnitude_rejects_zero_and_empty() {
        for options in [
            SwapOptions::new("0"),
            SwapOptions::new(""),
            SwapOptions::new("000"),
            SwapOptions::decimal("0.0"),
            SwapOptions::decimal("0.0000001"), // truncates to zero for 6 decimals
        ] {
            assert_matches!(resolve_magnitude(USDC, &options), Err(AutoSwapprError::ZeroAmount));
        }
    }

    #[test]
    fn test_magnitude_rejects_bad_input() {
        assert_matches!(
            resolve_magnitude(STRK, &SwapOptions::new("1.5")),
            Err(AutoSwapprError::InvalidInput { .. })
        );
        let too_big = (BigUint::from(1u8) << 128u32).to_string();
        assert_matches!(
            resolve_magnitude(STRK, &SwapOptions::new(too_big)),
            Err(AutoSwapprError::InvalidInput { .. })
        );
        assert_matches!(
            resolve_magnitude(Felt::from(1234u32), &SwapOptions::decimal("1")),
            Err(AutoSwapprError::UnsupportedToken { .. })
        );
    }

    #[tokio::test]
    async fn test_build_strk_usdc() {
        let registry = StaticPoolRegistry::default();
        let caller = Felt::from(0xcafeu32);
        let (data, _) = build_swap_data(
            &registry,
            STRK,
            USDC,
            &SwapOptions::new("1000000000000000000"),
            caller,
        )
        .await
        .unwrap();

        assert!(!data.params.is_token1);
        assert_eq!(data.params.amount.mag, 1_000_000_000_000_000_000);
        assert!(!data.params.amount.sign);
        assert_eq!(data.params.skip_ahead, 0);
        assert_eq!(data.pool_key.token0, STRK);
        assert_eq!(data.pool_key.token1, USDC);
        assert_eq!(data.pool_key.fee, FEE_0_05_PCT);
        assert_eq!(data.pool_key.tick_spacing, 1000);
        assert_eq!(data.caller, caller);
    }

    #[tokio::test]
    async fn test_build_unknown_pair() {
        let registry = StaticPoolRegistry::default();
        let result =
            build_swap_data(&registry, WBTC, USDC, &SwapOptions::new("1"), Felt::ONE).await;
        assert_matches!(result, Err(AutoSwapprError::InvalidPoolConfig { .. }));
    }
}
