//! Slippage and price-limit bounds
//!
//! `min_output` bounds what a caller accepts from amount-settled swaps.
//! `price_limit_from_spot` bounds the sqrt price a concentrated liquidity
//! swap may move to.

use alloy::primitives::U256;

use crate::{
    constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO},
    error::{AutoSwapprError, Result},
};

pub const MAX_BPS: u32 = 10_000;

/// Direction a swap moves the pool price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    /// token0 in, price falls
    ZeroForOne,
    /// token1 in, price rises
    OneForZero,
}

impl PriceDirection {
    pub fn from_zero_for_one(zero_for_one: bool) -> Self {
        if zero_for_one {
            Self::ZeroForOne
        } else {
            Self::OneForZero
        }
    }
}

/// Valid sqrt price range accepted by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: U256,
    pub max: U256,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: MIN_SQRT_RATIO,
            max: MAX_SQRT_RATIO,
        }
    }
}

fn check_bps(slippage_bps: u32) -> Result<u32> {
    if slippage_bps > MAX_BPS {
        return Err(AutoSwapprError::invalid_input(format!(
            "slippage {} bps exceeds {} bps",
            slippage_bps, MAX_BPS
        )));
    }
    Ok(slippage_bps)
}

// floor(value * factor / 10000) without overflowing the intermediate product
fn scale_bps(value: U256, factor: u32) -> U256 {
    let denominator = U256::from(MAX_BPS);
    let factor = U256::from(factor);
    let quotient = value / denominator;
    let remainder = value % denominator;
    quotient
        .saturating_mul(factor)
        .saturating_add(remainder * factor / denominator)
}

/// Worst acceptable output for a quoted amount
///
/// # Arguments
/// * `expected_output` - Quoted output amount
/// * `slippage_bps` - Tolerance in basis points, at most 10000
///
/// # Returns
/// Returns `expected_output * (10000 - slippage_bps) / 10000`, floored
pub fn min_output(expected_output: U256, slippage_bps: u32) -> Result<U256> {
    let bps = check_bps(slippage_bps)?;
    Ok(scale_bps(expected_output, MAX_BPS - bps))
}

/// Sqrt price limit derived from the current pool price
///
/// Scales `current_sqrt_price` by `1 ± slippage/2`, the first order
/// approximation of `sqrt(1 ± slippage)`. The error grows with the tolerance,
/// so wide tolerances yield a looser bound than the linear slippage implies.
/// The result is always clamped into `bounds`.
///
/// # Arguments
/// * `current_sqrt_price` - Pool sqrt price (Q64.96)
/// * `slippage_bps` - Tolerance in basis points, at most 10000
/// * `direction` - Which way the swap moves the price
/// * `bounds` - Protocol sqrt price range
///
/// # Returns
/// Returns the bounded sqrt price limit
pub fn price_limit_from_spot(
    current_sqrt_price: U256,
    slippage_bps: u32,
    direction: PriceDirection,
    bounds: PriceBounds,
) -> Result<U256> {
    let half = check_bps(slippage_bps)? / 2;
    let factor = match direction {
        PriceDirection::OneForZero => MAX_BPS + half,
        PriceDirection::ZeroForOne => MAX_BPS - half,
    };
    let limit = scale_bps(current_sqrt_price, factor);

    let clamped = if limit > bounds.max {
        bounds.max
    } else if limit < bounds.min {
        bounds.min
    } else {
        limit
    };

    log::debug!(
        "Price limit for {:?} at {} bps: spot {} -> {}",
        direction,
        slippage_bps,
        current_sqrt_price,
        clamped
    );

    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_min_output() {
        assert_eq!(min_output(U256::from(1000), 50).unwrap(), U256::from(995));
        assert_eq!(min_output(U256::from(1000), 0).unwrap(), U256::from(1000));
        assert_eq!(min_output(U256::from(1000), 10_000).unwrap(), U256::ZERO);
        // floor(999 * 9950 / 10000) = 994
        assert_eq!(min_output(U256::from(999), 50).unwrap(), U256::from(994));
    }

    #[test]
    fn test_min_output_large_values_do_not_overflow() {
        let expected = U256::MAX - U256::from(7);
        let out = min_output(expected, 1).unwrap();
        assert!(out < expected);
        assert!(out > expected / U256::from(2));
    }

    #[test]
    fn test_min_output_rejects_bps_above_max() {
        assert_matches!(
            min_output(U256::from(1000), 10_001),
            Err(AutoSwapprError::InvalidInput { .. })
        );
    }

    #[test]
    fn test_price_limit_scaling() {
        let spot = U256::from(1u64) << 96;
        let bounds = PriceBounds::default();

        let up = price_limit_from_spot(spot, 100, PriceDirection::OneForZero, bounds).unwrap();
        assert_eq!(up, spot * U256::from(10_050) / U256::from(10_000));

        let down = price_limit_from_spot(spot, 100, PriceDirection::ZeroForOne, bounds).unwrap();
        assert_eq!(down, spot * U256::from(9_950) / U256::from(10_000));
    }

    #[test]
    fn test_price_limit_clamped_to_max() {
        let bounds = PriceBounds::default();
        let limit =
            price_limit_from_spot(MAX_SQRT_RATIO, 50, PriceDirection::OneForZero, bounds).unwrap();
        assert_eq!(limit, MAX_SQRT_RATIO);
    }

    #[test]
    fn test_price_limit_always_within_bounds() {
        let bounds = PriceBounds::default();
        let spots = [
            U256::ZERO,
            U256::from(1),
            MIN_SQRT_RATIO - U256::from(1),
            MIN_SQRT_RATIO,
            U256::from(1u64) << 96,
            MAX_SQRT_RATIO,
            MAX_SQRT_RATIO + U256::from(1),
            U256::MAX,
        ];
        for spot in spots {
            for bps in [0, 1, 50, 500, 5_000, 9_999, 10_000] {
                for direction in [PriceDirection::ZeroForOne, PriceDirection::OneForZero] {
                    let limit = price_limit_from_spot(spot, bps, direction, bounds).unwrap();
                    assert!(
                        limit >= bounds.min && limit <= bounds.max,
                        "spot={spot} bps={bps} {direction:?} -> {limit}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_direction_from_flag() {
        assert_eq!(PriceDirection::from_zero_for_one(true), PriceDirection::ZeroForOne);
        assert_eq!(PriceDirection::from_zero_for_one(false), PriceDirection::OneForZero);
    }
}
