use std::{fmt::Display, future::Future, time::Duration};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use tokio::time::sleep;

use crate::{
    config::RetryPolicy,
    error::{AutoSwapprError, Result},
};

const BPS_DENOMINATOR: u64 = 10_000;

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Convert a human decimal amount into the token's smallest unit
///
/// The fractional part is right-padded or truncated to `decimals` digits.
/// Extra digits are dropped, never rounded.
///
/// # Arguments
/// * `amount` - Decimal amount such as `"1.5"` or `"42"`
/// * `decimals` - Token decimal precision
///
/// # Returns
/// Returns the amount as a base-10 integer string
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<String> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AutoSwapprError::invalid_input(format!(
            "not a numeric amount: {:?}",
            amount
        )));
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    if fraction.len() >= decimals {
        digits.push_str(&fraction[..decimals]);
    } else {
        digits.push_str(fraction);
        digits.extend(std::iter::repeat_n('0', decimals - fraction.len()));
    }

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Convert a smallest-unit integer string back into a decimal value
///
/// The result is an `f64` and carries its precision limits.
pub fn from_smallest_unit(amount: &str, decimals: u8) -> Result<f64> {
    let amount = amount.trim();
    if amount.is_empty() || !is_digits(amount) {
        return Err(AutoSwapprError::invalid_input(format!(
            "not an integer amount: {:?}",
            amount
        )));
    }

    let decimals = decimals as usize;
    let decimal_repr = if decimals == 0 {
        amount.to_string()
    } else if amount.len() <= decimals {
        format!("0.{:0>width$}", amount, width = decimals)
    } else {
        let (whole, fraction) = amount.split_at(amount.len() - decimals);
        format!("{}.{}", whole, fraction)
    };

    decimal_repr
        .parse::<f64>()
        .map_err(|e| AutoSwapprError::invalid_input(format!("{}: {}", decimal_repr, e)))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a smallest-unit amount for display, e.g. `"1,234.5 USDC"`
///
/// At most three fractional digits are shown.
pub fn format_token_amount(amount: &str, decimals: u8, symbol: &str) -> Result<String> {
    let value = from_smallest_unit(amount, decimals)?;
    let fixed = format!("{:.3}", value);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let fraction = fraction.trim_end_matches('0');

    let mut formatted = group_thousands(whole);
    if !fraction.is_empty() {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    Ok(format!("{} {}", formatted, symbol))
}

/// Check that an address is `0x` followed by 64 hex characters
pub fn is_valid_token_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) => body.len() == 64 && hex::decode(body).is_ok(),
        None => false,
    }
}

/// Check that an amount parses as a positive number
pub fn is_valid_amount(amount: &str) -> bool {
    amount
        .trim()
        .parse::<f64>()
        .map(|value| value.is_finite() && value > 0.0)
        .unwrap_or(false)
}

/// Parse a decimal integer string
pub fn parse_biguint(value: &str) -> Result<BigUint> {
    let value = value.trim();
    if value.is_empty() || !is_digits(value) {
        return Err(AutoSwapprError::invalid_input(format!(
            "not an integer: {:?}",
            value
        )));
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
        .ok_or_else(|| AutoSwapprError::invalid_input(format!("not an integer: {:?}", value)))
}

/// Split a u256 into its `(low, high)` 128-bit halves
pub fn split_u256(value: &BigUint) -> Result<(u128, u128)> {
    if value.bits() > 256 {
        return Err(AutoSwapprError::invalid_input(format!(
            "{} does not fit in u256",
            value
        )));
    }
    let mask = (BigUint::from(1u8) << 128u32) - 1u8;
    let low = (value & &mask).to_u128().unwrap_or_default();
    let high = (value >> 128u32).to_u128().unwrap_or_default();
    Ok((low, high))
}

pub fn join_u256(low: u128, high: u128) -> BigUint {
    (BigUint::from(high) << 128u32) + BigUint::from(low)
}

/// Render a `(low, high)` u256 as a decimal string
pub fn u256_to_string(low: u128, high: u128) -> String {
    join_u256(low, high).to_string()
}

/// Parse a decimal string into `(low, high)` u256 halves
pub fn string_to_u256(value: &str) -> Result<(u128, u128)> {
    split_u256(&parse_biguint(value)?)
}

fn percentage_to_bps(percentage: Decimal) -> Result<u64> {
    (percentage * Decimal::ONE_HUNDRED)
        .floor()
        .to_u64()
        .ok_or_else(|| {
            AutoSwapprError::invalid_input(format!("invalid percentage: {}", percentage))
        })
}

/// `percentage`% of `amount`, with the percentage floored to whole basis points
pub fn calculate_percentage(amount: &BigUint, percentage: Decimal) -> Result<BigUint> {
    let bps = percentage_to_bps(percentage)?;
    Ok(amount * bps / BPS_DENOMINATOR)
}

/// Minimum amount left after applying a slippage percentage (e.g. `0.5` for 0.5%)
pub fn calculate_slippage_tolerance(
    amount: &BigUint,
    slippage_percentage: Decimal,
) -> Result<BigUint> {
    let tolerance = calculate_percentage(amount, slippage_percentage)?;
    if tolerance > *amount {
        return Ok(BigUint::zero());
    }
    Ok(amount - tolerance)
}

/// Run `op` up to `max_attempts` times with a fixed `delay` between attempts
///
/// Every error is treated as retryable. After the last attempt its error is
/// returned unchanged.
pub async fn retry<T, E, F, Fut>(
    mut op: F,
    max_attempts: u32,
    delay: Duration,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                log::warn!(
                    "Attempt {} failed: {}. Retrying in {}ms...",
                    attempt,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry`] driven by a [`RetryPolicy`]
pub async fn retry_with_policy<T, E, F, Fut>(
    op: F,
    policy: &RetryPolicy,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    retry(op, policy.max_attempts, policy.delay()).await
}
