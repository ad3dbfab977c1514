use num_bigint::BigUint;
use num_traits::ToPrimitive;
use starknet::core::types::Felt;

use crate::{
    error::{AutoSwapprError, Result},
    types::{
        ContractInfo, Delta, FeeType, I129, PoolKey, SwapData, SwapSuccessfulEvent, TokenSupport,
    },
    utils::{join_u256, split_u256},
};

pub(crate) const SWAP_DATA_LEN: usize = 12;
pub(crate) const CONTRACT_INFO_LEN: usize = 7;
pub(crate) const SWAP_SUCCESSFUL_LEN: usize = 8;
pub(crate) const SWAPPED_LEN: usize = 21;

fn malformed(what: &str, detail: impl std::fmt::Display) -> AutoSwapprError {
    AutoSwapprError::invalid_input(format!("malformed {}: {}", what, detail))
}

fn expect_len(what: &str, felts: &[Felt], len: usize) -> Result<()> {
    if felts.len() < len {
        return Err(malformed(
            what,
            format!("expected {} felts, got {}", len, felts.len()),
        ));
    }
    Ok(())
}

pub(crate) fn felt_to_u128(value: Felt) -> Result<u128> {
    value
        .to_biguint()
        .to_u128()
        .ok_or_else(|| malformed("u128", value))
}

fn felt_to_bool(value: Felt) -> Result<bool> {
    if value == Felt::ZERO {
        Ok(false)
    } else if value == Felt::ONE {
        Ok(true)
    } else {
        Err(malformed("bool", value))
    }
}

fn bool_felt(value: bool) -> Felt {
    if value { Felt::ONE } else { Felt::ZERO }
}

/// u256 as `[low, high]`
pub fn u256_felts(value: &BigUint) -> Result<[Felt; 2]> {
    let (low, high) = split_u256(value)?;
    Ok([Felt::from(low), Felt::from(high)])
}

/// Read a `[low, high]` u256
pub fn decode_u256(felts: &[Felt]) -> Result<BigUint> {
    expect_len("u256", felts, 2)?;
    Ok(join_u256(felt_to_u128(felts[0])?, felt_to_u128(felts[1])?))
}

pub fn decode_i129(felts: &[Felt]) -> Result<I129> {
    expect_len("i129", felts, 2)?;
    Ok(I129 {
        mag: felt_to_u128(felts[0])?,
        sign: felt_to_bool(felts[1])?,
    })
}

impl From<I129> for [Felt; 2] {
    fn from(value: I129) -> Self {
        [Felt::from(value.mag), bool_felt(value.sign)]
    }
}

impl From<&PoolKey> for Vec<Felt> {
    fn from(key: &PoolKey) -> Self {
        vec![
            key.token0,
            key.token1,
            Felt::from(key.fee),
            Felt::from(key.tick_spacing),
            key.extension,
        ]
    }
}

impl TryFrom<&SwapData> for Vec<Felt> {
    type Error = AutoSwapprError;

    fn try_from(data: &SwapData) -> Result<Self> {
        let [mag, sign]: [Felt; 2] = data.params.amount.into();
        let [limit_low, limit_high] = u256_felts(&data.params.sqrt_ratio_limit)?;

        let mut felts = Vec::with_capacity(SWAP_DATA_LEN);
        felts.extend([
            mag,
            sign,
            bool_felt(data.params.is_token1),
            limit_low,
            limit_high,
            Felt::from(data.params.skip_ahead),
        ]);
        felts.extend(Vec::<Felt>::from(&data.pool_key));
        felts.push(data.caller);
        Ok(felts)
    }
}

/// `approve(spender, amount: u256)`
pub fn approve_calldata(spender: Felt, amount: &BigUint) -> Result<Vec<Felt>> {
    let [low, high] = u256_felts(amount)?;
    Ok(vec![spender, low, high])
}

/// `allowance(owner, spender)`
pub fn allowance_calldata(owner: Felt, spender: Felt) -> Vec<Felt> {
    vec![owner, spender]
}

/// `balance_of(account)`
pub fn balance_of_calldata(account: Felt) -> Vec<Felt> {
    vec![account]
}

pub fn decode_pool_key(felts: &[Felt]) -> Result<PoolKey> {
    expect_len("pool key", felts, 5)?;
    Ok(PoolKey {
        token0: felts[0],
        token1: felts[1],
        fee: felt_to_u128(felts[2])?,
        tick_spacing: felt_to_u128(felts[3])?,
        extension: felts[4],
    })
}

/// Output of `contract_parameters`
pub fn decode_contract_info(felts: &[Felt]) -> Result<ContractInfo> {
    expect_len("contract parameters", felts, CONTRACT_INFO_LEN)?;
    let fee_type = match felt_to_u128(felts[5])? {
        0 => FeeType::Fixed,
        1 => FeeType::Percentage,
        other => return Err(malformed("fee type", other)),
    };
    let percentage_fee = felt_to_u128(felts[6])?
        .to_u16()
        .ok_or_else(|| malformed("percentage fee", felts[6]))?;

    Ok(ContractInfo {
        fees_collector: felts[0],
        fibrous_exchange_address: felts[1],
        avnu_exchange_address: felts[2],
        oracle_address: felts[3],
        owner: felts[4],
        fee_type,
        percentage_fee,
    })
}

/// Output of `get_token_from_status_and_value`
pub fn decode_token_support(felts: &[Felt]) -> Result<TokenSupport> {
    expect_len("token status", felts, 2)?;
    Ok(TokenSupport {
        supported: felt_to_bool(felts[0])?,
        price_feed_id: felts[1],
    })
}

/// Data of the router's `SwapSuccessful` event
pub fn decode_swap_successful(data: &[Felt]) -> Result<SwapSuccessfulEvent> {
    expect_len("SwapSuccessful event", data, SWAP_SUCCESSFUL_LEN)?;
    Ok(SwapSuccessfulEvent {
        token_from_address: data[0],
        token_from_amount: decode_u256(&data[1..3])?,
        token_to_address: data[3],
        token_to_amount: decode_u256(&data[4..6])?,
        beneficiary: data[6],
        provider: data[7],
    })
}

/// Pool key and delta from the data of Ekubo core's `Swapped` event
///
/// Layout: locker, pool_key (5), params (6), delta (4), sqrt_ratio_after (2),
/// tick_after (2), liquidity_after.
pub fn decode_swapped(data: &[Felt]) -> Result<(PoolKey, Delta)> {
    expect_len("Swapped event", data, SWAPPED_LEN)?;
    let pool_key = decode_pool_key(&data[1..6])?;
    let delta = Delta {
        amount0: decode_i129(&data[12..14])?,
        amount1: decode_i129(&data[14..16])?,
    };
    Ok((pool_key, delta))
}
