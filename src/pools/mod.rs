//! Pool registry: resolves an unordered token pair to one Ekubo pool

mod ekubo_api;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use num_bigint::BigUint;
use starknet::core::types::Felt;

use crate::{
    constants::{DEFAULT_POOLS, DEFAULT_SQRT_RATIO_LIMIT},
    error::Result,
    types::PoolKey,
};

pub use ekubo_api::{EkuboApiPoolSource, EkuboPool, EkuboPoolsResponse, parse_top_pool};

/// Fee tier, tick spacing, extension and default price limit of a pool
///
/// `token0`/`token1` follow the order the pool was requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDescriptor {
    pub token0: Felt,
    pub token1: Felt,
    pub fee: u128,
    pub tick_spacing: u128,
    pub extension: Felt,
    pub sqrt_ratio_limit: BigUint,
}

impl PoolDescriptor {
    pub fn new(
        token0: Felt,
        token1: Felt,
        fee: u128,
        tick_spacing: u128,
        extension: Felt,
    ) -> Self {
        Self {
            token0,
            token1,
            fee,
            tick_spacing,
            extension,
            sqrt_ratio_limit: BigUint::from(DEFAULT_SQRT_RATIO_LIMIT),
        }
    }

    /// Same pool with token0 and token1 swapped
    pub fn reversed(&self) -> Self {
        Self {
            token0: self.token1,
            token1: self.token0,
            ..self.clone()
        }
    }

    pub fn pool_key(&self) -> PoolKey {
        PoolKey {
            token0: self.token0,
            token1: self.token1,
            fee: self.fee,
            tick_spacing: self.tick_spacing,
            extension: self.extension,
        }
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.token0, self.token1)
    }
}

/// Order-independent key for a token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(Felt, Felt);

impl PairKey {
    pub fn new(token_a: Felt, token_b: Felt) -> Self {
        if token_a <= token_b {
            Self(token_a, token_b)
        } else {
            Self(token_b, token_a)
        }
    }
}

/// Source of pool descriptors
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Resolve the pool for a pair, returned in caller order, or `None` when no pool is known
    async fn pool_for(&self, token_a: Felt, token_b: Felt) -> Result<Option<PoolDescriptor>>;
}

#[async_trait]
impl<T: PoolSource + ?Sized> PoolSource for Arc<T> {
    async fn pool_for(&self, token_a: Felt, token_b: Felt) -> Result<Option<PoolDescriptor>> {
        (**self).pool_for(token_a, token_b).await
    }
}

/// In-memory table holding one canonical descriptor per pair
#[derive(Debug, Clone)]
pub struct StaticPoolRegistry {
    pools: HashMap<PairKey, PoolDescriptor>,
}

impl Default for StaticPoolRegistry {
    /// Registry preloaded with the mainnet STRK/ETH x USDC/USDT pools
    fn default() -> Self {
        Self::new(DEFAULT_POOLS.iter().cloned())
    }
}

impl StaticPoolRegistry {
    pub fn new(pools: impl IntoIterator<Item = PoolDescriptor>) -> Self {
        let mut registry = Self::empty();
        for pool in pools {
            registry.insert(pool);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// Register a pool, replacing any pool already registered for the pair
    pub fn insert(&mut self, pool: PoolDescriptor) -> Option<PoolDescriptor> {
        self.pools.insert(pool.pair_key(), pool)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Look up the pool for an unordered pair
    ///
    /// # Arguments
    /// * `token_a` - First token, becomes `token0` of the result
    /// * `token_b` - Second token, becomes `token1` of the result
    ///
    /// # Returns
    /// Returns the descriptor in caller order, or `None` when the pair is unknown
    pub fn lookup(&self, token_a: Felt, token_b: Felt) -> Option<PoolDescriptor> {
        let pool = self.pools.get(&PairKey::new(token_a, token_b))?;
        if pool.token0 == token_a {
            Some(pool.clone())
        } else {
            Some(pool.reversed())
        }
    }
}

#[async_trait]
impl PoolSource for StaticPoolRegistry {
    async fn pool_for(&self, token_a: Felt, token_b: Felt) -> Result<Option<PoolDescriptor>> {
        Ok(self.lookup(token_a, token_b))
    }
}

/// Tries `primary` first and asks `fallback` only on a miss
#[derive(Debug, Clone)]
pub struct FallbackPoolSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackPoolSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: PoolSource, F: PoolSource> PoolSource for FallbackPoolSource<P, F> {
    async fn pool_for(&self, token_a: Felt, token_b: Felt) -> Result<Option<PoolDescriptor>> {
        if let Some(pool) = self.primary.pool_for(token_a, token_b).await? {
            return Ok(Some(pool));
        }
        log::debug!(
            "No static pool for {:#x}/{:#x}, asking fallback source",
            token_a,
            token_b
        );
        self.fallback.pool_for(token_a, token_b).await
    }
}
