//! USDC → cNGN swaps on an Aerodrome Slipstream pool (Base)
//!
//! The swap is sent straight to the pool with a price limit derived from the
//! current `slot0` price. A quoter estimate is taken first so the outcome can
//! report the expected and minimum acceptable output alongside the settled
//! amounts.

use std::sync::Arc;

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, B256, Bytes, I256, U160, U256, aliases::U24},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{Log, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;

use crate::{
    config::BaseConfig,
    error::{AutoSwapprError, Result},
    slippage::{PriceBounds, PriceDirection, min_output, price_limit_from_spot},
};

sol! {
    #[sol(rpc)]
    interface IAerodromePool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function fee() external view returns (uint24);
        function tickSpacing() external view returns (int24);
        function liquidity() external view returns (uint128);
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            bool unlocked
        );
        function swap(
            address recipient,
            bool zeroForOne,
            int256 amountSpecified,
            uint160 sqrtPriceLimitX96,
            bytes data
        ) external returns (int256 amount0, int256 amount1);

        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick
        );
    }
}

sol! {
    #[sol(rpc)]
    interface IAerodromeQuoter {
        function quoteExactInputSingle(
            address tokenIn,
            address tokenOut,
            uint24 fee,
            uint256 amountIn,
            uint160 sqrtPriceLimitX96
        ) external returns (uint256 amountOut);
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// Snapshot of the pool's on-chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub token0: Address,
    pub token1: Address,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub fee: u32,
    pub liquidity: u128,
}

/// Output bounds derived before a swap is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    pub expected_output: U256,
    pub min_output: U256,
    pub sqrt_price_limit_x96: U256,
}

/// A confirmed USDC → cNGN swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSwapOutcome {
    pub transaction_hash: B256,
    /// Set when an approval had to be sent first
    pub approval_hash: Option<B256>,
    pub expected_output: U256,
    pub min_output: U256,
    pub sqrt_price_limit_x96: U256,
    /// Pool deltas from the `Swap` event, negative for tokens paid out
    pub amount0: Option<I256>,
    pub amount1: Option<I256>,
}

/// Receipt of a mined Base transaction
#[derive(Debug, Clone, PartialEq)]
pub struct BaseReceipt {
    pub transaction_hash: B256,
    pub success: bool,
    pub logs: Vec<Log>,
}

impl From<&TransactionReceipt> for BaseReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash(),
            success: receipt.status(),
            logs: receipt.inner.logs().to_vec(),
        }
    }
}

/// Narrow interface to a Base node and the signing wallet
///
/// Sending methods wait until the transaction is mined.
#[async_trait]
pub trait BaseGateway: Send + Sync {
    /// Address of the signing wallet, `None` for a read-only client
    fn signer_address(&self) -> Option<Address>;

    async fn pool_state(&self, pool: Address) -> Result<PoolState>;

    async fn pool_fee(&self, pool: Address) -> Result<u32>;

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<BaseReceipt>;

    async fn swap(
        &self,
        pool: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U160,
    ) -> Result<BaseReceipt>;
}

#[async_trait]
impl<T: BaseGateway + ?Sized> BaseGateway for Arc<T> {
    fn signer_address(&self) -> Option<Address> {
        (**self).signer_address()
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        (**self).pool_state(pool).await
    }

    async fn pool_fee(&self, pool: Address) -> Result<u32> {
        (**self).pool_fee(pool).await
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256> {
        (**self)
            .quote_exact_input_single(quoter, token_in, token_out, fee, amount_in)
            .await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        (**self).balance_of(token, owner).await
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        (**self).allowance(token, owner, spender).await
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<BaseReceipt> {
        (**self).approve(token, spender, amount).await
    }

    async fn swap(
        &self,
        pool: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U160,
    ) -> Result<BaseReceipt> {
        (**self)
            .swap(
                pool,
                recipient,
                zero_for_one,
                amount_specified,
                sqrt_price_limit_x96,
            )
            .await
    }
}

/// Gateway over an alloy provider, optionally with a wallet attached
pub struct AlloyBaseGateway {
    provider: DynProvider,
    signer_address: Option<Address>,
}

impl AlloyBaseGateway {
    /// Connect over HTTP
    ///
    /// Without a private key the gateway can still read pool state and quote.
    pub fn connect(rpc_url: &str, private_key: Option<&str>) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| AutoSwapprError::invalid_input(format!("invalid rpc_url: {}", e)))?;

        Ok(match private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse().map_err(|e| {
                    AutoSwapprError::invalid_input(format!("invalid private_key: {}", e))
                })?;
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                Self::new(provider, Some(address))
            }
            None => Self::new(ProviderBuilder::new().connect_http(url).erased(), None),
        })
    }

    /// Wrap an existing provider. `signer_address` must match the wallet the
    /// provider signs with.
    pub fn new(provider: DynProvider, signer_address: Option<Address>) -> Self {
        Self {
            provider,
            signer_address,
        }
    }

    fn pool(&self, address: Address) -> IAerodromePool::IAerodromePoolInstance<DynProvider> {
        IAerodromePool::new(address, self.provider.clone())
    }

    fn erc20(&self, address: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(address, self.provider.clone())
    }
}

#[async_trait]
impl BaseGateway for AlloyBaseGateway {
    fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        let pool = self.pool(pool);

        let token0 = pool
            .token0()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool token0"))?;
        let token1 = pool
            .token1()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool token1"))?;
        let slot0 = pool
            .slot0()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool slot0"))?;
        let fee = pool
            .fee()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool fee"))?;
        let liquidity = pool
            .liquidity()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool liquidity"))?;

        Ok(PoolState {
            token0,
            token1,
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick: slot0.tick.as_i32(),
            fee: fee.to::<u32>(),
            liquidity,
        })
    }

    async fn pool_fee(&self, pool: Address) -> Result<u32> {
        let fee = self
            .pool(pool)
            .fee()
            .call()
            .await
            .map_err(AutoSwapprError::network("reading pool fee"))?;
        Ok(fee.to::<u32>())
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256> {
        IAerodromeQuoter::new(quoter, self.provider.clone())
            .quoteExactInputSingle(
                token_in,
                token_out,
                U24::saturating_from(fee),
                amount_in,
                U160::ZERO,
            )
            .call()
            .await
            .map_err(AutoSwapprError::network("quoting exact input"))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.erc20(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(AutoSwapprError::network("reading balance"))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.erc20(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(AutoSwapprError::network("reading allowance"))
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<BaseReceipt> {
        let receipt = self
            .erc20(token)
            .approve(spender, amount)
            .send()
            .await
            .map_err(AutoSwapprError::network("sending approval"))?
            .get_receipt()
            .await
            .map_err(AutoSwapprError::network("waiting for approval"))?;
        Ok(BaseReceipt::from(&receipt))
    }

    async fn swap(
        &self,
        pool: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U160,
    ) -> Result<BaseReceipt> {
        let receipt = self
            .pool(pool)
            .swap(
                recipient,
                zero_for_one,
                amount_specified,
                sqrt_price_limit_x96,
                Bytes::new(),
            )
            .send()
            .await
            .map_err(AutoSwapprError::network("sending swap"))?
            .get_receipt()
            .await
            .map_err(AutoSwapprError::network("waiting for swap"))?;
        Ok(BaseReceipt::from(&receipt))
    }
}

/// Check the pool is (cNGN, USDC) in that order
pub fn verify_pool_tokens(
    token0: Address,
    token1: Address,
    expected0: Address,
    expected1: Address,
) -> Result<()> {
    if token0 != expected0 || token1 != expected1 {
        return Err(AutoSwapprError::TokensMismatch {
            expected0: expected0.to_string(),
            expected1: expected1.to_string(),
            found0: token0.to_string(),
            found1: token1.to_string(),
        });
    }
    Ok(())
}

/// Minimum output and price limit for a token1 → token0 swap
///
/// # Arguments
/// * `current_sqrt_price` - Pool `sqrtPriceX96` before the swap
/// * `expected_output` - Quoter estimate for the input amount
/// * `slippage_bps` - Tolerance in basis points
///
/// # Returns
/// Returns the plan with the price limit clamped into the protocol range
pub fn plan_swap(
    current_sqrt_price: U256,
    expected_output: U256,
    slippage_bps: u32,
) -> Result<SwapPlan> {
    Ok(SwapPlan {
        expected_output,
        min_output: min_output(expected_output, slippage_bps)?,
        sqrt_price_limit_x96: price_limit_from_spot(
            current_sqrt_price,
            slippage_bps,
            PriceDirection::OneForZero,
            PriceBounds::default(),
        )?,
    })
}

/// `(amount0, amount1)` of the first `Swap` event emitted by `pool`
///
/// Logs from other addresses and logs that are not a `Swap` are ignored.
pub fn decode_swap_amounts(logs: &[Log], pool: Address) -> Option<(I256, I256)> {
    logs.iter()
        .filter(|log| log.address() == pool)
        .find_map(|log| log.log_decode::<IAerodromePool::Swap>().ok())
        .map(|log| (log.inner.data.amount0, log.inner.data.amount1))
}

/// AutoSwappr client for Base
pub struct AutoSwapprBase<G = AlloyBaseGateway> {
    gateway: G,
    config: BaseConfig,
}

impl AutoSwapprBase<AlloyBaseGateway> {
    /// Connect to the Base RPC endpoint named in `config`
    ///
    /// Without a private key the client can still read pool state and quote.
    pub fn connect(config: BaseConfig) -> Result<Self> {
        let gateway = AlloyBaseGateway::connect(&config.rpc_url, config.private_key.as_deref())?;

        log::info!(
            "Base client for pool {} ({})",
            config.pool_address,
            gateway
                .signer_address()
                .map_or("read-only".to_string(), |a| a.to_string())
        );

        Ok(Self::new(gateway, config))
    }
}

impl<G: BaseGateway> AutoSwapprBase<G> {
    pub fn new(gateway: G, config: BaseConfig) -> Self {
        Self { gateway, config }
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.gateway.signer_address()
    }

    pub fn config(&self) -> &BaseConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Read tokens, price, fee and liquidity of the pool
    pub async fn pool_state(&self) -> Result<PoolState> {
        self.gateway.pool_state(self.config.pool_address).await
    }

    /// Quote the cNGN received for `amount` USDC
    pub async fn estimate_cngn_output(&self, amount: U256) -> Result<U256> {
        let fee = self.gateway.pool_fee(self.config.pool_address).await?;
        self.gateway
            .quote_exact_input_single(
                self.config.quoter_address,
                self.config.usdc_address,
                self.config.cngn_address,
                fee,
                amount,
            )
            .await
    }

    pub async fn usdc_balance(&self, owner: Address) -> Result<U256> {
        self.gateway
            .balance_of(self.config.usdc_address, owner)
            .await
    }

    async fn ensure_allowance(&self, owner: Address, amount: U256) -> Result<Option<B256>> {
        let allowance = self
            .gateway
            .allowance(self.config.usdc_address, owner, self.config.pool_address)
            .await?;
        if allowance >= amount {
            return Ok(None);
        }

        log::info!("Approving {} USDC for pool (allowance {})", amount, allowance);
        let receipt = self
            .gateway
            .approve(self.config.usdc_address, self.config.pool_address, amount)
            .await?;
        if !receipt.success {
            return Err(AutoSwapprError::SwapFailed {
                reason: format!("approval {} reverted", receipt.transaction_hash),
            });
        }
        Ok(Some(receipt.transaction_hash))
    }

    /// Swap `amount` USDC (smallest unit) for cNGN
    ///
    /// # Arguments
    /// * `amount` - USDC amount in its smallest unit
    /// * `slippage_bps` - Tolerance in basis points
    /// * `recipient` - Receiver of the cNGN, defaults to the signer
    ///
    /// # Returns
    /// Returns the confirmed swap with its bounds and settled pool deltas
    pub async fn swap_usdc_for_cngn(
        &self,
        amount: U256,
        slippage_bps: u32,
        recipient: Option<Address>,
    ) -> Result<BaseSwapOutcome> {
        let signer = self
            .gateway
            .signer_address()
            .ok_or(AutoSwapprError::SignerRequired)?;
        if amount.is_zero() {
            return Err(AutoSwapprError::ZeroAmount);
        }
        let amount_specified = I256::try_from(amount)
            .map_err(|e| AutoSwapprError::invalid_input(format!("amount {}: {}", amount, e)))?;

        let state = self.pool_state().await?;
        verify_pool_tokens(
            state.token0,
            state.token1,
            self.config.cngn_address,
            self.config.usdc_address,
        )?;

        let approval_hash = self.ensure_allowance(signer, amount).await?;

        let expected_output = self.estimate_cngn_output(amount).await?;
        let plan = plan_swap(state.sqrt_price_x96, expected_output, slippage_bps)?;
        log::info!(
            "Swapping {} USDC: expected {} cNGN, min {} (limit {})",
            amount,
            plan.expected_output,
            plan.min_output,
            plan.sqrt_price_limit_x96
        );

        let receipt = self
            .gateway
            .swap(
                self.config.pool_address,
                recipient.unwrap_or(signer),
                false,
                amount_specified,
                U160::saturating_from(plan.sqrt_price_limit_x96),
            )
            .await?;

        let transaction_hash = receipt.transaction_hash;
        if !receipt.success {
            return Err(AutoSwapprError::SwapFailed {
                reason: format!("swap {} reverted", transaction_hash),
            });
        }

        let settled = decode_swap_amounts(&receipt.logs, self.config.pool_address);
        if settled.is_none() {
            log::warn!("No Swap event in receipt of {}", transaction_hash);
        }

        Ok(BaseSwapOutcome {
            transaction_hash,
            approval_hash,
            expected_output: plan.expected_output,
            min_output: plan.min_output,
            sqrt_price_limit_x96: plan.sqrt_price_limit_x96,
            amount0: settled.map(|(amount0, _)| amount0),
            amount1: settled.map(|(_, amount1)| amount1),
        })
    }
}
