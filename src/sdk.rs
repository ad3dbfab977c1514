use std::time::Duration;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use starknet::core::types::Felt;
use tokio::time::sleep;

use crate::{
    calldata::{
        allowance_calldata, approve_calldata, balance_of_calldata, decode_contract_info,
        decode_swap_successful, decode_swapped, decode_token_support, decode_u256,
    },
    config::AutoSwapprConfig,
    constants::{
        ENTRYPOINT_ALLOWANCE, ENTRYPOINT_APPROVE, ENTRYPOINT_BALANCE_OF,
        ENTRYPOINT_CONTRACT_PARAMETERS, ENTRYPOINT_TOKEN_STATUS, EKUBO_CORE,
        SWAP_SUCCESSFUL_SELECTOR, SWAPPED_SELECTOR, TOKENS,
    },
    error::{AutoSwapprError, Result},
    events::SwapEventWatcher,
    gateway::{ContractCall, ExecutionStatus, Receipt, RpcGateway, StarknetGateway},
    pools::{PairKey, PoolDescriptor, PoolSource, StaticPoolRegistry},
    swap_builder::build_swap_data,
    types::{
        ContractInfo, Delta, I129, PoolKey, RouterEntrypoint, SwapData, SwapOptions, SwapOutcome,
        SwapResult, TokenInfo, TokenSupport,
    },
};

/// How long to wait for a submitted transaction to be included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: 90,
        }
    }
}

/// AutoSwappr client for the Starknet router
pub struct AutoSwappr<G, P = StaticPoolRegistry> {
    gateway: G,
    pools: P,
    contract_address: Felt,
    entrypoint: RouterEntrypoint,
    confirmation: ConfirmationPolicy,
}

impl AutoSwappr<RpcGateway, StaticPoolRegistry> {
    /// Connect to a Starknet node with the built-in pool table
    ///
    /// # Arguments
    /// * `config` - Router address, RPC URL and signing account
    ///
    /// # Returns
    /// Returns a client ready to quote and execute swaps
    pub async fn connect(config: &AutoSwapprConfig) -> Result<Self> {
        let gateway = RpcGateway::connect(config).await?;
        Ok(Self::new(
            gateway,
            StaticPoolRegistry::default(),
            config.contract_felt()?,
        ))
    }
}

impl<G: StarknetGateway, P: PoolSource> AutoSwappr<G, P> {
    /// Create a client over an existing gateway and pool source
    pub fn new(gateway: G, pools: P, contract_address: Felt) -> Self {
        Self {
            gateway,
            pools,
            contract_address,
            entrypoint: RouterEntrypoint::default(),
            confirmation: ConfirmationPolicy::default(),
        }
    }

    /// Router entry point used by `execute_swap`
    pub fn with_entrypoint(mut self, entrypoint: RouterEntrypoint) -> Self {
        self.entrypoint = entrypoint;
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn account_address(&self) -> Felt {
        self.gateway.account_address()
    }

    pub fn contract_address(&self) -> Felt {
        self.contract_address
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Watcher for the router's `SwapSuccessful` events
    pub fn swap_events(&self) -> SwapEventWatcher<&G> {
        SwapEventWatcher::new(&self.gateway, self.contract_address)
    }

    /// Static metadata of a registered token
    pub fn get_token_info(&self, token: Felt) -> Option<TokenInfo> {
        TOKENS.get(&token).copied()
    }

    /// Get the pool for a token pair
    ///
    /// # Arguments
    /// * `token_a` - First token, becomes `token0` of the result
    /// * `token_b` - Second token, becomes `token1` of the result
    ///
    /// # Returns
    /// Returns the pool in caller order, or `None` when no pool is known
    pub async fn get_pool_config(
        &self,
        token_a: Felt,
        token_b: Felt,
    ) -> Result<Option<PoolDescriptor>> {
        self.pools.pool_for(token_a, token_b).await
    }

    /// Build the router's swap data
    ///
    /// # Arguments
    /// * `token_in` - The token being sold
    /// * `token_out` - The token being bought
    /// * `options` - Amount and optional overrides
    ///
    /// # Returns
    /// Returns `SwapData` with the connected account as caller
    pub async fn create_swap_data(
        &self,
        token_in: Felt,
        token_out: Felt,
        options: &SwapOptions,
    ) -> Result<SwapData> {
        let (swap_data, _) =
            build_swap_data(&self.pools, token_in, token_out, options, self.account_address())
                .await?;
        Ok(swap_data)
    }

    fn approve_call(&self, token: Felt, amount: &BigUint) -> Result<ContractCall> {
        Ok(ContractCall::new(
            token,
            ENTRYPOINT_APPROVE,
            approve_calldata(self.contract_address, amount)?,
        ))
    }

    fn swap_call(
        &self,
        entrypoint: RouterEntrypoint,
        swap_data: &SwapData,
    ) -> Result<ContractCall> {
        Ok(ContractCall::new(
            self.contract_address,
            entrypoint.name(),
            Vec::<Felt>::try_from(swap_data)?,
        ))
    }

    /// Approve and swap calls, in submission order
    ///
    /// # Arguments
    /// * `token_in` - The token being sold
    /// * `swap_data` - Swap data built by `create_swap_data`
    ///
    /// # Returns
    /// Returns the `approve` call on the input token followed by the router swap call
    pub fn swap_calls(&self, token_in: Felt, swap_data: &SwapData) -> Result<Vec<ContractCall>> {
        let amount = BigUint::from(swap_data.params.amount.mag);
        Ok(vec![
            self.approve_call(token_in, &amount)?,
            self.swap_call(self.entrypoint, swap_data)?,
        ])
    }

    /// Approve and swap in one atomic multicall
    ///
    /// # Arguments
    /// * `token_in` - The token being sold
    /// * `token_out` - The token being bought
    /// * `options` - Amount and optional overrides
    ///
    /// # Returns
    /// Returns the transaction hash and the settled deltas
    pub async fn execute_swap(
        &self,
        token_in: Felt,
        token_out: Felt,
        options: &SwapOptions,
    ) -> Result<SwapOutcome> {
        let swap_data = self.create_swap_data(token_in, token_out, options).await?;
        let calls = self.swap_calls(token_in, &swap_data)?;

        let transaction_hash = self.gateway.execute(&calls).await?;
        log::info!(
            "Submitted swap {:#x} via {}",
            transaction_hash,
            self.entrypoint.name()
        );

        self.confirm_swap(transaction_hash, &swap_data).await
    }

    /// Swap through `ekubo_manual_swap` after checking support, balance and allowance
    ///
    /// Unlike `execute_swap` no approval is sent; the router must already be
    /// approved for the amount.
    ///
    /// # Arguments
    /// * `token_in` - The token being sold
    /// * `token_out` - The token being bought
    /// * `options` - Amount and optional overrides
    ///
    /// # Returns
    /// Returns the transaction hash and the settled deltas
    pub async fn execute_ekubo_manual_swap(
        &self,
        token_in: Felt,
        token_out: Felt,
        options: &SwapOptions,
    ) -> Result<SwapOutcome> {
        let swap_data = self.create_swap_data(token_in, token_out, options).await?;
        let required = BigUint::from(swap_data.params.amount.mag);

        if !self.is_token_supported(token_in).await?.supported {
            return Err(AutoSwapprError::UnsupportedToken {
                token: format!("{:#x}", token_in),
            });
        }

        let balance = self.get_token_balance(token_in).await?;
        if balance < required {
            return Err(AutoSwapprError::InsufficientBalance {
                token: format!("{:#x}", token_in),
                required: required.to_string(),
                available: balance.to_string(),
            });
        }

        let allowance = self.get_token_allowance(token_in).await?;
        if allowance < required {
            return Err(AutoSwapprError::InsufficientAllowance {
                token: format!("{:#x}", token_in),
                required: required.to_string(),
                approved: allowance.to_string(),
            });
        }

        let call = self.swap_call(RouterEntrypoint::ManualSwap, &swap_data)?;
        let transaction_hash = self.gateway.execute(&[call]).await?;
        log::info!("Submitted manual swap {:#x}", transaction_hash);

        self.confirm_swap(transaction_hash, &swap_data).await
    }

    /// Estimate the fee of the multicall `execute_swap` would send
    ///
    /// # Returns
    /// Returns the overall fee in the fee token's smallest unit
    pub async fn estimate_swap_gas(
        &self,
        token_in: Felt,
        token_out: Felt,
        options: &SwapOptions,
    ) -> Result<BigUint> {
        let swap_data = self.create_swap_data(token_in, token_out, options).await?;
        let calls = self.swap_calls(token_in, &swap_data)?;
        self.gateway.estimate_fee(&calls).await
    }

    /// Balance of the connected account
    pub async fn get_token_balance(&self, token: Felt) -> Result<BigUint> {
        let call = ContractCall::new(
            token,
            ENTRYPOINT_BALANCE_OF,
            balance_of_calldata(self.account_address()),
        );
        decode_u256(&self.gateway.call(&call).await?)
    }

    /// Amount the router may spend on behalf of the connected account
    pub async fn get_token_allowance(&self, token: Felt) -> Result<BigUint> {
        let call = ContractCall::new(
            token,
            ENTRYPOINT_ALLOWANCE,
            allowance_calldata(self.account_address(), self.contract_address),
        );
        decode_u256(&self.gateway.call(&call).await?)
    }

    /// Approve the router to spend `amount` of `token`
    ///
    /// # Arguments
    /// * `token` - The token to approve
    /// * `amount` - Allowance in the token's smallest unit
    ///
    /// # Returns
    /// Returns the hash of the confirmed approval transaction
    pub async fn approve_tokens(&self, token: Felt, amount: &BigUint) -> Result<Felt> {
        let call = self.approve_call(token, amount)?;
        let transaction_hash = self.gateway.execute(&[call]).await?;
        log::info!("Submitted approval {:#x} for {}", transaction_hash, amount);

        let receipt = self.wait_for_receipt(transaction_hash).await?;
        if let ExecutionStatus::Reverted { reason } = receipt.status {
            return Err(AutoSwapprError::SwapFailed {
                reason: format!("approval reverted: {}", reason),
            });
        }
        Ok(transaction_hash)
    }

    /// Whether the router accepts `token`, and its price feed id
    pub async fn is_token_supported(&self, token: Felt) -> Result<TokenSupport> {
        let call = ContractCall::new(self.contract_address, ENTRYPOINT_TOKEN_STATUS, vec![token]);
        decode_token_support(&self.gateway.call(&call).await?)
    }

    /// Router configuration
    pub async fn get_contract_info(&self) -> Result<ContractInfo> {
        let call = ContractCall::new(self.contract_address, ENTRYPOINT_CONTRACT_PARAMETERS, vec![]);
        decode_contract_info(&self.gateway.call(&call).await?)
    }

    /// Poll until the transaction receipt is available
    pub async fn wait_for_receipt(&self, transaction_hash: Felt) -> Result<Receipt> {
        for attempt in 1..=self.confirmation.max_polls {
            if let Some(receipt) = self.gateway.transaction_receipt(transaction_hash).await? {
                return Ok(receipt);
            }
            log::debug!(
                "Transaction {:#x} not yet included (poll {}/{})",
                transaction_hash,
                attempt,
                self.confirmation.max_polls
            );
            sleep(self.confirmation.poll_interval).await;
        }

        Err(AutoSwapprError::network(format!(
            "waiting for transaction {:#x}",
            transaction_hash
        ))(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("not included after {} polls", self.confirmation.max_polls),
        )))
    }

    async fn confirm_swap(
        &self,
        transaction_hash: Felt,
        swap_data: &SwapData,
    ) -> Result<SwapOutcome> {
        let receipt = self.wait_for_receipt(transaction_hash).await?;
        let result = settle_swap(&receipt, swap_data, self.contract_address)?;
        log::info!(
            "Swap {:#x} settled: amount0 {}{}, amount1 {}{}",
            transaction_hash,
            if result.delta.amount0.is_negative() { "-" } else { "" },
            result.delta.amount0.mag,
            if result.delta.amount1.is_negative() { "-" } else { "" },
            result.delta.amount1.mag
        );
        Ok(SwapOutcome {
            transaction_hash,
            result,
        })
    }
}

fn same_pool(onchain: &PoolKey, ours: &PoolKey) -> bool {
    PairKey::new(onchain.token0, onchain.token1) == PairKey::new(ours.token0, ours.token1)
        && onchain.fee == ours.fee
        && onchain.tick_spacing == ours.tick_spacing
        && onchain.extension == ours.extension
}

fn oriented(delta: Delta, onchain: &PoolKey, ours: &PoolKey) -> Delta {
    if onchain.token0 == ours.token0 {
        delta
    } else {
        Delta {
            amount0: delta.amount1,
            amount1: delta.amount0,
        }
    }
}

fn amount_to_u128(amount: &BigUint) -> Result<u128> {
    amount
        .to_u128()
        .ok_or_else(|| AutoSwapprError::invalid_input(format!("amount {} exceeds u128", amount)))
}

/// Settlement deltas of a swap, ordered like the swap's pool key
///
/// Uses Ekubo core's `Swapped` event for the pool, falling back to the
/// router's `SwapSuccessful` event (input positive, output negative).
fn swap_successful_delta(data: &[Felt], key: &PoolKey) -> Result<Delta> {
    let swap = decode_swap_successful(data)?;
    let amount_in = I129::positive(amount_to_u128(&swap.token_from_amount)?);
    let amount_out = I129::negative(amount_to_u128(&swap.token_to_amount)?);
    Ok(if swap.token_from_address == key.token0 {
        Delta {
            amount0: amount_in,
            amount1: amount_out,
        }
    } else {
        Delta {
            amount0: amount_out,
            amount1: amount_in,
        }
    })
}

pub fn settle_swap(receipt: &Receipt, swap_data: &SwapData, router: Felt) -> Result<SwapResult> {
    if let ExecutionStatus::Reverted { reason } = &receipt.status {
        return Err(AutoSwapprError::SwapFailed {
            reason: reason.clone(),
        });
    }

    let key = &swap_data.pool_key;

    for event in &receipt.events {
        if event.from_address != EKUBO_CORE || event.keys.first() != Some(&SWAPPED_SELECTOR) {
            continue;
        }
        let (onchain, delta) = match decode_swapped(&event.data) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!(
                    "Skipping undecodable Swapped event in {:#x}: {}",
                    receipt.transaction_hash,
                    e
                );
                continue;
            }
        };
        if same_pool(&onchain, key) {
            return Ok(SwapResult {
                delta: oriented(delta, &onchain, key),
            });
        }
    }

    for event in &receipt.events {
        if event.from_address != router || event.keys.first() != Some(&SWAP_SUCCESSFUL_SELECTOR) {
            continue;
        }
        match swap_successful_delta(&event.data, key) {
            Ok(delta) => return Ok(SwapResult { delta }),
            Err(e) => log::warn!(
                "Skipping undecodable SwapSuccessful event in {:#x}: {}",
                receipt.transaction_hash,
                e
            ),
        }
    }

    Err(AutoSwapprError::SwapFailed {
        reason: format!(
            "no swap event in receipt of {:#x}",
            receipt.transaction_hash
        ),
    })
}
