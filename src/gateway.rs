use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigUint;
use starknet::{
    accounts::{Account, ConnectedAccount, ExecutionEncoding, SingleOwnerAccount},
    core::{
        types::{
            BlockId, BlockTag, Call, EventFilter, ExecutionResult, Felt, FunctionCall,
            StarknetError, TransactionReceipt,
        },
        utils::get_selector_from_name,
    },
    providers::{
        Provider, ProviderError, Url,
        jsonrpc::{HttpTransport, JsonRpcClient},
    },
    signers::{LocalWallet, SigningKey},
};

use crate::{
    config::{AutoSwapprConfig, parse_felt},
    error::{AutoSwapprError, Result},
};

/// A single contract invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Felt,
    pub entrypoint: String,
    pub calldata: Vec<Felt>,
}

impl ContractCall {
    pub fn new(to: Felt, entrypoint: &str, calldata: Vec<Felt>) -> Self {
        Self {
            to,
            entrypoint: entrypoint.to_string(),
            calldata,
        }
    }

    fn selector(&self) -> Result<Felt> {
        get_selector_from_name(&self.entrypoint).map_err(|e| {
            AutoSwapprError::invalid_input(format!("entrypoint {:?}: {}", self.entrypoint, e))
        })
    }
}

/// An event as emitted by a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEvent {
    pub from_address: Felt,
    pub keys: Vec<Felt>,
    pub data: Vec<Felt>,
    pub transaction_hash: Option<Felt>,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Succeeded,
    Reverted { reason: String },
}

/// Receipt of an included transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: Felt,
    pub status: ExecutionStatus,
    pub events: Vec<ChainEvent>,
}

/// Events emitted by `address` with `keys[0]` in `selectors`, within a block range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub address: Felt,
    pub selectors: Vec<Felt>,
    pub from_block: u64,
    pub to_block: u64,
    pub continuation_token: Option<String>,
    pub chunk_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<ChainEvent>,
    pub continuation_token: Option<String>,
}

/// Narrow interface to a Starknet node and the signing account
#[async_trait]
pub trait StarknetGateway: Send + Sync {
    /// Address of the signing account
    fn account_address(&self) -> Felt;

    /// Read-only call against the latest block
    async fn call(&self, call: &ContractCall) -> Result<Vec<Felt>>;

    /// Sign and submit the calls as one atomic multicall
    ///
    /// Returns the transaction hash.
    async fn execute(&self, calls: &[ContractCall]) -> Result<Felt>;

    /// Overall fee the multicall would cost
    async fn estimate_fee(&self, calls: &[ContractCall]) -> Result<BigUint>;

    /// Receipt of a transaction, or `None` while it is not yet known to the node
    async fn transaction_receipt(&self, transaction_hash: Felt) -> Result<Option<Receipt>>;

    async fn block_number(&self) -> Result<u64>;

    async fn get_events(&self, query: &EventQuery) -> Result<EventPage>;
}

#[async_trait]
impl<T: StarknetGateway + ?Sized> StarknetGateway for Arc<T> {
    fn account_address(&self) -> Felt {
        (**self).account_address()
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<Felt>> {
        (**self).call(call).await
    }

    async fn execute(&self, calls: &[ContractCall]) -> Result<Felt> {
        (**self).execute(calls).await
    }

    async fn estimate_fee(&self, calls: &[ContractCall]) -> Result<BigUint> {
        (**self).estimate_fee(calls).await
    }

    async fn transaction_receipt(&self, transaction_hash: Felt) -> Result<Option<Receipt>> {
        (**self).transaction_receipt(transaction_hash).await
    }

    async fn block_number(&self) -> Result<u64> {
        (**self).block_number().await
    }

    async fn get_events(&self, query: &EventQuery) -> Result<EventPage> {
        (**self).get_events(query).await
    }
}

#[async_trait]
impl<T: StarknetGateway + ?Sized> StarknetGateway for &T {
    fn account_address(&self) -> Felt {
        (**self).account_address()
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<Felt>> {
        (**self).call(call).await
    }

    async fn execute(&self, calls: &[ContractCall]) -> Result<Felt> {
        (**self).execute(calls).await
    }

    async fn estimate_fee(&self, calls: &[ContractCall]) -> Result<BigUint> {
        (**self).estimate_fee(calls).await
    }

    async fn transaction_receipt(&self, transaction_hash: Felt) -> Result<Option<Receipt>> {
        (**self).transaction_receipt(transaction_hash).await
    }

    async fn block_number(&self) -> Result<u64> {
        (**self).block_number().await
    }

    async fn get_events(&self, query: &EventQuery) -> Result<EventPage> {
        (**self).get_events(query).await
    }
}

type RpcAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

/// Gateway over a JSON-RPC node with a single-owner account
pub struct RpcGateway {
    account: RpcAccount,
}

impl RpcGateway {
    /// Connect to the node and set up the signing account
    ///
    /// # Arguments
    /// * `config` - Client configuration holding the RPC URL and account credentials
    ///
    /// # Returns
    /// Returns a gateway bound to the node's chain id
    pub async fn connect(config: &AutoSwapprConfig) -> Result<Self> {
        config.validate()?;

        let url = Url::parse(&config.rpc_url)
            .map_err(|e| AutoSwapprError::invalid_input(format!("invalid rpc_url: {}", e)))?;
        let provider = JsonRpcClient::new(HttpTransport::new(url));

        let chain_id = provider
            .chain_id()
            .await
            .map_err(AutoSwapprError::network("fetching chain id"))?;

        let signer = LocalWallet::from(SigningKey::from_secret_scalar(parse_felt(
            &config.private_key,
            "private_key",
        )?));

        let account = SingleOwnerAccount::new(
            provider,
            signer,
            config.account_felt()?,
            chain_id,
            ExecutionEncoding::New,
        );

        log::info!(
            "Connected to {} as {:#x} (chain id {:#x})",
            config.rpc_url,
            config.account_felt()?,
            chain_id
        );

        Ok(Self { account })
    }

    fn to_calls(calls: &[ContractCall]) -> Result<Vec<Call>> {
        calls
            .iter()
            .map(|call| {
                Ok(Call {
                    to: call.to,
                    selector: call.selector()?,
                    calldata: call.calldata.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl StarknetGateway for RpcGateway {
    fn account_address(&self) -> Felt {
        self.account.address()
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<Felt>> {
        let request = FunctionCall {
            contract_address: call.to,
            entry_point_selector: call.selector()?,
            calldata: call.calldata.clone(),
        };
        self.account
            .provider()
            .call(request, BlockId::Tag(BlockTag::Latest))
            .await
            .map_err(AutoSwapprError::network(format!("calling {}", call.entrypoint)))
    }

    async fn execute(&self, calls: &[ContractCall]) -> Result<Felt> {
        let result = self
            .account
            .execute_v3(Self::to_calls(calls)?)
            .send()
            .await
            .map_err(AutoSwapprError::network("submitting transaction"))?;
        Ok(result.transaction_hash)
    }

    async fn estimate_fee(&self, calls: &[ContractCall]) -> Result<BigUint> {
        let estimate = self
            .account
            .execute_v3(Self::to_calls(calls)?)
            .estimate_fee()
            .await
            .map_err(AutoSwapprError::network("estimating fee"))?;
        Ok(estimate.overall_fee.to_biguint())
    }

    async fn transaction_receipt(&self, transaction_hash: Felt) -> Result<Option<Receipt>> {
        let receipt = match self
            .account
            .provider()
            .get_transaction_receipt(transaction_hash)
            .await
        {
            Ok(receipt) => receipt,
            Err(ProviderError::StarknetError(StarknetError::TransactionHashNotFound)) => {
                return Ok(None);
            }
            Err(e) => {
                return Err(AutoSwapprError::network("fetching transaction receipt")(e));
            }
        };

        let block_number = receipt.block.block_number();
        let (events, execution_result) = match receipt.receipt {
            TransactionReceipt::Invoke(r) => (r.events, r.execution_result),
            TransactionReceipt::L1Handler(r) => (r.events, r.execution_result),
            TransactionReceipt::Declare(r) => (r.events, r.execution_result),
            TransactionReceipt::Deploy(r) => (r.events, r.execution_result),
            TransactionReceipt::DeployAccount(r) => (r.events, r.execution_result),
        };

        let status = match execution_result {
            ExecutionResult::Succeeded => ExecutionStatus::Succeeded,
            ExecutionResult::Reverted { reason } => ExecutionStatus::Reverted { reason },
        };

        Ok(Some(Receipt {
            transaction_hash,
            status,
            events: events
                .into_iter()
                .map(|event| ChainEvent {
                    from_address: event.from_address,
                    keys: event.keys,
                    data: event.data,
                    transaction_hash: Some(transaction_hash),
                    block_number,
                })
                .collect(),
        }))
    }

    async fn block_number(&self) -> Result<u64> {
        self.account
            .provider()
            .block_number()
            .await
            .map_err(AutoSwapprError::network("fetching block number"))
    }

    async fn get_events(&self, query: &EventQuery) -> Result<EventPage> {
        let filter = EventFilter {
            from_block: Some(BlockId::Number(query.from_block)),
            to_block: Some(BlockId::Number(query.to_block)),
            address: Some(query.address),
            keys: Some(vec![query.selectors.clone()]),
        };
        let page = self
            .account
            .provider()
            .get_events(filter, query.continuation_token.clone(), query.chunk_size)
            .await
            .map_err(AutoSwapprError::network("fetching events"))?;

        Ok(EventPage {
            events: page
                .events
                .into_iter()
                .map(|event| ChainEvent {
                    from_address: event.from_address,
                    keys: event.keys,
                    data: event.data,
                    transaction_hash: Some(event.transaction_hash),
                    block_number: event.block_number,
                })
                .collect(),
            continuation_token: page.continuation_token,
        })
    }
}
