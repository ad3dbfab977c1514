use std::sync::Mutex;

use alloy::{
    primitives::{Address, B256, I256, U160, U256, address, aliases::I24},
    rpc::types::Log,
    sol_types::SolEvent,
};
use assert_matches::assert_matches;
use async_trait::async_trait;
use autoswappr_sdk::{
    AutoSwapprBase, AutoSwapprError, BASE_CNGN, BASE_USDC, BaseConfig, BaseGateway, BaseReceipt,
    IAerodromePool, PoolState, Result,
};

const POOL: Address = address!("0x00000000000000000000000000000000000000a1");
const SIGNER: Address = address!("0x00000000000000000000000000000000000000b2");
const ONE_USDC: u64 = 1_000_000;

struct BaseState {
    signer: Option<Address>,
    token0: Address,
    token1: Address,
    fee: u32,
    allowance: U256,
    quote: U256,
    approve_succeeds: bool,
    swap_succeeds: bool,
    swap_logs: Vec<Log>,
    approvals: Vec<(Address, Address, U256)>,
    swaps: Vec<(Address, Address, bool, I256, U160)>,
    quoted_fees: Vec<u32>,
}

struct MockBase {
    state: Mutex<BaseState>,
}

impl MockBase {
    fn new() -> Self {
        Self {
            state: Mutex::new(BaseState {
                signer: Some(SIGNER),
                token0: BASE_CNGN,
                token1: BASE_USDC,
                fee: 100,
                allowance: U256::ZERO,
                quote: U256::from(1_500_000_000u64),
                approve_succeeds: true,
                swap_succeeds: true,
                swap_logs: Vec::new(),
                approvals: Vec::new(),
                swaps: Vec::new(),
                quoted_fees: Vec::new(),
            }),
        }
    }

    fn with<F: FnOnce(&mut BaseState)>(self, f: F) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }
}

#[async_trait]
impl BaseGateway for MockBase {
    fn signer_address(&self) -> Option<Address> {
        self.state.lock().unwrap().signer
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        assert_eq!(pool, POOL);
        let state = self.state.lock().unwrap();
        Ok(PoolState {
            token0: state.token0,
            token1: state.token1,
            sqrt_price_x96: U256::from(1u8) << 96,
            tick: 0,
            fee: state.fee,
            liquidity: 1_000_000,
        })
    }

    async fn pool_fee(&self, _pool: Address) -> Result<u32> {
        Ok(self.state.lock().unwrap().fee)
    }

    async fn quote_exact_input_single(
        &self,
        _quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        _amount_in: U256,
    ) -> Result<U256> {
        assert_eq!((token_in, token_out), (BASE_USDC, BASE_CNGN));
        let mut state = self.state.lock().unwrap();
        state.quoted_fees.push(fee);
        Ok(state.quote)
    }

    async fn balance_of(&self, _token: Address, _owner: Address) -> Result<U256> {
        Ok(U256::from(ONE_USDC))
    }

    async fn allowance(&self, _token: Address, owner: Address, spender: Address) -> Result<U256> {
        assert_eq!((owner, spender), (SIGNER, POOL));
        Ok(self.state.lock().unwrap().allowance)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<BaseReceipt> {
        let mut state = self.state.lock().unwrap();
        state.approvals.push((token, spender, amount));
        if state.approve_succeeds {
            state.allowance = amount;
        }
        Ok(BaseReceipt {
            transaction_hash: B256::repeat_byte(0xaa),
            success: state.approve_succeeds,
            logs: Vec::new(),
        })
    }

    async fn swap(
        &self,
        pool: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U160,
    ) -> Result<BaseReceipt> {
        let mut state = self.state.lock().unwrap();
        state.swaps.push((
            pool,
            recipient,
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
        ));
        Ok(BaseReceipt {
            transaction_hash: B256::repeat_byte(0x55),
            success: state.swap_succeeds,
            logs: state.swap_logs.clone(),
        })
    }
}

fn swap_log(amount0: I256, amount1: I256) -> Log {
    let event = IAerodromePool::Swap {
        sender: SIGNER,
        recipient: SIGNER,
        amount0,
        amount1,
        sqrtPriceX96: U160::from(1u8) << 96,
        liquidity: 1_000_000,
        tick: I24::ZERO,
    };
    Log {
        inner: alloy::primitives::Log {
            address: POOL,
            data: event.encode_log_data(),
        },
        ..Default::default()
    }
}

fn client(mock: MockBase) -> AutoSwapprBase<MockBase> {
    AutoSwapprBase::new(mock, BaseConfig::mainnet("http://127.0.0.1:9", POOL))
}

#[tokio::test]
async fn test_swap_approves_when_allowance_is_short() -> anyhow::Result<()> {
    let paid = I256::try_from(-1_490_000_000i64).unwrap();
    let received = I256::try_from(ONE_USDC).unwrap();
    let client = client(MockBase::new().with(|s| {
        s.allowance = U256::from(10u8);
        s.swap_logs = vec![swap_log(paid, received)];
    }));

    let outcome = client
        .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
        .await?;

    let state = client.gateway().state.lock().unwrap();
    assert_eq!(state.approvals, vec![(BASE_USDC, POOL, U256::from(ONE_USDC))]);
    assert_eq!(outcome.approval_hash, Some(B256::repeat_byte(0xaa)));
    assert_eq!(outcome.transaction_hash, B256::repeat_byte(0x55));
    assert_eq!(outcome.amount0, Some(paid));
    assert_eq!(outcome.amount1, Some(received));
    assert_eq!(outcome.expected_output, U256::from(1_500_000_000u64));
    assert_eq!(outcome.min_output, U256::from(1_492_500_000u64));
    Ok(())
}

#[tokio::test]
async fn test_swap_skips_approval_when_allowance_covers_amount() -> anyhow::Result<()> {
    let client = client(MockBase::new().with(|s| s.allowance = U256::from(ONE_USDC)));

    let outcome = client
        .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
        .await?;

    let state = client.gateway().state.lock().unwrap();
    assert!(state.approvals.is_empty());
    assert_eq!(outcome.approval_hash, None);
    assert_eq!(state.swaps.len(), 1);

    let (pool, recipient, zero_for_one, amount, limit) = state.swaps[0];
    assert_eq!(pool, POOL);
    assert_eq!(recipient, SIGNER);
    assert!(!zero_for_one);
    assert_eq!(amount, I256::try_from(ONE_USDC).unwrap());
    assert_eq!(U256::from(limit), outcome.sqrt_price_limit_x96);
    // No Swap event in the receipt
    assert_eq!(outcome.amount0, None);
    Ok(())
}

#[tokio::test]
async fn test_swap_sends_to_explicit_recipient() -> anyhow::Result<()> {
    let recipient = address!("0x00000000000000000000000000000000000000c3");
    let client = client(MockBase::new().with(|s| s.allowance = U256::MAX));

    client
        .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, Some(recipient))
        .await?;

    assert_eq!(client.gateway().state.lock().unwrap().swaps[0].1, recipient);
    Ok(())
}

#[tokio::test]
async fn test_swap_rejects_reversed_pool_before_sending() {
    let client = client(MockBase::new().with(|s| {
        s.token0 = BASE_USDC;
        s.token1 = BASE_CNGN;
    }));

    assert_matches!(
        client
            .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
            .await,
        Err(AutoSwapprError::TokensMismatch { .. })
    );
    let state = client.gateway().state.lock().unwrap();
    assert!(state.approvals.is_empty());
    assert!(state.swaps.is_empty());
}

#[tokio::test]
async fn test_reverted_approval_stops_the_swap() {
    let client = client(MockBase::new().with(|s| s.approve_succeeds = false));

    assert_matches!(
        client
            .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
            .await,
        Err(AutoSwapprError::SwapFailed { reason }) if reason.contains("approval")
    );
    assert!(client.gateway().state.lock().unwrap().swaps.is_empty());
}

#[tokio::test]
async fn test_reverted_swap_is_swap_failed() {
    let client = client(MockBase::new().with(|s| {
        s.allowance = U256::MAX;
        s.swap_succeeds = false;
    }));

    assert_matches!(
        client
            .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
            .await,
        Err(AutoSwapprError::SwapFailed { reason }) if reason.contains("swap")
    );
}

#[tokio::test]
async fn test_estimate_uses_pool_fee() -> anyhow::Result<()> {
    let client = client(MockBase::new().with(|s| s.fee = 500));

    let quote = client.estimate_cngn_output(U256::from(ONE_USDC)).await?;

    assert_eq!(quote, U256::from(1_500_000_000u64));
    assert_eq!(client.gateway().state.lock().unwrap().quoted_fees, vec![500]);
    Ok(())
}

#[tokio::test]
async fn test_read_only_client_cannot_swap() {
    let client = client(MockBase::new().with(|s| s.signer = None));

    assert_matches!(
        client
            .swap_usdc_for_cngn(U256::from(ONE_USDC), 50, None)
            .await,
        Err(AutoSwapprError::SignerRequired)
    );
    assert!(client.gateway().state.lock().unwrap().swaps.is_empty());
}
