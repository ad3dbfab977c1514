//! Polling watcher for the router's `SwapSuccessful` events
//!
//! The watcher never spawns a task. Callers drive it with [`SwapEventWatcher::poll`],
//! typically from their own interval loop; each poll covers the blocks produced
//! since the previous one.
//!
//! Delivery is at-least-once. The block cursor only moves once every page of a
//! poll has been fetched, so a poll that fails part way is retried from the same
//! block and subscribers can see the events of its earlier pages again.

use starknet::core::types::Felt;

use crate::{
    calldata::decode_swap_successful,
    constants::SWAP_SUCCESSFUL_SELECTOR,
    error::Result,
    gateway::{EventQuery, StarknetGateway},
    types::SwapSuccessfulEvent,
};

const DEFAULT_CHUNK_SIZE: u64 = 100;

/// A decoded `SwapSuccessful` event with its position on chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapNotification {
    pub event: SwapSuccessfulEvent,
    pub transaction_hash: Option<Felt>,
    pub block_number: Option<u64>,
}

pub type SwapHandler = Box<dyn Fn(&SwapNotification) + Send + Sync>;

/// Identifies a subscription for [`SwapEventWatcher::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct SwapEventWatcher<G> {
    gateway: G,
    router: Felt,
    handlers: Vec<(SubscriptionId, SwapHandler)>,
    next_id: u64,
    next_block: Option<u64>,
    chunk_size: u64,
}

impl<G: StarknetGateway> SwapEventWatcher<G> {
    pub fn new(gateway: G, router: Felt) -> Self {
        Self {
            gateway,
            router,
            handlers: Vec::new(),
            next_id: 0,
            next_block: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Start from `block` instead of the chain head at the first poll
    pub fn from_block(mut self, block: u64) -> Self {
        self.next_block = Some(block);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Register a handler called for every swap seen by later polls
    pub fn subscribe(&mut self, handler: SwapHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Remove one handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn unsubscribe_all(&mut self) {
        self.handlers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// First block the next poll will query, `None` before the first poll
    pub fn next_block(&self) -> Option<u64> {
        self.next_block
    }

    /// Fetch new `SwapSuccessful` events and hand each one to every subscriber
    ///
    /// Handlers run as each page arrives. If a later page fails the error is
    /// returned and the cursor stays put, so the next poll delivers the
    /// already handled events again.
    ///
    /// # Returns
    /// Returns the number of events delivered
    pub async fn poll(&mut self) -> Result<usize> {
        let latest = self.gateway.block_number().await?;
        let from_block = *self.next_block.get_or_insert(latest);
        if from_block > latest {
            return Ok(0);
        }

        let mut query = EventQuery {
            address: self.router,
            selectors: vec![SWAP_SUCCESSFUL_SELECTOR],
            from_block,
            to_block: latest,
            continuation_token: None,
            chunk_size: self.chunk_size,
        };

        let mut delivered = 0;
        loop {
            let page = self.gateway.get_events(&query).await?;

            for event in page.events {
                let decoded = match decode_swap_successful(&event.data) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        log::warn!(
                            "Skipping undecodable SwapSuccessful event in {:?}: {}",
                            event.transaction_hash,
                            e
                        );
                        continue;
                    }
                };
                let notification = SwapNotification {
                    event: decoded,
                    transaction_hash: event.transaction_hash,
                    block_number: event.block_number,
                };
                for (_, handler) in &self.handlers {
                    handler(&notification);
                }
                delivered += 1;
            }

            match page.continuation_token {
                Some(token) => query.continuation_token = Some(token),
                None => break,
            }
        }

        self.next_block = Some(latest + 1);
        log::debug!(
            "Polled blocks {}..={} of {:#x}: {} swaps",
            from_block,
            latest,
            self.router,
            delivered
        );
        Ok(delivered)
    }
}
