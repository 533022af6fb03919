pub mod error;
pub mod ethereum;

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

pub use error::TransactionError;

/// Target, calldata and value of a relayed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
}

/// Submits relay transactions from the relayer account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Signs and broadcasts `call` with the next nonce of the relayer account
    async fn submit(&self, call: TxCall) -> Result<Arc<dyn PendingTransaction>, TransactionError>;

    /// Replays `call` against the state at `block_number`. A revert is returned as an error
    /// carrying the revert reason.
    async fn simulate(&self, call: TxCall, block_number: u64) -> Result<(), TransactionError>;

    /// Number of blocks mined on top of `block_number`
    async fn confirmations(&self, block_number: u64) -> Result<u64, TransactionError>;
}

/// A broadcast transaction whose nonce stays fixed while its content may be replaced
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PendingTransaction: Send + Sync {
    /// Hash of the most recent broadcast
    async fn tx_hash(&self) -> B256;

    fn nonce(&self) -> u64;

    /// Broadcasts `call` at the same nonce with a bumped gas price
    async fn replace(&self, call: TxCall) -> Result<B256, TransactionError>;

    /// Waits until any of the broadcasts for this nonce is mined
    async fn await_receipt(&self) -> Result<TxReceipt, TransactionError>;
}
