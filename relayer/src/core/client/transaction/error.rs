use alloy::primitives::B256;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

use crate::types::constant::STALE_ROOT_REASONS;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("No receipt for transaction {0} after waiting")]
    ReceiptTimeout(B256),

    #[error("Error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

impl TransactionError {
    /// Whether the node or the contract rejected the call because its proof
    /// targets an outdated account tree root
    pub fn is_stale_root(&self) -> bool {
        let message = self.to_string();
        STALE_ROOT_REASONS.iter().any(|reason| message.contains(reason))
    }
}
