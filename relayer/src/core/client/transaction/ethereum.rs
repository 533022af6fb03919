use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{PendingTransaction, TransactionError, TransactionManager, TxCall, TxReceipt};
use crate::types::constant::MAX_RECEIPT_ATTEMPTS;
use crate::types::params::ChainParams;

pub struct EthereumTransactionManager {
    provider: DynProvider,
    address: Address,
    chain_id: Option<u64>,
    gas_price: Option<u128>,
    gas_bump_percent: u64,
    poll_interval: Duration,
}

impl EthereumTransactionManager {
    pub fn new(params: &ChainParams) -> Result<Self, TransactionError> {
        let signer: PrivateKeySigner =
            params.private_key.parse().map_err(|e| TransactionError::InvalidPrivateKey(format!("{e}")))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(params.rpc_url.clone()).erased();

        Ok(Self {
            provider,
            address,
            chain_id: params.chain_id,
            gas_price: params.gas_price,
            gas_bump_percent: params.gas_bump_percent,
            poll_interval: params.receipt_poll_interval,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn request(&self, call: &TxCall) -> TransactionRequest {
        request(self.address, self.chain_id, call)
    }
}

#[async_trait]
impl TransactionManager for EthereumTransactionManager {
    async fn submit(&self, call: TxCall) -> Result<Arc<dyn PendingTransaction>, TransactionError> {
        let nonce = self.provider.get_transaction_count(self.address).pending().await?;
        let gas_price = match self.gas_price {
            Some(price) => price,
            None => self.provider.get_gas_price().await?,
        };
        // Estimation runs the call, a stale proof is rejected here before anything is broadcast
        let gas_limit = self.provider.estimate_gas(self.request(&call)).await?;

        let tx = self.request(&call).with_nonce(nonce).with_gas_price(gas_price).with_gas_limit(gas_limit);
        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, nonce = nonce, gas_price = gas_price, "Transaction broadcast");

        Ok(Arc::new(EthereumPendingTransaction {
            provider: self.provider.clone(),
            address: self.address,
            chain_id: self.chain_id,
            nonce,
            gas_limit,
            gas_bump_percent: self.gas_bump_percent,
            poll_interval: self.poll_interval,
            state: Mutex::new(PendingState { hashes: vec![tx_hash], gas_price }),
        }))
    }

    async fn simulate(&self, call: TxCall, block_number: u64) -> Result<(), TransactionError> {
        self.provider
            .call(self.request(&call))
            .block(BlockId::number(block_number))
            .await
            .map(|_| ())
            .map_err(|e| TransactionError::Reverted(e.to_string()))
    }

    async fn confirmations(&self, block_number: u64) -> Result<u64, TransactionError> {
        let latest_block = self.provider.get_block_number().await?;
        Ok(latest_block.saturating_sub(block_number))
    }
}

struct PendingState {
    /// every hash broadcast for the nonce, oldest first
    hashes: Vec<B256>,
    gas_price: u128,
}

fn request(from: Address, chain_id: Option<u64>, call: &TxCall) -> TransactionRequest {
    let request = TransactionRequest::default()
        .with_from(from)
        .with_to(call.to)
        .with_input(call.data.clone())
        .with_value(call.value);
    match chain_id {
        Some(chain_id) => request.with_chain_id(chain_id),
        None => request,
    }
}

pub struct EthereumPendingTransaction {
    provider: DynProvider,
    address: Address,
    chain_id: Option<u64>,
    nonce: u64,
    gas_limit: u64,
    gas_bump_percent: u64,
    poll_interval: Duration,
    state: Mutex<PendingState>,
}

impl EthereumPendingTransaction {
    fn bump(&self, gas_price: u128) -> u128 {
        gas_price + gas_price * self.gas_bump_percent as u128 / 100
    }
}

#[async_trait]
impl PendingTransaction for EthereumPendingTransaction {
    async fn tx_hash(&self) -> B256 {
        let state = self.state.lock().await;
        // hashes is never empty, the first broadcast happens before construction
        state.hashes.last().copied().unwrap_or_default()
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    async fn replace(&self, call: TxCall) -> Result<B256, TransactionError> {
        let mut state = self.state.lock().await;
        let gas_price = self.bump(state.gas_price);
        let tx = request(self.address, self.chain_id, &call)
            .with_nonce(self.nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(self.gas_limit);

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        state.hashes.push(tx_hash);
        state.gas_price = gas_price;
        info!(tx_hash = %tx_hash, nonce = self.nonce, gas_price = gas_price, "Replacement transaction broadcast");
        Ok(tx_hash)
    }

    async fn await_receipt(&self) -> Result<TxReceipt, TransactionError> {
        for _ in 0..MAX_RECEIPT_ATTEMPTS {
            let hashes = self.state.lock().await.hashes.clone();
            // newest first, a replacement is the likeliest to be mined
            for hash in hashes.iter().rev() {
                let receipt = match self.provider.get_transaction_receipt(*hash).await {
                    Ok(receipt) => receipt,
                    Err(e) => {
                        // transient, the broadcast may still be mined
                        warn!(tx_hash = %hash, error = %e, "Failed to poll receipt");
                        continue;
                    }
                };
                // receipts without a block number belong to a block that is not sealed yet
                if let Some((receipt, block_number)) =
                    receipt.and_then(|receipt| receipt.block_number.map(|block| (receipt, block)))
                {
                    debug!(tx_hash = %receipt.transaction_hash, block_number = block_number, "Receipt found");
                    return Ok(TxReceipt {
                        tx_hash: receipt.transaction_hash,
                        block_number,
                        success: receipt.status(),
                    });
                }
            }
            sleep(self.poll_interval).await;
        }

        let tx_hash = self.tx_hash().await;
        warn!(tx_hash = %tx_hash, nonce = self.nonce, "Transaction not mined in time");
        Err(TransactionError::ReceiptTimeout(tx_hash))
    }
}
