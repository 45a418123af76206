//! Chain module - network access for a single submission
//!
//! This module provides:
//! - The `ChainAccessor` seam the submitter talks through
//! - An ethers HTTP implementation of it
//! - Receipt polling with a bounded wait

pub mod finality;
pub mod provider;

pub use finality::ConfirmationWatcher;
pub use provider::ChainProvider;

use crate::error::MintResult;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};

#[cfg(test)]
use mockall::automock;

/// Read and write access to the network the contract lives on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainAccessor: Send + Sync {
    /// Chain ID used for replay protection
    fn chain_id(&self) -> u64;

    /// Number of transactions sent from `address` (its next nonce)
    async fn transaction_count(&self, address: Address) -> MintResult<U256>;

    /// Current spot gas price in wei
    async fn gas_price(&self) -> MintResult<U256>;

    /// Broadcast RLP-encoded signed transaction bytes
    async fn send_raw_transaction(&self, raw: Bytes) -> MintResult<H256>;

    /// Receipt for a mined transaction, `None` while pending
    async fn transaction_receipt(&self, tx_hash: H256) -> MintResult<Option<TransactionReceipt>>;

    /// Latest block number
    async fn block_number(&self) -> MintResult<u64>;
}
