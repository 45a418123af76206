//! Receipt polling for a submitted transaction
//!
//! Polls with exponential backoff until the transaction is mined and buried
//! under the required number of blocks, or until the deadline passes. A receipt
//! that disappears between polls (reorg) puts the watcher back into waiting.

use super::ChainAccessor;
use crate::config::SubmissionConfig;
use crate::error::{MintError, MintResult};

use ethers::types::{TransactionReceipt, H256};
use std::cmp::min;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Deadline used when the configured timeout does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Waits for a transaction to reach a terminal, confirmed state
#[derive(Debug, Clone)]
pub struct ConfirmationWatcher {
    /// First delay between polls
    poll_interval: Duration,
    /// Ceiling for the backed-off delay
    max_poll_interval: Duration,
    backoff_factor: u32,
    timeout: Duration,
    /// Required confirmation blocks (1 = mined)
    confirmations: u64,
}

impl ConfirmationWatcher {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_poll_interval: config.max_poll_interval(),
            backoff_factor: config.backoff_factor.max(1),
            timeout: config.confirmation_timeout(),
            confirmations: config.confirmations.max(1),
        }
    }

    /// Block until the receipt is final or the configured timeout elapses
    pub async fn wait<A>(&self, accessor: &A, tx_hash: H256) -> MintResult<TransactionReceipt>
    where
        A: ChainAccessor + ?Sized,
    {
        let now = Instant::now();
        let deadline = now
            .checked_add(self.timeout)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.wait_until(accessor, tx_hash, deadline).await
    }

    /// Block until the receipt is final or `deadline` passes
    pub async fn wait_until<A>(
        &self,
        accessor: &A,
        tx_hash: H256,
        deadline: Instant,
    ) -> MintResult<TransactionReceipt>
    where
        A: ChainAccessor + ?Sized,
    {
        let mut delay = self.poll_interval;
        let mut polls = 0u32;

        loop {
            polls += 1;

            if let Some(receipt) = accessor.transaction_receipt(tx_hash).await? {
                if let Some(block) = receipt.block_number.map(|b| b.as_u64()) {
                    let confirmations = self.confirmations_at(accessor, block).await?;

                    if confirmations >= self.confirmations {
                        info!(
                            "Transaction {:?} confirmed in block {} ({} confirmations)",
                            tx_hash, block, confirmations
                        );
                        return Ok(receipt);
                    }

                    debug!(
                        "Transaction {:?} has {} / {} confirmations",
                        tx_hash, confirmations, self.confirmations
                    );
                }
            } else {
                debug!("Transaction {:?} pending (poll {})", tx_hash, polls);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(MintError::Timeout {
                    operation: format!("receipt of {:?} after {} polls", tx_hash, polls),
                });
            }

            sleep(min(delay, deadline - now)).await;
            delay = self.next_delay(delay);
        }
    }

    /// Back off `delay`, saturating at the configured ceiling
    fn next_delay(&self, delay: Duration) -> Duration {
        delay
            .checked_mul(self.backoff_factor)
            .map_or(self.max_poll_interval, |d| min(d, self.max_poll_interval))
    }

    /// Blocks on top of and including `block`
    async fn confirmations_at<A>(&self, accessor: &A, block: u64) -> MintResult<u64>
    where
        A: ChainAccessor + ?Sized,
    {
        if self.confirmations <= 1 {
            return Ok(1);
        }

        let head = accessor.block_number().await?;
        Ok((head + 1).saturating_sub(block))
    }
}
