//! Terminal result of a submission

use crate::error::{MintError, MintResult};

use ethers::types::{TransactionReceipt, H256, U256, U64};

/// Status line for a successful mint
pub const MINT_SUCCEEDED: &str = "NFT minted successfully!";
/// Status line for a reverted mint
pub const MINT_FAILED: &str = "Minting failed";

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Hash returned by the broadcast
    pub tx_hash: H256,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

impl Outcome {
    /// Build from a mined receipt. Only an explicit status of 1 counts as success.
    pub fn from_receipt(tx_hash: H256, receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash,
            success: receipt.status == Some(U64::from(1)),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used,
        }
    }

    pub fn status_line(&self) -> &'static str {
        if self.success {
            MINT_SUCCEEDED
        } else {
            MINT_FAILED
        }
    }

    /// Status line with the inclusion block and gas used
    pub fn summary(&self) -> String {
        let block = self
            .block_number
            .map_or_else(|| "unknown".to_string(), |b| b.to_string());
        let gas = self
            .gas_used
            .map_or_else(|| "unknown".to_string(), |g| g.to_string());
        format!(
            "{} Tx {:?}, block {}, gas used {}",
            self.status_line(),
            self.tx_hash,
            block,
            gas
        )
    }

    /// Turn a reverted outcome into an `Execution` error
    pub fn into_result(self) -> MintResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(MintError::Execution {
                tx_hash: format!("{:?}", self.tx_hash),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(status: Option<u64>) -> TransactionReceipt {
        TransactionReceipt {
            status: status.map(U64::from),
            block_number: Some(U64::from(12)),
            gas_used: Some(U256::from(51_234)),
            ..Default::default()
        }
    }

    #[test]
    fn status_one_is_success() {
        let outcome = Outcome::from_receipt(H256::repeat_byte(9), &receipt(Some(1)));
        assert!(outcome.success);
        assert_eq!(outcome.status_line(), MINT_SUCCEEDED);
        assert_eq!(outcome.block_number, Some(12));
        assert_eq!(outcome.gas_used, Some(U256::from(51_234)));
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn status_zero_is_failure() {
        let outcome = Outcome::from_receipt(H256::repeat_byte(9), &receipt(Some(0)));
        assert!(!outcome.success);
        assert_eq!(outcome.status_line(), "Minting failed");
        assert!(matches!(
            outcome.into_result(),
            Err(MintError::Execution { ref tx_hash }) if tx_hash.starts_with("0x0909")
        ));
    }

    #[test]
    fn summary_reports_block_and_gas() {
        let outcome = Outcome::from_receipt(H256::repeat_byte(9), &receipt(Some(1)));
        let summary = outcome.summary();
        assert!(summary.starts_with(MINT_SUCCEEDED));
        assert!(summary.contains("block 12"));
        assert!(summary.contains("gas used 51234"));

        let pending = Outcome {
            block_number: None,
            gas_used: None,
            ..outcome
        };
        assert!(pending.summary().contains("block unknown, gas used unknown"));
    }

    #[test]
    fn missing_status_is_failure() {
        let outcome = Outcome::from_receipt(H256::zero(), &receipt(None));
        assert!(!outcome.success);
    }
}
