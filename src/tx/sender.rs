//! Mint transaction submitter
//!
//! Builds exactly one transaction per call, signs it, broadcasts it and waits
//! for a confirmed receipt. Nothing is retried: a stale nonce or an
//! underpriced gas price surfaces as a `Submission` error.

use super::gas::GasEstimator;
use super::outcome::Outcome;
use super::request::MintRequest;
use crate::chain::{ChainAccessor, ConfirmationWatcher};
use crate::config::SubmissionConfig;
use crate::contract::ContractReference;
use crate::error::{MintError, MintResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::utils::format_ether;
use tracing::{debug, info, warn};

/// Signs and submits a contract's mint call through a chain accessor
pub struct MintSubmitter<A> {
    accessor: A,
    gas_estimator: GasEstimator,
    watcher: ConfirmationWatcher,
    /// ABI function to call
    function: String,
}

impl<A: ChainAccessor> MintSubmitter<A> {
    pub fn new(accessor: A, config: &SubmissionConfig) -> Self {
        Self {
            accessor,
            gas_estimator: GasEstimator::new(config.gas_limit),
            watcher: ConfirmationWatcher::new(config),
            function: "mint".to_string(),
        }
    }

    /// Call a different zero-argument function than `mint`
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// Submit the mint call and wait for its receipt
    pub async fn submit_mint(
        &self,
        private_key: &str,
        contract: &ContractReference,
    ) -> MintResult<Outcome> {
        // Everything that can fail locally happens before the first network call
        let wallet = load_wallet(private_key)?;
        let from = wallet.address();
        let data = contract.encode_call(&self.function)?;

        let nonce = self.accessor.transaction_count(from).await?;
        let gas_price = self.gas_estimator.get_gas_price(&self.accessor).await?;
        let gas_limit = self.gas_estimator.gas_limit();

        let request = MintRequest {
            from,
            to: contract.address(),
            nonce,
            gas_limit,
            gas_price,
            data,
            chain_id: self.accessor.chain_id(),
        };

        let signed = request.sign(&wallet).await?;
        let function = contract.decode_call(&signed.request.data)?;
        debug!(
            "Signed {} call from {:?}: nonce {}, gas limit {}, max fee {} ETH",
            function.signature(),
            signed.request.from,
            signed.request.nonce,
            signed.request.gas_limit,
            format_ether(GasEstimator::calculate_cost(gas_limit, gas_price))
        );

        let tx_hash = self.accessor.send_raw_transaction(signed.raw.clone()).await?;

        info!("Transaction sent! Hash: {:?}", tx_hash);
        if tx_hash != signed.hash {
            warn!(
                "Node returned hash {:?}, locally computed {:?}",
                tx_hash, signed.hash
            );
        }

        let receipt = self.watcher.wait(&self.accessor, tx_hash).await?;
        let outcome = Outcome::from_receipt(tx_hash, &receipt);

        if outcome.success {
            info!("{}", outcome.summary());
        } else {
            warn!("{}", outcome.summary());
        }

        Ok(outcome)
    }
}

/// Parse a hex private key into a signing wallet
pub fn load_wallet(private_key: &str) -> MintResult<LocalWallet> {
    let key = private_key.trim();
    if key.is_empty() {
        return Err(MintError::Config("No private key provided".to_string()));
    }

    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);
    if digits.len() != 64 {
        return Err(MintError::Credential(format!(
            "Invalid private key: expected 32 bytes of hex, got {} characters",
            digits.len()
        )));
    }

    digits
        .parse::<LocalWallet>()
        .map_err(|e| MintError::Credential(format!("Invalid private key: {}", e)))
}
