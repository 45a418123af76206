//! The single transaction a submission builds and signs

use crate::error::{MintError, MintResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use ethers::utils::keccak256;

/// Unsigned contract call, built fresh for every submission
#[derive(Debug, Clone, PartialEq)]
pub struct MintRequest {
    pub from: Address,
    pub to: Address,
    pub nonce: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

/// A request together with its signed wire encoding
#[derive(Debug, Clone)]
pub struct SignedMint {
    pub request: MintRequest,
    /// RLP-encoded signed transaction
    pub raw: Bytes,
    /// keccak256 of `raw`
    pub hash: H256,
}

impl MintRequest {
    /// Legacy (type 0) transaction with EIP-155 chain ID
    pub fn to_typed(&self) -> TypedTransaction {
        let tx = TransactionRequest::new()
            .from(self.from)
            .to(self.to)
            .nonce(self.nonce)
            .gas(self.gas_limit)
            .gas_price(self.gas_price)
            .data(self.data.clone())
            .chain_id(self.chain_id);

        TypedTransaction::Legacy(tx)
    }

    /// Sign with the wallet this request was built for
    pub async fn sign(self, wallet: &LocalWallet) -> MintResult<SignedMint> {
        if wallet.address() != self.from {
            return Err(MintError::Credential(format!(
                "Wallet {:?} cannot sign for {:?}",
                wallet.address(),
                self.from
            )));
        }

        let wallet = wallet.clone().with_chain_id(self.chain_id);
        let tx = self.to_typed();

        let signature = wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| MintError::Credential(format!("Failed to sign transaction: {}", e)))?;

        let raw = tx.rlp_signed(&signature);
        let hash = H256::from(keccak256(&raw));

        Ok(SignedMint {
            request: self,
            raw,
            hash,
        })
    }
}
