//! Chain provider backed by an ethers HTTP JSON-RPC client

use super::ChainAccessor;
use crate::config::NetworkConfig;
use crate::error::{MintError, MintResult, Rejection};

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider, ProviderError, RpcError};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP provider bound to the chain it reported at connect time
pub struct ChainProvider {
    /// RPC URL, for log lines
    url: String,
    /// Chain ID reported by the node
    chain_id: u64,
    http: Provider<Http>,
}

impl ChainProvider {
    /// Connect and verify the node answers
    pub async fn connect(config: &NetworkConfig) -> MintResult<Self> {
        let http = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| MintError::Config(format!("Invalid RPC URL {}: {}", config.rpc_url, e)))?
            .interval(Duration::from_millis(500));

        let chain_id = http.get_chainid().await.map_err(|e| {
            MintError::Connectivity(format!(
                "Failed to connect to {}: {}",
                config.rpc_url, e
            ))
        })?;
        let chain_id = chain_id.as_u64();

        if let Some(expected) = config.chain_id {
            if expected != chain_id {
                return Err(MintError::Config(format!(
                    "Node at {} serves chain {}, expected {}",
                    config.rpc_url, chain_id, expected
                )));
            }
        }

        info!("Connected to chain {} via {}", chain_id, config.rpc_url);

        Ok(Self {
            url: config.rpc_url.clone(),
            chain_id,
            http,
        })
    }

    fn connectivity(&self, e: ProviderError) -> MintError {
        MintError::Connectivity(format!("{}: {}", self.url, e))
    }
}

#[async_trait]
impl ChainAccessor for ChainProvider {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn transaction_count(&self, address: Address) -> MintResult<U256> {
        self.http
            .get_transaction_count(address, None)
            .await
            .map_err(|e| self.connectivity(e))
    }

    async fn gas_price(&self) -> MintResult<U256> {
        self.http
            .get_gas_price()
            .await
            .map_err(|e| self.connectivity(e))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> MintResult<H256> {
        match self.http.send_raw_transaction(raw).await {
            Ok(pending) => Ok(pending.tx_hash()),
            Err(e) => Err(classify_send_error(e, &self.url)),
        }
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> MintResult<Option<TransactionReceipt>> {
        self.http
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| self.connectivity(e))
    }

    async fn block_number(&self) -> MintResult<u64> {
        self.http
            .get_block_number()
            .await
            .map(|b| b.as_u64())
            .map_err(|e| self.connectivity(e))
    }
}

/// A JSON-RPC error response means the node refused the transaction;
/// anything else is a transport failure.
fn classify_send_error(e: ProviderError, url: &str) -> MintError {
    match RpcError::as_error_response(&e) {
        Some(response) => {
            debug!("eth_sendRawTransaction rejected: {:?}", response);
            MintError::Submission {
                reason: Rejection::classify(&response.message),
                message: response.message.clone(),
            }
        }
        None => MintError::Connectivity(format!("{}: {}", url, e)),
    }
}
