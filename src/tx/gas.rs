//! Gas parameters for the mint transaction

use crate::chain::ChainAccessor;
use crate::error::MintResult;

use ethers::types::U256;
use ethers::utils::format_units;
use tracing::debug;

/// Fixed gas limit plus the network's spot gas price
pub struct GasEstimator {
    /// Gas limit ceiling from configuration, not estimated
    gas_limit: U256,
}

impl GasEstimator {
    pub fn new(gas_limit: u64) -> Self {
        Self {
            gas_limit: U256::from(gas_limit),
        }
    }

    pub fn gas_limit(&self) -> U256 {
        self.gas_limit
    }

    /// Current gas price, taken as-is
    pub async fn get_gas_price<A>(&self, accessor: &A) -> MintResult<U256>
    where
        A: ChainAccessor + ?Sized,
    {
        let price = accessor.gas_price().await?;
        debug!(
            "Gas price on chain {}: {} gwei",
            accessor.chain_id(),
            format_units(price, "gwei").unwrap_or_else(|_| price.to_string())
        );
        Ok(price)
    }

    /// Upper bound on the fee in wei
    pub fn calculate_cost(gas_limit: U256, gas_price: U256) -> U256 {
        gas_limit.saturating_mul(gas_price)
    }
}
