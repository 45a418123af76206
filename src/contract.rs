//! Contract reference and call encoding
//!
//! The ABI document may be a bare JSON array of ABI items or a compiler
//! artifact carrying the array under an `abi` key (Hardhat, Foundry).

use crate::config::ContractConfig;
use crate::error::{MintError, MintResult};

use ethers::abi::{Abi, Function};
use ethers::types::{Address, Bytes};
use ethers::utils::to_checksum;
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Deployed contract address bound to its interface description
#[derive(Debug, Clone)]
pub struct ContractReference {
    address: Address,
    abi: Abi,
}

impl ContractReference {
    /// Bind an ABI to an address string
    pub fn new(address: &str, abi: Abi) -> MintResult<Self> {
        let address = parse_address(address)?;
        Ok(Self { address, abi })
    }

    /// Load the ABI file named in the config and bind it to the configured address
    pub fn load(config: &ContractConfig) -> MintResult<Self> {
        let abi = load_abi(Path::new(&config.abi_path))?;
        let contract = Self::new(&config.address, abi)?;

        debug!(
            "Loaded contract {} with {} functions",
            to_checksum(&contract.address, None),
            contract.abi.functions().count()
        );
        Ok(contract)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Encode a zero-argument call to `name`
    pub fn encode_call(&self, name: &str) -> MintResult<Bytes> {
        let overloads = self
            .abi
            .functions_by_name(name)
            .map_err(|_| MintError::Contract(format!("ABI has no function named `{}`", name)))?;

        let function = overloads
            .iter()
            .find(|f| f.inputs.is_empty())
            .ok_or_else(|| {
                MintError::Contract(format!(
                    "`{}` takes arguments ({}); only zero-argument calls are supported",
                    name,
                    overloads[0].signature()
                ))
            })?;

        let data = function
            .encode_input(&[])
            .map_err(|e| MintError::Contract(format!("Failed to encode {}: {}", name, e)))?;

        Ok(Bytes::from(data))
    }

    /// Resolve call data back to the ABI function it invokes
    pub fn decode_call(&self, data: &[u8]) -> MintResult<&Function> {
        if data.len() < 4 {
            return Err(MintError::Contract(format!(
                "Call data too short: {} bytes",
                data.len()
            )));
        }

        let function = self
            .abi
            .functions()
            .find(|f| f.short_signature() == data[..4])
            .ok_or_else(|| {
                MintError::Contract(format!("Unknown selector 0x{}", hex::encode(&data[..4])))
            })?;

        function
            .decode_input(&data[4..])
            .map_err(|e| MintError::Contract(format!("Malformed call data: {}", e)))?;

        Ok(function)
    }
}

/// Parse an address, rejecting mixed-case input whose EIP-55 checksum is wrong
pub fn parse_address(input: &str) -> MintResult<Address> {
    let input = input.trim();
    let address = Address::from_str(input)
        .map_err(|e| MintError::Config(format!("Invalid contract address {}: {}", input, e)))?;

    let digits = input.trim_start_matches("0x").trim_start_matches("0X");
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());

    if has_upper && has_lower {
        let expected = to_checksum(&address, None);
        if expected.trim_start_matches("0x") != digits {
            return Err(MintError::Config(format!(
                "Contract address {} fails its checksum (expected {})",
                input, expected
            )));
        }
    }

    Ok(address)
}

/// Read an ABI document from disk
pub fn load_abi(path: &Path) -> MintResult<Abi> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MintError::Contract(format!("Failed to read ABI {:?}: {}", path, e)))?;
    parse_abi(&raw)
}

/// Parse an ABI document from JSON text
pub fn parse_abi(json: &str) -> MintResult<Abi> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| MintError::Contract(format!("ABI is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| MintError::Contract("ABI object has no `abi` field".to_string()))?,
        other => other,
    };

    serde_json::from_value(items)
        .map_err(|e| MintError::Contract(format!("Malformed ABI: {}", e)))
}
