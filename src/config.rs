//! Configuration management for the mint submitter
//!
//! Loads configuration from a TOML file with environment variable substitution.
//! `${VAR}` is replaced by the variable's value, `${VAR:-fallback}` falls back
//! when the variable is unset or empty.

use crate::error::{MintError, MintResult};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Gas limit used when the config file does not set one
pub const DEFAULT_GAS_LIMIT: u64 = 250_000;

lazy_static! {
    static ref ENV_VAR: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("valid env var pattern");
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    pub wallet: WalletConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Expected chain ID; the node's answer is used when absent
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractConfig {
    pub address: String,
    pub abi_path: String,
    #[serde(default = "default_function")]
    pub function: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub private_key: PrivateKey,
}

/// Hex-encoded signing key. Never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub gas_limit: u64,
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
    pub backoff_factor: u32,
    pub confirmation_timeout_secs: u64,
    /// Blocks the receipt must be buried under, including its own
    pub confirmations: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            poll_interval_ms: 1_000,
            max_poll_interval_ms: 15_000,
            backoff_factor: 2,
            confirmation_timeout_secs: 600,
            confirmations: 1,
        }
    }
}

impl SubmissionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

fn default_function() -> String {
    "mint".to_string()
}

impl Settings {
    /// Load settings from a configuration file
    pub fn load(path: &Path) -> MintResult<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            MintError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml_str(&config_str)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(input: &str) -> MintResult<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(input);

        let settings: Settings = toml::from_str(&config_str)
            .map_err(|e| MintError::Config(format!("Failed to parse configuration: {}", e)))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> MintResult<()> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(MintError::Config("network.rpc_url is not set".to_string()));
        }
        if self.contract.address.trim().is_empty() {
            return Err(MintError::Config(
                "contract.address is not set (CONTRACT_ADDRESS)".to_string(),
            ));
        }
        if self.contract.abi_path.trim().is_empty() {
            return Err(MintError::Config("contract.abi_path is not set".to_string()));
        }
        if self.contract.function.trim().is_empty() {
            return Err(MintError::Config("contract.function is empty".to_string()));
        }
        if self.wallet.private_key.is_empty() {
            return Err(MintError::Config(
                "wallet.private_key is not set (PRIVATE_KEY)".to_string(),
            ));
        }

        let s = &self.submission;
        if s.gas_limit == 0 {
            return Err(MintError::Config("submission.gas_limit must be positive".to_string()));
        }
        if s.poll_interval_ms == 0 || s.max_poll_interval_ms < s.poll_interval_ms {
            return Err(MintError::Config(
                "submission poll interval must be positive and not exceed max_poll_interval_ms"
                    .to_string(),
            ));
        }
        if s.backoff_factor == 0 {
            return Err(MintError::Config(
                "submission.backoff_factor must be at least 1".to_string(),
            ));
        }
        if s.confirmation_timeout_secs == 0 {
            return Err(MintError::Config(
                "submission.confirmation_timeout_secs must be positive".to_string(),
            ));
        }
        if s.confirmations == 0 {
            return Err(MintError::Config(
                "submission.confirmations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
///
/// Values are escaped for a TOML basic string, so backslashes and quotes
/// survive parsing unchanged.
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR
        .replace_all(input, |cap: &Captures| {
            let fallback = cap.get(2).map(|m| m.as_str()).unwrap_or_default();
            match env::var(&cap[1]) {
                Ok(value) if !value.is_empty() => escape_toml(&value),
                _ => escape_toml(fallback),
            }
        })
        .into_owned()
}

fn escape_toml(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
        [network]
        rpc_url = "http://localhost:8545"
        chain_id = 31337

        [contract]
        address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        abi_path = "contract_abi.json"

        [wallet]
        private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

        [submission]
        gas_limit = 300000
        confirmations = 2
    "#;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("MINT_TEST_VAR", "test_value");
        let input = "url = \"https://api.example.com/${MINT_TEST_VAR}/endpoint\"";
        let result = substitute_env_vars(input);
        assert_eq!(result, "url = \"https://api.example.com/test_value/endpoint\"");
    }

    #[test]
    fn test_env_var_fallback() {
        env::remove_var("MINT_TEST_UNSET");
        env::set_var("MINT_TEST_EMPTY", "");
        let input = "a = \"${MINT_TEST_UNSET:-https://rpc.example}\" b = \"${MINT_TEST_EMPTY:-x}\" c = \"${MINT_TEST_UNSET}\"";
        let result = substitute_env_vars(input);
        assert_eq!(result, "a = \"https://rpc.example\" b = \"x\" c = \"\"");
    }

    #[test]
    fn substituted_values_keep_backslashes_and_quotes() {
        env::set_var("MINT_TEST_ABI_PATH", r"C:\Users\mint\abi.json");
        env::set_var("MINT_TEST_FUNCTION", r#"mint"quoted"#);
        let input = FULL
            .replace("\"contract_abi.json\"", "\"${MINT_TEST_ABI_PATH}\"")
            .replace("[wallet]", "function = \"${MINT_TEST_FUNCTION}\"\n[wallet]");

        let settings = Settings::from_toml_str(&input).unwrap();
        assert_eq!(settings.contract.abi_path, r"C:\Users\mint\abi.json");
        assert_eq!(settings.contract.function, r#"mint"quoted"#);
    }

    #[test]
    fn parses_full_settings() {
        let settings = Settings::from_toml_str(FULL).unwrap();
        assert_eq!(settings.network.chain_id, Some(31337));
        assert_eq!(settings.contract.function, "mint");
        assert_eq!(settings.submission.gas_limit, 300_000);
        assert_eq!(settings.submission.confirmations, 2);
        // Unset knobs keep their defaults
        assert_eq!(settings.submission.backoff_factor, 2);
        assert_eq!(settings.submission.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn submission_section_is_optional() {
        let input = FULL.split("[submission]").next().unwrap();
        let settings = Settings::from_toml_str(input).unwrap();
        assert_eq!(settings.submission.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(settings.submission.confirmation_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn missing_private_key_is_config_error() {
        env::remove_var("MINT_TEST_MISSING_KEY");
        let input = FULL.replace(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "${MINT_TEST_MISSING_KEY}",
        );
        let err = Settings::from_toml_str(&input).unwrap_err();
        assert!(matches!(err, MintError::Config(ref m) if m.contains("private_key")));
    }

    #[test]
    fn missing_contract_address_is_config_error() {
        let input = FULL.replace("0x5FbDB2315678afecb367f032d93F642f64180aa3", "");
        let err = Settings::from_toml_str(&input).unwrap_err();
        assert!(matches!(err, MintError::Config(ref m) if m.contains("contract.address")));
    }

    #[test]
    fn rejects_zero_confirmations() {
        let input = FULL.replace("confirmations = 2", "confirmations = 0");
        assert!(matches!(
            Settings::from_toml_str(&input),
            Err(MintError::Config(_))
        ));
    }

    #[test]
    fn private_key_is_redacted() {
        let settings = Settings::from_toml_str(FULL).unwrap();
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("ac0974bec39a17e3"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.network.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn shipped_config_parses() {
        env::set_var("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        env::set_var(
            "PRIVATE_KEY",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        );
        let settings = Settings::from_toml_str(include_str!("../config/default.toml")).unwrap();
        assert_eq!(settings.contract.function, "mint");
        assert_eq!(settings.submission.gas_limit, DEFAULT_GAS_LIMIT);
        assert!(!settings.network.rpc_url.is_empty());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Settings::load(Path::new("/nonexistent/mint.toml")).unwrap_err();
        assert!(matches!(err, MintError::Config(_)));
    }
}
