//! Error types for the mint submitter

use std::fmt;
use thiserror::Error;

/// Why the node refused a signed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Nonce already used or otherwise out of sequence
    NonceConflict,
    /// Gas price below what the node will accept
    Underpriced,
    /// Sender cannot cover gas limit * gas price
    InsufficientFunds,
    Other,
}

impl Rejection {
    /// Classify a JSON-RPC rejection message from `eth_sendRawTransaction`
    pub fn classify(message: &str) -> Self {
        let message = message.to_ascii_lowercase();

        if message.contains("nonce too low")
            || message.contains("nonce too high")
            || message.contains("already known")
            || message.contains("invalid nonce")
        {
            Rejection::NonceConflict
        } else if message.contains("underpriced") || message.contains("fee too low") {
            Rejection::Underpriced
        } else if message.contains("insufficient funds") {
            Rejection::InsufficientFunds
        } else {
            Rejection::Other
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::NonceConflict => "nonce conflict",
            Rejection::Underpriced => "underpriced",
            Rejection::InsufficientFunds => "insufficient funds",
            Rejection::Other => "rejected",
        };
        f.write_str(s)
    }
}

/// Main error type for the submitter
#[derive(Error, Debug)]
pub enum MintError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contract interface error: {0}")]
    Contract(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Transaction rejected ({reason}): {message}")]
    Submission { reason: Rejection, message: String },

    #[error("Transaction {tx_hash} was mined but execution reverted")]
    Execution { tx_hash: String },

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },
}

impl MintError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            MintError::Config(_) | MintError::Contract(_) => 2,
            MintError::Credential(_) => 3,
            MintError::Connectivity(_) => 4,
            MintError::Submission { .. } => 5,
            MintError::Execution { .. } => 6,
            MintError::Timeout { .. } => 7,
        }
    }

    /// Rejection reason, if the node refused the transaction
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            MintError::Submission { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for submitter operations
pub type MintResult<T> = Result<T, MintError>;
