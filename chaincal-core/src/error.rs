//! Error types for the chaincal ecosystem.

use thiserror::Error;

/// Errors that can occur in chaincal operations.
#[derive(Error, Debug)]
pub enum ChainCalError {
    #[error("No wallet account connected")]
    NoWalletAccount,

    #[error("No user loaded for the connected account")]
    UserNotLoaded,

    #[error("The connected account already has a user: {0}")]
    UserExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error from {method} ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signer '{0}' not found in PATH")]
    SignerNotInstalled(String),

    #[error("Signer request timed out after {0}s")]
    SignerTimeout(u64),

    #[error("Failed to decode object {object}: {reason}")]
    Decode { object: String, reason: String },

    #[error("Invalid date '{0}'. Expected RFC 3339, YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Ledger state did not reflect the write within {0}ms")]
    SettleTimeout(u128),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ChainCalError {
    /// Precondition errors are raised locally, before anything reaches the
    /// wallet or the ledger.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ChainCalError::NoWalletAccount
                | ChainCalError::UserNotLoaded
                | ChainCalError::UserExists(_)
        )
    }
}

/// Result type alias for chaincal operations.
pub type ChainCalResult<T> = Result<T, ChainCalError>;
