//! The wallet boundary: who is connected, and signing + executing transactions.
//!
//! Keys never pass through chaincal. A wallet only exposes the connected
//! account and an opaque sign-and-execute call that may be rejected.

pub mod protocol;
mod signer;

pub use signer::SignerProcess;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChainCalResult;
use crate::ids::Address;
use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: Address,
    pub public_key: String,
}

/// Outcome of a transaction the wallet signed and executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub digest: String,
}

#[async_trait]
pub trait Wallet: Send + Sync {
    /// The connected account, or `None` while disconnected.
    async fn account(&self) -> ChainCalResult<Option<WalletAccount>>;

    /// Sign and execute. Fails with `ChainCalError::Wallet` when the user
    /// declines or the wallet cannot sign.
    async fn sign_and_execute(&self, transaction: &Transaction)
    -> ChainCalResult<ExecutionResult>;
}
