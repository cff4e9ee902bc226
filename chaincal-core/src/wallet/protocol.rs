//! Defines the JSON protocol spoken with the external signer binary
//! over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::transaction::Transaction;
use crate::wallet::{ExecutionResult, WalletAccount};

pub trait SignerCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Account,
    SignAndExecute,
}

/// Request sent from chaincal to the signer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the signer to chaincal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Ask which account is connected.
#[derive(Debug, Serialize, Deserialize)]
pub struct Account {}

impl SignerCommand for Account {
    type Response = Option<WalletAccount>;
    fn command() -> Command {
        Command::Account
    }
}

/// Sign a transaction and submit it for execution.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignAndExecute {
    pub transaction: Transaction,
}

impl SignerCommand for SignAndExecute {
    type Response = ExecutionResult;
    fn command() -> Command {
        Command::SignAndExecute
    }
}
