//! Signer subprocess.
//!
//! Signing is delegated to an external executable (by default
//! `chaincal-signer` on PATH) that speaks JSON over stdin/stdout: one request
//! line in, one response document out. The signer owns the keys and the
//! decision to sign; chaincal only sees the outcome.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ChainCalError, ChainCalResult};
use crate::transaction::Transaction;
use crate::wallet::protocol::{Account, Command, Request, Response, SignAndExecute, SignerCommand};
use crate::wallet::{ExecutionResult, Wallet, WalletAccount};

const ACCOUNT_TIMEOUT: Duration = Duration::from_secs(10);
/// Signing may wait on the user confirming in the signer.
const SIGN_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct SignerProcess {
    program: String,
}

impl SignerProcess {
    pub fn new(program: impl Into<String>) -> Self {
        SignerProcess {
            program: program.into(),
        }
    }

    fn binary_path(&self) -> ChainCalResult<PathBuf> {
        which::which(&self.program)
            .map_err(|_| ChainCalError::SignerNotInstalled(self.program.clone()))
    }

    async fn call<C: SignerCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> ChainCalResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ChainCalError::SignerTimeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> ChainCalResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| ChainCalError::Serialization(e.to_string()))?;
        let request_json = serde_json::to_string(&Request { command, params })
            .map_err(|e| ChainCalError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(signer = %binary_path.display(), ?command, "calling signer");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ChainCalError::Wallet(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChainCalError::Wallet("Signer stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(ChainCalError::Wallet(format!(
                "Signer exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(ChainCalError::Wallet("Signer returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| ChainCalError::Wallet(format!("Failed to parse signer response: {e}")))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(ChainCalError::Wallet(error)),
        }
    }
}

#[async_trait]
impl Wallet for SignerProcess {
    async fn account(&self) -> ChainCalResult<Option<WalletAccount>> {
        self.call(Account {}, ACCOUNT_TIMEOUT).await
    }

    async fn sign_and_execute(
        &self,
        transaction: &Transaction,
    ) -> ChainCalResult<ExecutionResult> {
        self.call(
            SignAndExecute {
                transaction: transaction.clone(),
            },
            SIGN_TIMEOUT,
        )
        .await
    }
}
