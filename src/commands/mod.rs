pub mod calendar;
pub mod config;
pub mod debug;
pub mod event;
pub mod stats;
pub mod status;
pub mod user;

use std::sync::Arc;

use anyhow::{Context, Result};
use chaincal_core::rpc::JsonRpcLedger;
use chaincal_core::wallet::SignerProcess;
use chaincal_core::{ChainCalConfig, LedgerClient, ViewReconciler, ViewState};
use tracing::debug;

use crate::utils::tui::create_spinner;

/// Build the client from config and load the view for the connected account.
pub async fn connect() -> Result<ViewReconciler> {
    let config = ChainCalConfig::load().context("Failed to load config")?;
    debug!(rpc = %config.rpc_url, network = ?config.network, "loaded config");

    let rpc = Arc::new(JsonRpcLedger::new(config.rpc_url.clone()));
    let wallet = Arc::new(SignerProcess::new(config.signer.clone()));
    let view = ViewReconciler::new(Arc::new(LedgerClient::new(&config, rpc, wallet)));

    let spinner = create_spinner("Loading from ledger".to_string());
    let result = view.connect().await;
    spinner.finish_and_clear();

    result.with_context(|| format!("Failed to load state from {}", config.rpc_url))?;
    Ok(view)
}

pub fn require_user(state: &ViewState) -> Result<()> {
    if state.user.is_none() {
        anyhow::bail!(
            "No user found for this account.\n\n\
            Create one with:\n  \
            chaincal user create <name>"
        );
    }
    Ok(())
}
