//! Core library for chaincal: calendars stored as objects on a Move-based
//! ledger.
//!
//! - [`client::LedgerClient`] turns calendar operations into move calls signed
//!   by a [`wallet::Wallet`] and reads `User`, `Calendar` and `Statistics`
//!   objects back through [`rpc::LedgerRpc`].
//! - [`reconciler::ViewReconciler`] keeps a [`reconciler::ViewState`] in step
//!   with the ledger after every write.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod loading;
pub mod locks;
pub mod reconciler;
pub mod rpc;
pub mod timestamp;
pub mod transaction;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use client::{LedgerClient, WriteReceipt};
pub use config::{ChainCalConfig, Network, SettlePolicy};
pub use entity::{Calendar, CalendarEvent, PendingShare, Statistics, User};
pub use error::{ChainCalError, ChainCalResult};
pub use ids::{Address, EventId, ObjectId};
pub use reconciler::{Readiness, ViewReconciler, ViewState};
