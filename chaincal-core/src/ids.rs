//! Opaque ledger identifiers.
//!
//! Object ids and account addresses are hex strings handed out by the ledger.
//! They are never parsed or normalized, only compared by exact equality.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::new(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An account address (the owner of ledger objects).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Address::new(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of an event inside a calendar object.
///
/// Always treated as an opaque ledger-assigned id, never as a position in the
/// calendar's event list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        EventId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Module of the deployed package holding every calendar entry point and struct.
pub const CALENDAR_MODULE: &str = "calendar";

/// Fully qualified Move struct types of the calendar package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypes {
    pub user: String,
    pub calendar: String,
}

impl ObjectTypes {
    /// The ledger prints type addresses without the zero that follows `0x`
    /// in a published package id, so the first `0x0` is rewritten to `0x`.
    pub fn for_package(package_id: &ObjectId) -> Self {
        let base = package_id.as_str().replacen("0x0", "0x", 1);
        ObjectTypes {
            user: format!("{base}::{CALENDAR_MODULE}::User"),
            calendar: format!("{base}::{CALENDAR_MODULE}::Calendar"),
        }
    }
}
