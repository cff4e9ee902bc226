//! Transactions invoking the calendar package's entry points.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{Address, CALENDAR_MODULE, EventId, ObjectId};

/// The entry points of the calendar module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    CreateUser,
    CreateCalendar,
    CreateCalendarEvent,
    DeleteCalendarEvent,
    DeleteCalendar,
    ShareCalendar,
    AcceptShare,
    DebugPrintMessage,
}

impl EntryPoint {
    pub fn name(&self) -> &'static str {
        match self {
            EntryPoint::CreateUser => "create_user",
            EntryPoint::CreateCalendar => "create_calendar",
            EntryPoint::CreateCalendarEvent => "create_calendar_event",
            EntryPoint::DeleteCalendarEvent => "delete_calendar_event",
            EntryPoint::DeleteCalendar => "delete_calendar",
            EntryPoint::ShareCalendar => "share_calendar",
            EntryPoint::AcceptShare => "accept_share",
            EntryPoint::DebugPrintMessage => "debug_print_message",
        }
    }

    /// Whether reads have to wait for this call to settle. Debug messages
    /// change no state anyone reads.
    pub fn settles(&self) -> bool {
        !matches!(self, EntryPoint::DebugPrintMessage)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A pure (by-value) argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Pure {
    String(String),
    U64(u64),
    Address(Address),
    Id(String),
}

/// An argument to a move call: an object reference or a pure value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallArg {
    Object(ObjectId),
    Pure(Pure),
}

impl CallArg {
    pub fn object(id: &ObjectId) -> Self {
        CallArg::Object(id.clone())
    }

    pub fn string(s: impl Into<String>) -> Self {
        CallArg::Pure(Pure::String(s.into()))
    }

    pub fn u64(n: u64) -> Self {
        CallArg::Pure(Pure::U64(n))
    }

    pub fn address(address: &Address) -> Self {
        CallArg::Pure(Pure::Address(address.clone()))
    }

    pub fn event_id(id: &EventId) -> Self {
        CallArg::Pure(Pure::Id(id.as_str().to_string()))
    }

    pub fn as_object(&self) -> Option<&ObjectId> {
        match self {
            CallArg::Object(id) => Some(id),
            CallArg::Pure(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub entry_point: EntryPoint,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    pub fn new(package: &ObjectId, entry_point: EntryPoint, arguments: Vec<CallArg>) -> Self {
        MoveCall {
            package: package.clone(),
            module: CALENDAR_MODULE.to_string(),
            entry_point,
            arguments,
        }
    }

    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.entry_point.name())
    }
}

/// One entry-point invocation sent by `sender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub call: MoveCall,
}

impl Transaction {
    pub fn new(sender: Address, call: MoveCall) -> Self {
        Transaction { sender, call }
    }
}
