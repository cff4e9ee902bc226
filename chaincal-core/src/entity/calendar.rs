use serde::{Deserialize, Serialize};

use crate::entity::event::RawEvent;
use crate::entity::{CalendarEvent, MoveStruct, Uid, decode_fields};
use crate::error::ChainCalResult;
use crate::ids::{Address, EventId, ObjectId};
use crate::rpc::ObjectData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: ObjectId,
    pub title: String,
    pub events: Vec<CalendarEvent>,
    pub shared_with: Vec<Address>,
}

#[derive(Deserialize)]
struct RawCalendar {
    id: Uid,
    title: String,
    #[serde(default)]
    events: Vec<MoveStruct<RawEvent>>,
    #[serde(default)]
    shared_with: Vec<Address>,
}

impl Calendar {
    /// Map a calendar object. The event list is rebuilt from the nested
    /// `events` field every time.
    pub fn from_object(object: &ObjectData) -> ChainCalResult<Self> {
        let raw: RawCalendar = decode_fields(object)?;
        let id = raw.id.into_id();

        let events = raw
            .events
            .into_iter()
            .map(|e| CalendarEvent::from_raw(e.into_inner(), &id))
            .collect::<ChainCalResult<Vec<_>>>()?;

        Ok(Calendar {
            id,
            title: raw.title,
            events,
            shared_with: raw.shared_with,
        })
    }

    pub fn event(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn is_shared_with(&self, address: &Address) -> bool {
        self.shared_with.contains(address)
    }
}
