//! Events embedded in a calendar object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::u64_from_any;
use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::{EventId, ObjectId};
use crate::timestamp::from_millis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Owning calendar, attached client-side when events of several
    /// calendars are merged into one view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<ObjectId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventId {
    Wrapped { id: String },
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
pub(crate) struct RawEvent {
    id: RawEventId,
    title: String,
    #[serde(deserialize_with = "u64_from_any")]
    start_timestamp: u64,
    #[serde(deserialize_with = "u64_from_any")]
    end_timestamp: u64,
}

impl CalendarEvent {
    pub(crate) fn from_raw(raw: RawEvent, calendar: &ObjectId) -> ChainCalResult<Self> {
        let id = match raw.id {
            RawEventId::Wrapped { id } | RawEventId::Text(id) => EventId::new(id),
            RawEventId::Number(n) => EventId::new(n.to_string()),
        };

        let instant = |ms: u64| {
            from_millis(ms).ok_or_else(|| ChainCalError::Decode {
                object: calendar.to_string(),
                reason: format!("event {id} has out-of-range timestamp {ms}"),
            })
        };

        Ok(CalendarEvent {
            start: instant(raw.start_timestamp)?,
            end: instant(raw.end_timestamp)?,
            id,
            title: raw.title,
            calendar_id: None,
        })
    }

    pub fn with_calendar(mut self, calendar_id: &ObjectId) -> Self {
        self.calendar_id = Some(calendar_id.clone());
        self
    }
}
