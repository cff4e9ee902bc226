use serde::{Deserialize, Serialize};

use crate::entity::{Uid, decode_fields};
use crate::error::ChainCalResult;
use crate::ids::ObjectId;
use crate::rpc::ObjectData;

/// The per-account user object. Holds the ids of the calendars the user can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    pub calendars: Vec<ObjectId>,
}

#[derive(Deserialize)]
struct RawUser {
    id: Uid,
    name: String,
    #[serde(default)]
    calendars: Vec<ObjectId>,
}

impl User {
    pub fn from_object(object: &ObjectData) -> ChainCalResult<Self> {
        let raw: RawUser = decode_fields(object)?;
        Ok(User {
            id: raw.id.into_id(),
            name: raw.name,
            calendars: raw.calendars,
        })
    }

    pub fn has_calendar(&self, id: &ObjectId) -> bool {
        self.calendars.contains(id)
    }
}
