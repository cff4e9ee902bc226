use serde::{Deserialize, Serialize};

use crate::entity::{MoveStruct, Uid, decode_fields, u64_from_any};
use crate::error::ChainCalResult;
use crate::ids::{Address, ObjectId};
use crate::rpc::ObjectData;

/// A calendar offered to a user that the user has not accepted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingShare {
    pub calendar_address: ObjectId,
    pub user_address: Address,
}

/// The statistics singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub id: ObjectId,
    pub user_count: u64,
    pub calendar_count: u64,
    pub event_count: u64,
    pub users: Vec<Address>,
    pub pending_calendar_shares: Vec<PendingShare>,
}

#[derive(Deserialize)]
struct RawStatistics {
    id: Uid,
    #[serde(deserialize_with = "u64_from_any")]
    user_count: u64,
    #[serde(deserialize_with = "u64_from_any")]
    calendar_count: u64,
    #[serde(deserialize_with = "u64_from_any")]
    event_count: u64,
    #[serde(default)]
    users: Vec<Address>,
    #[serde(default)]
    pending_calendar_shares: Vec<MoveStruct<PendingShare>>,
}

impl Statistics {
    pub fn from_object(object: &ObjectData) -> ChainCalResult<Self> {
        let raw: RawStatistics = decode_fields(object)?;
        Ok(Statistics {
            id: raw.id.into_id(),
            user_count: raw.user_count,
            calendar_count: raw.calendar_count,
            event_count: raw.event_count,
            users: raw.users,
            pending_calendar_shares: raw
                .pending_calendar_shares
                .into_iter()
                .map(MoveStruct::into_inner)
                .collect(),
        })
    }

    /// Shares waiting for `user` to accept.
    pub fn pending_shares_for<'a>(
        &'a self,
        user: &Address,
    ) -> impl Iterator<Item = &'a PendingShare> + use<'a> {
        let user = user.clone();
        self.pending_calendar_shares
            .iter()
            .filter(move |s| s.user_address == user)
    }

    pub fn has_pending_share(&self, calendar: &ObjectId, user: &Address) -> bool {
        self.pending_shares_for(user)
            .any(|s| &s.calendar_address == calendar)
    }
}
