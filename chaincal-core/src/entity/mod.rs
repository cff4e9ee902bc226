//! Typed entities mapped from raw ledger object content.
//!
//! Every entity is rebuilt from scratch from the ledger on each read. Nested
//! Move structs come either wrapped as `{ "type": .., "fields": {..} }` or
//! bare, u64 values either as JSON numbers or decimal strings; the helpers
//! here accept both.

mod calendar;
mod event;
mod statistics;
mod user;

pub use calendar::Calendar;
pub use event::CalendarEvent;
pub use statistics::{PendingShare, Statistics};
pub use user::User;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::ObjectId;
use crate::rpc::ObjectData;

/// A nested Move struct, wrapped or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MoveStruct<T> {
    Wrapped { fields: T },
    Bare(T),
}

impl<T> MoveStruct<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            MoveStruct::Wrapped { fields } => fields,
            MoveStruct::Bare(inner) => inner,
        }
    }
}

/// A UID: `{ "id": "0x.." }` or the bare id string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Uid {
    Wrapped { id: ObjectId },
    Bare(ObjectId),
}

impl Uid {
    pub(crate) fn into_id(self) -> ObjectId {
        match self {
            Uid::Wrapped { id } | Uid::Bare(id) => id,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum U64Repr {
    Number(u64),
    Text(String),
}

/// u64 from a JSON number or a decimal string.
pub(crate) fn u64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match U64Repr::deserialize(deserializer)? {
        U64Repr::Number(n) => Ok(n),
        U64Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Decode the Move fields of `object` into `T`.
pub(crate) fn decode_fields<T: DeserializeOwned>(object: &ObjectData) -> ChainCalResult<T> {
    let content = object.content.as_ref().ok_or_else(|| ChainCalError::Decode {
        object: object.object_id.to_string(),
        reason: "object has no content".into(),
    })?;

    serde_json::from_value(content.fields.clone()).map_err(|e| ChainCalError::Decode {
        object: object.object_id.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Counter {
        #[serde(deserialize_with = "u64_from_any")]
        n: u64,
    }

    #[test]
    fn test_u64_accepts_number_and_string() {
        let a: Counter = serde_json::from_value(json!({ "n": 42 })).unwrap();
        let b: Counter = serde_json::from_value(json!({ "n": "42" })).unwrap();
        assert_eq!(a.n, b.n);
        assert!(serde_json::from_value::<Counter>(json!({ "n": "4.2" })).is_err());
    }

    #[test]
    fn test_move_struct_wrapped_or_bare() {
        let wrapped: MoveStruct<Counter> =
            serde_json::from_value(json!({ "type": "0x1::m::C", "fields": { "n": "7" } }))
                .unwrap();
        let bare: MoveStruct<Counter> = serde_json::from_value(json!({ "n": 7 })).unwrap();
        assert_eq!(wrapped.into_inner().n, 7);
        assert_eq!(bare.into_inner().n, 7);
    }

    #[test]
    fn test_uid_shapes() {
        let wrapped: Uid = serde_json::from_value(json!({ "id": "0xc" })).unwrap();
        let bare: Uid = serde_json::from_value(json!("0xc")).unwrap();
        assert_eq!(wrapped.into_id(), bare.into_id());
    }
}
