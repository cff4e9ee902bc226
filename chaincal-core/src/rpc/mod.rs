//! Read access to the ledger.

mod http;
pub mod protocol;

pub use http::JsonRpcLedger;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChainCalResult;
use crate::ids::{Address, ObjectId};

/// Move struct content of an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveContent {
    #[serde(default)]
    pub data_type: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub fields: serde_json::Value,
}

/// A ledger object as returned by the object endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub content: Option<MoveContent>,
}

impl ObjectData {
    /// Content type if the object carries Move content.
    pub fn content_type(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.type_tag.as_str())
    }
}

/// Either the object or an error such as `notExists` / `deleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// The read endpoints of the ledger node.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// All objects owned by `owner`, optionally narrowed to one struct type.
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: Option<&str>,
    ) -> ChainCalResult<Vec<ObjectData>>;

    /// One object by id; `None` if it does not exist (anymore).
    async fn object(&self, id: &ObjectId) -> ChainCalResult<Option<ObjectData>>;

    /// A batch of objects by id, in request order. Missing objects are skipped.
    async fn multi_objects(&self, ids: &[ObjectId]) -> ChainCalResult<Vec<ObjectData>>;
}
