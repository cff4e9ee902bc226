//! Defines the JSON-RPC 2.0 methods used to read ledger objects.
//!
//! Each method is a tuple struct so that serde emits its positional
//! `params` array directly.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::ids::{Address, ObjectId};
use crate::rpc::ObjectResponse;

pub trait RpcMethod: Serialize {
    type Response: DeserializeOwned;
    fn method() -> Method;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GetOwnedObjects,
    GetObject,
    MultiGetObjects,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::GetOwnedObjects => "suix_getOwnedObjects",
            Method::GetObject => "sui_getObject",
            Method::MultiGetObjects => "sui_multiGetObjects",
        }
    }
}

/// Which parts of an object the node should include.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    pub show_type: bool,
    pub show_content: bool,
    pub show_owner: bool,
}

impl ObjectDataOptions {
    pub fn content() -> Self {
        ObjectDataOptions {
            show_type: true,
            show_content: true,
            show_owner: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectFilter {
    StructType(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ObjectFilter>,
    pub options: ObjectDataOptions,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Request envelope.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// Error object returned in place of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Response envelope. `result` stays raw until the caller knows its type,
/// so decode failures can name the method that produced them.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// List objects owned by an address.
#[derive(Debug, Serialize)]
pub struct GetOwnedObjects(
    pub Address,
    pub ObjectResponseQuery,
    pub Option<String>,
    pub Option<u32>,
);

impl RpcMethod for GetOwnedObjects {
    type Response = Page<ObjectResponse>;
    fn method() -> Method {
        Method::GetOwnedObjects
    }
}

/// Fetch one object by id.
#[derive(Debug, Serialize)]
pub struct GetObject(pub ObjectId, pub ObjectDataOptions);

impl RpcMethod for GetObject {
    type Response = ObjectResponse;
    fn method() -> Method {
        Method::GetObject
    }
}

/// Fetch a batch of objects, answered in request order.
#[derive(Debug, Serialize)]
pub struct MultiGetObjects(pub Vec<ObjectId>, pub ObjectDataOptions);

impl RpcMethod for MultiGetObjects {
    type Response = Vec<ObjectResponse>;
    fn method() -> Method {
        Method::MultiGetObjects
    }
}
