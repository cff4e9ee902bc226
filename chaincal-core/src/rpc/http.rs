//! JSON-RPC over HTTP.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::{Address, ObjectId};
use crate::rpc::protocol::{
    GetObject, GetOwnedObjects, MultiGetObjects, ObjectDataOptions, ObjectFilter,
    ObjectResponseQuery, Page, Request, Response, RpcMethod,
};
use crate::rpc::{LedgerRpc, ObjectData, ObjectResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: u32 = 50;

/// Ledger node reached over HTTP.
pub struct JsonRpcLedger {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    pub fn new(url: impl Into<String>) -> Self {
        JsonRpcLedger {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a typed method and return its result.
    ///
    /// The response type is inferred from the method's associated type.
    pub async fn call<M: RpcMethod>(&self, params: M) -> ChainCalResult<M::Response> {
        self.call_raw(M::method().name(), params).await
    }

    async fn call_raw<R: DeserializeOwned>(
        &self,
        method: &str,
        params: impl serde::Serialize,
    ) -> ChainCalResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| ChainCalError::Serialization(e.to_string()))?;
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(method, id = request.id, "ledger rpc request");

        let response: Response = self
            .http
            .post(&self.url)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_response(method, response)
    }
}

/// Unwrap a response envelope: error objects become `ChainCalError::Rpc`,
/// the result is decoded into `R`.
fn decode_response<R: DeserializeOwned>(method: &str, response: Response) -> ChainCalResult<R> {
    if let Some(error) = response.error {
        return Err(ChainCalError::Rpc {
            method: method.to_string(),
            code: error.code,
            message: error.message,
        });
    }

    let result = response.result.ok_or_else(|| ChainCalError::Rpc {
        method: method.to_string(),
        code: 0,
        message: "response carried neither result nor error".into(),
    })?;

    serde_json::from_value(result).map_err(|e| {
        ChainCalError::Serialization(format!("Failed to parse {method} result: {e}"))
    })
}

/// Follow `next_cursor` until the last page, keeping objects that came back
/// with data.
async fn collect_pages<F, Fut>(mut fetch: F) -> ChainCalResult<Vec<ObjectData>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ChainCalResult<Page<ObjectResponse>>>,
{
    let mut objects = Vec::new();
    let mut cursor = None;

    loop {
        let page = fetch(cursor.take()).await?;
        objects.extend(page.data.into_iter().filter_map(|r| r.data));

        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }

    Ok(objects)
}

#[async_trait]
impl LedgerRpc for JsonRpcLedger {
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: Option<&str>,
    ) -> ChainCalResult<Vec<ObjectData>> {
        let query = ObjectResponseQuery {
            filter: struct_type.map(|t| ObjectFilter::StructType(t.to_string())),
            options: ObjectDataOptions::content(),
        };

        collect_pages(|cursor| {
            self.call(GetOwnedObjects(
                owner.clone(),
                query.clone(),
                cursor,
                Some(PAGE_LIMIT),
            ))
        })
        .await
    }

    async fn object(&self, id: &ObjectId) -> ChainCalResult<Option<ObjectData>> {
        let response = self
            .call(GetObject(id.clone(), ObjectDataOptions::content()))
            .await?;

        if let Some(error) = &response.error {
            debug!(object = %id, %error, "object not available");
        }

        Ok(response.data)
    }

    async fn multi_objects(&self, ids: &[ObjectId]) -> ChainCalResult<Vec<ObjectData>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let responses = self
            .call(MultiGetObjects(ids.to_vec(), ObjectDataOptions::content()))
            .await?;

        Ok(responses
            .into_iter()
            .zip(ids)
            .filter_map(|(response, id)| {
                if response.data.is_none() {
                    warn!(object = %id, "object in batch not available");
                }
                response.data
            })
            .collect())
    }
}
