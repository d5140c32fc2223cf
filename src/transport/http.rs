use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use super::types::{JsonRpcRequest, JsonRpcResponse};
use crate::error::RpcError;
use crate::middleware::RpcSend;

/// JSON-RPC over HTTP: one POST per call, no retry.
pub struct HttpTransport {
    http_client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for the given backend URL.
    pub fn new(rpc_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl RpcSend for HttpTransport {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, &params);
        debug!("Sending backend request: id={}, method={}", id, method);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let rpc_response: JsonRpcResponse = response.json().await?;

        if let Some(err) = rpc_response.error {
            error!(
                "Backend RPC error: method={}, code={}, message={}",
                method, err.code, err.message
            );
            return Err(RpcError::Backend {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        // A missing result is a legitimate null (unknown receipt, no coinbase)
        Ok(rpc_response.result.unwrap_or(Value::Null))
    }
}
