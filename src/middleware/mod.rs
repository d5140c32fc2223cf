//! Request/response interception around a JSON-RPC send operation.
//!
//! Every stage of the pipeline implements [`RpcSend`]. A [`Middleware`] takes
//! the next stage and returns a new stage with the same signature, so stages
//! nest like an onion: the first layer added to a [`PipelineBuilder`] sees a
//! call first on the way in and last on the way out.

pub mod compat;
pub mod defaults;
pub mod formatting;
pub mod legacy;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::RpcError;

pub use compat::tester_compat_middleware;
pub use defaults::{DefaultFields, GasEstimatePolicy};
pub use formatting::FormattingMiddleware;
pub use legacy::LegacyMethodShim;

/// Send one JSON-RPC call and return its result.
#[async_trait]
pub trait RpcSend: Send + Sync {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// Wraps the next stage of a pipeline.
///
/// A middleware usually calls `next` exactly once per call. It may instead
/// answer directly without calling `next`. Errors from `next` are returned
/// unchanged; nothing here retries.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn wrap(&self, next: Arc<dyn RpcSend>) -> Arc<dyn RpcSend>;
}

/// A composed chain of middlewares on top of a transport.
#[derive(Clone)]
pub struct Pipeline {
    head: Arc<dyn RpcSend>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.head.send(method, params).await
    }
}

#[async_trait]
impl RpcSend for Pipeline {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.request(method, params).await
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    layers: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Add a layer inside all previously added layers.
    pub fn layer(mut self, middleware: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn layer_if(self, enabled: bool, middleware: impl Middleware + 'static) -> Self {
        if enabled {
            self.layer(middleware)
        } else {
            self
        }
    }

    pub fn build(self, transport: Arc<dyn RpcSend>) -> Pipeline {
        let head = self.layers.iter().rev().fold(transport, |next, layer| {
            debug!("Wrapping pipeline with {}", layer.name());
            layer.wrap(next)
        });
        Pipeline { head }
    }
}
