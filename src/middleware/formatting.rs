use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Middleware, RpcSend};
use crate::error::RpcError;
use crate::formatting::{FormatterFactory, FormatterTable, NormalizerChain};
use crate::schema::MethodSchemaCatalog;

struct Formatters {
    name: &'static str,
    requests: FormatterTable,
    results: FormatterTable,
}

/// Middleware that rewrites outgoing params and incoming results with
/// per-method formatters. Methods without a formatter pass through.
#[derive(Clone)]
pub struct FormattingMiddleware {
    formatters: Arc<Formatters>,
}

impl FormattingMiddleware {
    pub fn new(name: &'static str, requests: FormatterTable, results: FormatterTable) -> Self {
        Self {
            formatters: Arc::new(Formatters {
                name,
                requests,
                results,
            }),
        }
    }

    /// Kind-directed request normalization for every method in `catalog`.
    pub fn from_catalog(catalog: &MethodSchemaCatalog, chain: NormalizerChain) -> Self {
        Self::new(
            "schema_normalization",
            FormatterFactory::build(catalog, chain),
            FormatterTable::new(),
        )
    }

    pub fn format_request(&self, method: &str, params: Vec<Value>) -> Vec<Value> {
        match self.formatters.requests.get(method) {
            Some(formatter) => match formatter.apply(Value::Array(params)) {
                Value::Array(params) => params,
                other => vec![other],
            },
            None => params,
        }
    }

    pub fn format_result(&self, method: &str, result: Value) -> Value {
        match self.formatters.results.get(method) {
            Some(formatter) => formatter.apply(result),
            None => result,
        }
    }
}

impl Middleware for FormattingMiddleware {
    fn name(&self) -> &'static str {
        self.formatters.name
    }

    fn wrap(&self, next: Arc<dyn RpcSend>) -> Arc<dyn RpcSend> {
        Arc::new(FormattingLayer {
            middleware: self.clone(),
            next,
        })
    }
}

struct FormattingLayer {
    middleware: FormattingMiddleware,
    next: Arc<dyn RpcSend>,
}

#[async_trait]
impl RpcSend for FormattingLayer {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let params = self.middleware.format_request(method, params);
        debug!("{}: {} params={:?}", self.middleware.name(), method, params);

        let result = self.next.send(method, params).await?;
        Ok(self.middleware.format_result(method, result))
    }
}
