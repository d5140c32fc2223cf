use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{Middleware, RpcSend};
use crate::error::RpcError;
use crate::methods::{DeprecatedAlias, DEPRECATED_ALIASES};

/// Forwards deprecated method names to their canonical methods, logging a
/// deprecation notice on every such call.
#[derive(Clone)]
pub struct LegacyMethodShim {
    aliases: Arc<HashMap<&'static str, DeprecatedAlias>>,
}

impl LegacyMethodShim {
    pub fn new(aliases: &[DeprecatedAlias]) -> Self {
        Self {
            aliases: Arc::new(aliases.iter().map(|a| (a.alias, *a)).collect()),
        }
    }

    pub fn resolve(&self, method: &str) -> Option<&DeprecatedAlias> {
        self.aliases.get(method)
    }
}

impl Default for LegacyMethodShim {
    fn default() -> Self {
        Self::new(DEPRECATED_ALIASES)
    }
}

impl Middleware for LegacyMethodShim {
    fn name(&self) -> &'static str {
        "legacy_methods"
    }

    fn wrap(&self, next: Arc<dyn RpcSend>) -> Arc<dyn RpcSend> {
        Arc::new(LegacyLayer {
            shim: self.clone(),
            next,
        })
    }
}

struct LegacyLayer {
    shim: LegacyMethodShim,
    next: Arc<dyn RpcSend>,
}

#[async_trait]
impl RpcSend for LegacyLayer {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        match self.shim.resolve(method) {
            Some(alias) => {
                warn!("{}", alias.notice());
                self.next.send(alias.method, params).await
            }
            None => self.next.send(method, params).await,
        }
    }
}
