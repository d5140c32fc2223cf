use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Middleware, RpcSend};
use crate::error::RpcError;
use crate::formatting::quantity::{encode_quantity, quantity_from_value};

/// Methods whose transaction argument gets a default `from`.
pub const FILL_FROM_METHODS: &[&str] = &[
    "eth_call",
    "eth_estimateGas",
    "eth_sendTransaction",
    "personal_sendTransaction",
];

/// Methods whose transaction argument also gets a default `gas`.
///
/// Must never include `eth_estimateGas`: the gas guess is itself an
/// `eth_estimateGas` call.
pub const FILL_GAS_METHODS: &[&str] = &["eth_call"];

/// How an `eth_estimateGas` result becomes the injected `gas` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimatePolicy {
    pub multiplier: u64,
}

impl Default for GasEstimatePolicy {
    fn default() -> Self {
        Self { multiplier: 2 }
    }
}

impl GasEstimatePolicy {
    pub fn apply(&self, estimate: U256) -> U256 {
        estimate.saturating_mul(U256::from(self.multiplier))
    }
}

/// Fills omitted `from` and `gas` fields of transaction arguments by asking
/// the backend before forwarding the call.
///
/// Lookups are sent through the stages below this one, so they are formatted
/// like any other call and never re-enter this middleware.
#[derive(Debug, Clone, Default)]
pub struct DefaultFields {
    gas_policy: GasEstimatePolicy,
}

impl DefaultFields {
    pub fn new(gas_policy: GasEstimatePolicy) -> Self {
        Self { gas_policy }
    }
}

impl Middleware for DefaultFields {
    fn name(&self) -> &'static str {
        "default_fields"
    }

    fn wrap(&self, next: Arc<dyn RpcSend>) -> Arc<dyn RpcSend> {
        Arc::new(DefaultFieldsLayer {
            gas_policy: self.gas_policy,
            next,
        })
    }
}

struct DefaultFieldsLayer {
    gas_policy: GasEstimatePolicy,
    next: Arc<dyn RpcSend>,
}

fn is_missing(transaction: &Map<String, Value>, field: &str) -> bool {
    transaction.get(field).map_or(true, Value::is_null)
}

impl DefaultFieldsLayer {
    /// Default account: the backend's coinbase, else its first account.
    async fn guess_from(&self) -> Result<Value, RpcError> {
        let coinbase = self.next.send("eth_coinbase", Vec::new()).await?;
        if !coinbase.is_null() {
            return Ok(coinbase);
        }

        let accounts = self.next.send("eth_accounts", Vec::new()).await?;
        let first = accounts
            .as_array()
            .and_then(|accounts| accounts.first())
            .cloned()
            .unwrap_or(Value::Null);

        if first.is_null() {
            debug!("No default account available; leaving from unset");
        }
        Ok(first)
    }

    async fn guess_gas(&self, transaction: &Map<String, Value>) -> Result<Value, RpcError> {
        let estimate = self
            .next
            .send("eth_estimateGas", vec![Value::Object(transaction.clone())])
            .await?;

        let estimate = quantity_from_value(&estimate)
            .ok_or_else(|| RpcError::InvalidQuantity(format!("eth_estimateGas returned {}", estimate)))?;
        let gas = self.gas_policy.apply(estimate);

        debug!("Estimated gas {} -> {}", estimate, gas);
        Ok(Value::String(encode_quantity(gas)))
    }

    async fn fill(&self, method: &str, mut transaction: Map<String, Value>) -> Result<Map<String, Value>, RpcError> {
        if is_missing(&transaction, "from") {
            let from = self.guess_from().await?;
            transaction.insert("from".to_string(), from);
        }

        if FILL_GAS_METHODS.contains(&method) && is_missing(&transaction, "gas") {
            let gas = self.guess_gas(&transaction).await?;
            transaction.insert("gas".to_string(), gas);
        }

        Ok(transaction)
    }
}

#[async_trait]
impl RpcSend for DefaultFieldsLayer {
    async fn send(&self, method: &str, mut params: Vec<Value>) -> Result<Value, RpcError> {
        if FILL_FROM_METHODS.contains(&method) {
            if let Some(Value::Object(transaction)) = params.first_mut() {
                *transaction = self.fill(method, std::mem::take(transaction)).await?;
            }
        }
        self.next.send(method, params).await
    }
}
