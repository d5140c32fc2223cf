use serde_json::Value;
use thiserror::Error;

/// Errors raised while building schema catalogs and rename tables.
///
/// These are configuration errors: they surface once, when the tables are
/// assembled, and never per call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema for {method} must be a list or a map, got {found}")]
    InvalidSchema { method: String, found: &'static str },

    #[error("schema for {method} has an invalid entry at {position}: expected a type name or null")]
    InvalidEntry { method: String, position: String },

    #[error("method {0} already has a schema")]
    DuplicateMethod(String),

    #[error("rename table {table} maps more than one field onto {field}")]
    NonInjective { table: &'static str, field: String },
}

/// Errors surfaced by a send operation anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend error {code}: {message}")]
    Backend {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("malformed backend response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
}

impl RpcError {
    /// JSON-RPC error code to report to a caller of the proxy.
    pub fn code(&self) -> i64 {
        match self {
            RpcError::Backend { code, .. } => *code,
            _ => -32603,
        }
    }
}

/// Extract a short name for a JSON value's shape, for error messages.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
