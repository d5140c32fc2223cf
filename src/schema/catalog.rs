use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::debug;

use super::kind::Kind;
use crate::error::{shape_of, SchemaError};

/// Declared parameter layout of one RPC method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSchema {
    /// One kind per positional argument; `None` leaves that argument alone.
    Positional(Vec<Option<Kind>>),
    /// Field kinds for a single structured record argument.
    Keyed(BTreeMap<String, Kind>),
}

impl ParamSchema {
    pub fn positional(kinds: &[Option<&str>]) -> Self {
        ParamSchema::Positional(kinds.iter().map(|k| k.map(Kind::parse)).collect())
    }

    pub fn keyed(fields: &[(&str, &str)]) -> Self {
        ParamSchema::Keyed(
            fields
                .iter()
                .map(|(field, kind)| (field.to_string(), Kind::parse(kind)))
                .collect(),
        )
    }

    /// Parse one entry of a declarative schema table.
    pub fn from_json(method: &str, value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Array(items) => {
                let mut kinds = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::Null => kinds.push(None),
                        Value::String(name) => kinds.push(Some(Kind::parse(name))),
                        _ => {
                            return Err(SchemaError::InvalidEntry {
                                method: method.to_string(),
                                position: i.to_string(),
                            })
                        }
                    }
                }
                Ok(ParamSchema::Positional(kinds))
            }
            Value::Object(fields) => {
                let mut kinds = BTreeMap::new();
                for (field, item) in fields {
                    let name = item.as_str().ok_or_else(|| SchemaError::InvalidEntry {
                        method: method.to_string(),
                        position: field.clone(),
                    })?;
                    kinds.insert(field.clone(), Kind::parse(name));
                }
                Ok(ParamSchema::Keyed(kinds))
            }
            other => Err(SchemaError::InvalidSchema {
                method: method.to_string(),
                found: shape_of(other),
            }),
        }
    }
}

enum Entry {
    Positional(&'static [Option<&'static str>]),
    Keyed(&'static [(&'static str, &'static str)]),
}

const TRANSACTION_PARAMS: &[(&str, &str)] = &[
    ("data", "bytes"),
    ("from", "address"),
    ("gas", "uint"),
    ("gasPrice", "uint"),
    ("nonce", "uint"),
    ("to", "address"),
    ("value", "uint"),
];

const FILTER_PARAMS: &[(&str, &str)] = &[("to", "address"), ("address", "address[]")];

const TRACE_PARAMS: &[(&str, &str)] = &[("to", "address"), ("from", "address")];

const BUILTIN_SCHEMAS: &[(&str, Entry)] = &[
    // eth
    ("eth_call", Entry::Keyed(TRANSACTION_PARAMS)),
    ("eth_estimateGas", Entry::Keyed(TRANSACTION_PARAMS)),
    ("eth_getBalance", Entry::Positional(&[Some("address"), None])),
    ("eth_getBlockByHash", Entry::Positional(&[Some("bytes32"), Some("bool")])),
    ("eth_getBlockTransactionCountByHash", Entry::Positional(&[Some("bytes32")])),
    ("eth_getCode", Entry::Positional(&[Some("address"), None])),
    ("eth_getLogs", Entry::Keyed(FILTER_PARAMS)),
    ("eth_getStorageAt", Entry::Positional(&[Some("address"), Some("uint"), None])),
    ("eth_getProof", Entry::Positional(&[Some("address"), Some("uint[]"), None])),
    ("eth_getTransactionByBlockHashAndIndex", Entry::Positional(&[Some("bytes32"), Some("uint")])),
    ("eth_getTransactionByHash", Entry::Positional(&[Some("bytes32")])),
    ("eth_getTransactionCount", Entry::Positional(&[Some("address"), None])),
    ("eth_getTransactionReceipt", Entry::Positional(&[Some("bytes32")])),
    ("eth_getUncleCountByBlockHash", Entry::Positional(&[Some("bytes32")])),
    ("eth_newFilter", Entry::Keyed(FILTER_PARAMS)),
    ("eth_sendRawTransaction", Entry::Positional(&[Some("bytes")])),
    ("eth_sendTransaction", Entry::Keyed(TRANSACTION_PARAMS)),
    ("eth_signTransaction", Entry::Keyed(TRANSACTION_PARAMS)),
    ("eth_sign", Entry::Positional(&[Some("address"), Some("bytes")])),
    ("eth_signTypedData", Entry::Positional(&[Some("address"), None])),
    ("eth_submitHashrate", Entry::Positional(&[Some("uint"), Some("bytes32")])),
    ("eth_submitWork", Entry::Positional(&[Some("bytes8"), Some("bytes32"), Some("bytes32")])),
    // personal
    ("personal_sendTransaction", Entry::Keyed(TRANSACTION_PARAMS)),
    ("personal_lockAccount", Entry::Positional(&[Some("address")])),
    ("personal_unlockAccount", Entry::Positional(&[Some("address"), None, None])),
    ("personal_sign", Entry::Positional(&[None, Some("address"), None])),
    ("personal_signTypedData", Entry::Positional(&[None, Some("address"), None])),
    ("trace_call", Entry::Keyed(TRACE_PARAMS)),
    // parity
    ("parity_listStorageKeys", Entry::Positional(&[Some("address"), None, None, None])),
];

/// Read-only mapping from method name to its parameter schema.
#[derive(Debug, Clone, Default)]
pub struct MethodSchemaCatalog {
    schemas: HashMap<String, ParamSchema>,
}

impl MethodSchemaCatalog {
    /// An empty catalog: every method passes through unformatted.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard eth/personal/trace/parity schema table.
    pub fn builtin() -> Self {
        let schemas = BUILTIN_SCHEMAS
            .iter()
            .map(|(method, entry)| {
                let schema = match entry {
                    Entry::Positional(kinds) => ParamSchema::positional(kinds),
                    Entry::Keyed(fields) => ParamSchema::keyed(fields),
                };
                (method.to_string(), schema)
            })
            .collect();
        Self { schemas }
    }

    pub fn insert(&mut self, method: &str, schema: ParamSchema) -> Result<(), SchemaError> {
        if self.schemas.contains_key(method) {
            return Err(SchemaError::DuplicateMethod(method.to_string()));
        }
        self.schemas.insert(method.to_string(), schema);
        Ok(())
    }

    /// Merge a declarative table (`{"method": [..] | {..}}`) into the catalog.
    ///
    /// The whole table is validated before anything is inserted, so a bad
    /// entry leaves the catalog unchanged.
    pub fn extend_from_json(&mut self, table: &Value) -> Result<(), SchemaError> {
        let entries = table.as_object().ok_or_else(|| SchemaError::InvalidSchema {
            method: "<table>".to_string(),
            found: shape_of(table),
        })?;

        let mut parsed = Vec::with_capacity(entries.len());
        for (method, value) in entries {
            if self.schemas.contains_key(method) {
                return Err(SchemaError::DuplicateMethod(method.clone()));
            }
            parsed.push((method.clone(), ParamSchema::from_json(method, value)?));
        }

        for (method, schema) in parsed {
            debug!("Loaded schema for {}", method);
            self.schemas.insert(method, schema);
        }
        Ok(())
    }

    pub fn lookup(&self, method: &str) -> Option<&ParamSchema> {
        self.schemas.get(method)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSchema)> {
        self.schemas.iter().map(|(method, schema)| (method.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_lookup() {
        let catalog = MethodSchemaCatalog::builtin();

        assert_eq!(
            catalog.lookup("eth_getBalance"),
            Some(&ParamSchema::Positional(vec![Some(Kind::Address), None]))
        );

        match catalog.lookup("eth_getLogs") {
            Some(ParamSchema::Keyed(fields)) => {
                assert_eq!(fields["address"], Kind::Array(Box::new(Kind::Address)));
                assert_eq!(fields["to"], Kind::Address);
            }
            other => panic!("unexpected schema: {:?}", other),
        }

        assert!(catalog.lookup("eth_blockNumber").is_none());
        assert!(catalog.lookup("admin_peers").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut catalog = MethodSchemaCatalog::builtin();
        let err = catalog
            .insert("eth_getBalance", ParamSchema::positional(&[None]))
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateMethod("eth_getBalance".to_string()));
    }

    #[test]
    fn test_extend_from_json() {
        let mut catalog = MethodSchemaCatalog::new();
        catalog
            .extend_from_json(&json!({
                "custom_lookup": ["address", null, "uint"],
                "custom_send": {"from": "address", "amount": "uint"}
            }))
            .unwrap();

        assert_eq!(
            catalog.lookup("custom_lookup"),
            Some(&ParamSchema::Positional(vec![Some(Kind::Address), None, Some(Kind::Uint)]))
        );
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_extend_from_json_rejects_scalar_schema() {
        let mut catalog = MethodSchemaCatalog::new();
        let err = catalog
            .extend_from_json(&json!({"good": ["address"], "bad": "address"}))
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::InvalidSchema {
                method: "bad".to_string(),
                found: "string"
            }
        );
        // Nothing from a rejected table is kept
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_extend_from_json_rejects_bad_entries() {
        let mut catalog = MethodSchemaCatalog::new();
        let err = catalog.extend_from_json(&json!({"m": ["address", 5]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidEntry { ref position, .. } if position == "1"));

        let err = catalog.extend_from_json(&json!({"m": {"to": true}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidEntry { ref position, .. } if position == "to"));
    }
}
