use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Which way a rename table is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// internal (`block_number`) → wire (`blockNumber`)
    ToWire,
    /// wire (`blockNumber`) → internal (`block_number`)
    ToInternal,
}

/// Bidirectional field-name mapping between the internal and wire naming
/// conventions of one data category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRenameTable {
    name: &'static str,
    to_wire: HashMap<String, String>,
    to_internal: HashMap<String, String>,
}

impl FieldRenameTable {
    /// Build a table from `(internal, wire)` pairs.
    ///
    /// Fails if two pairs share an internal name or a wire name, since the
    /// table would not be invertible.
    pub fn new(name: &'static str, pairs: &[(&str, &str)]) -> Result<Self, SchemaError> {
        let mut to_wire = HashMap::with_capacity(pairs.len());
        let mut to_internal = HashMap::with_capacity(pairs.len());

        for (internal, wire) in pairs {
            if to_wire.insert(internal.to_string(), wire.to_string()).is_some() {
                return Err(SchemaError::NonInjective {
                    table: name,
                    field: internal.to_string(),
                });
            }
            if to_internal.insert(wire.to_string(), internal.to_string()).is_some() {
                return Err(SchemaError::NonInjective {
                    table: name,
                    field: wire.to_string(),
                });
            }
        }

        Ok(Self {
            name,
            to_wire,
            to_internal,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.to_wire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_wire.is_empty()
    }

    pub fn lookup(&self, field: &str, direction: Direction) -> Option<&str> {
        let map = match direction {
            Direction::ToWire => &self.to_wire,
            Direction::ToInternal => &self.to_internal,
        };
        map.get(field).map(String::as_str)
    }

    /// Rename the keys of a record. Unmapped keys are kept as they are;
    /// anything that is not a record is returned unchanged.
    pub fn apply(&self, value: Value, direction: Direction) -> Value {
        match value {
            Value::Object(record) => {
                let renamed: Map<String, Value> = record
                    .into_iter()
                    .map(|(key, v)| match self.lookup(&key, direction) {
                        Some(target) => (target.to_string(), v),
                        None => (key, v),
                    })
                    .collect();
                Value::Object(renamed)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter_table() -> FieldRenameTable {
        FieldRenameTable::new("filter", &[("from_block", "fromBlock"), ("to_block", "toBlock")])
            .unwrap()
    }

    #[test]
    fn test_apply_both_directions() {
        let table = filter_table();

        let internal = table.apply(
            json!({"fromBlock": 1, "toBlock": "latest", "address": "0x01"}),
            Direction::ToInternal,
        );
        assert_eq!(internal, json!({"from_block": 1, "to_block": "latest", "address": "0x01"}));

        let wire = table.apply(internal, Direction::ToWire);
        assert_eq!(wire, json!({"fromBlock": 1, "toBlock": "latest", "address": "0x01"}));
    }

    #[test]
    fn test_missing_keys_are_noop() {
        let table = filter_table();
        let record = json!({"address": "0x01"});
        assert_eq!(table.apply(record.clone(), Direction::ToInternal), record);
    }

    #[test]
    fn test_non_records_pass_through() {
        let table = filter_table();
        assert_eq!(table.apply(json!(null), Direction::ToWire), json!(null));
        assert_eq!(table.apply(json!([1, 2]), Direction::ToWire), json!([1, 2]));
    }

    #[test]
    fn test_rejects_non_injective_tables() {
        let err = FieldRenameTable::new("bad", &[("a", "x"), ("b", "x")]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NonInjective {
                table: "bad",
                field: "x".to_string()
            }
        );

        let err = FieldRenameTable::new("bad", &[("a", "x"), ("a", "y")]).unwrap_err();
        assert!(matches!(err, SchemaError::NonInjective { .. }));
    }
}
