use std::sync::Arc;

use serde_json::Value;

use super::normalizer::NormalizerChain;
use super::quantity::{hex_to_integer, integer_to_hex, is_hex_string, is_named_block};
use super::rename::{Direction, FieldRenameTable};
use crate::schema::Kind;

/// Condition gating a [`Formatter::When`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// A JSON object
    IsRecord,
    /// A JSON array whose elements are all objects
    IsArrayOfRecords,
    /// Anything but `latest` / `earliest` / `pending`
    IsNotNamedBlock,
    IsHexString,
    IsEmptyString,
}

impl Predicate {
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Predicate::IsRecord => value.is_object(),
            Predicate::IsArrayOfRecords => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
            Predicate::IsNotNamedBlock => !is_named_block(value),
            Predicate::IsHexString => is_hex_string(value),
            Predicate::IsEmptyString => value.as_str() == Some(""),
        }
    }
}

/// A value-to-value transform built from a small fixed vocabulary.
///
/// Formatters are plain data: they are assembled once from declarative
/// tables, shared behind the middleware that owns them, and applied per call
/// without side effects.
#[derive(Clone)]
pub enum Formatter {
    Identity,
    /// Hex quantity → integer
    HexToInteger,
    /// Integer → hex quantity
    IntegerToHex,
    /// `""` → `null`
    EmptyToNull,
    /// Apply the inner formatter only when the predicate holds
    When(Predicate, Box<Formatter>),
    /// Apply each step in order, left to right
    Steps(Vec<Formatter>),
    /// Apply the i-th formatter to the i-th positional argument
    Args(Vec<Formatter>),
    /// Apply a formatter to one positional argument
    AtIndex(usize, Box<Formatter>),
    /// Apply formatters to the named fields of a record that are present
    Fields(Vec<(String, Formatter)>),
    Rename(Arc<FieldRenameTable>, Direction),
    RemoveKey(String),
    /// Apply the inner formatter to every element of an array
    EachElement(Box<Formatter>),
    /// Run a value through a normalizer chain as the given kind
    Normalize(Kind, Arc<NormalizerChain>),
    Custom(Arc<dyn Fn(Value) -> Value + Send + Sync>),
}

impl Formatter {
    pub fn when(predicate: Predicate, inner: Formatter) -> Self {
        Formatter::When(predicate, Box::new(inner))
    }

    pub fn at_index(index: usize, inner: Formatter) -> Self {
        Formatter::AtIndex(index, Box::new(inner))
    }

    pub fn each(inner: Formatter) -> Self {
        Formatter::EachElement(Box::new(inner))
    }

    pub fn fields(fields: Vec<(&str, Formatter)>) -> Self {
        Formatter::Fields(
            fields
                .into_iter()
                .map(|(name, f)| (name.to_string(), f))
                .collect(),
        )
    }

    pub fn rename(table: &Arc<FieldRenameTable>, direction: Direction) -> Self {
        Formatter::Rename(Arc::clone(table), direction)
    }

    pub fn custom(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Formatter::Custom(Arc::new(f))
    }

    /// Hex → integer, except for named block tags.
    pub fn block_number_or_tag() -> Self {
        Formatter::when(
            Predicate::IsNotNamedBlock,
            Formatter::when(Predicate::IsHexString, Formatter::HexToInteger),
        )
    }

    /// Hex → integer when the value is a hex string.
    pub fn integer_if_hex() -> Self {
        Formatter::when(Predicate::IsHexString, Formatter::HexToInteger)
    }

    /// Run `self`, then `next` on its output.
    pub fn then(self, next: Formatter) -> Self {
        match self {
            Formatter::Steps(mut steps) => {
                steps.push(next);
                Formatter::Steps(steps)
            }
            first => Formatter::Steps(vec![first, next]),
        }
    }

    /// Only run `self` when `predicate` holds; other values pass untouched.
    pub fn gated(self, predicate: Predicate) -> Self {
        Formatter::when(predicate, self)
    }

    pub fn apply(&self, value: Value) -> Value {
        match self {
            Formatter::Identity => value,
            Formatter::HexToInteger => hex_to_integer(value),
            Formatter::IntegerToHex => integer_to_hex(value),
            Formatter::EmptyToNull => match value {
                Value::String(s) if s.is_empty() => Value::Null,
                other => other,
            },
            Formatter::When(predicate, inner) => {
                if predicate.test(&value) {
                    inner.apply(value)
                } else {
                    value
                }
            }
            Formatter::Steps(steps) => steps.iter().fold(value, |value, step| step.apply(value)),
            Formatter::Args(formatters) => match value {
                Value::Array(args) => Value::Array(
                    args.into_iter()
                        .enumerate()
                        .map(|(i, arg)| match formatters.get(i) {
                            Some(f) => f.apply(arg),
                            None => arg,
                        })
                        .collect(),
                ),
                other => other,
            },
            Formatter::AtIndex(index, inner) => match value {
                Value::Array(mut args) => {
                    if let Some(arg) = args.get_mut(*index) {
                        *arg = inner.apply(arg.take());
                    }
                    Value::Array(args)
                }
                other => other,
            },
            Formatter::Fields(fields) => match value {
                Value::Object(mut record) => {
                    for (name, f) in fields {
                        if let Some(field) = record.get_mut(name) {
                            *field = f.apply(field.take());
                        }
                    }
                    Value::Object(record)
                }
                other => other,
            },
            Formatter::Rename(table, direction) => table.apply(value, *direction),
            Formatter::RemoveKey(key) => match value {
                Value::Object(mut record) => {
                    record.remove(key);
                    Value::Object(record)
                }
                other => other,
            },
            Formatter::EachElement(inner) => match value {
                Value::Array(items) => {
                    Value::Array(items.into_iter().map(|item| inner.apply(item)).collect())
                }
                other => other,
            },
            Formatter::Normalize(kind, chain) => chain.normalize(kind, value),
            Formatter::Custom(f) => f(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_apply_left_to_right() {
        let f = Formatter::custom(|v| json!(format!("{}a", v.as_str().unwrap_or_default())))
            .then(Formatter::custom(|v| json!(format!("{}b", v.as_str().unwrap_or_default()))));
        assert_eq!(f.apply(json!("")), json!("ab"));
    }

    #[test]
    fn test_args_leave_trailing_values() {
        let f = Formatter::Args(vec![Formatter::HexToInteger]);
        assert_eq!(f.apply(json!(["0x10", "0x20"])), json!([16, "0x20"]));
        // Fewer arguments than formatters is fine
        let f = Formatter::Args(vec![Formatter::Identity, Formatter::HexToInteger]);
        assert_eq!(f.apply(json!(["0x10"])), json!(["0x10"]));
    }

    #[test]
    fn test_block_number_or_tag() {
        let f = Formatter::block_number_or_tag();
        assert_eq!(f.apply(json!("0x1f")), json!(31));
        for tag in ["latest", "earliest", "pending"] {
            assert_eq!(f.apply(json!(tag)), json!(tag));
        }
        assert_eq!(f.apply(json!(31)), json!(31));
    }

    #[test]
    fn test_fields_only_touch_present_keys() {
        let f = Formatter::fields(vec![("gas", Formatter::HexToInteger), ("value", Formatter::HexToInteger)]);
        let out = f.apply(json!({"gas": "0x5208", "to": "0xabc"}));
        assert_eq!(out, json!({"gas": 21000, "to": "0xabc"}));
    }

    #[test]
    fn test_gated_formatter_skips_non_records() {
        let f = Formatter::RemoveKey("nonce".to_string()).gated(Predicate::IsRecord);
        assert_eq!(f.apply(json!(null)), json!(null));
        assert_eq!(f.apply(json!({"nonce": 1, "a": 2})), json!({"a": 2}));
    }

    #[test]
    fn test_array_of_records_predicate() {
        assert!(Predicate::IsArrayOfRecords.test(&json!([{"a": 1}, {}])));
        assert!(Predicate::IsArrayOfRecords.test(&json!([])));
        assert!(!Predicate::IsArrayOfRecords.test(&json!(["0xabc"])));
        assert!(!Predicate::IsArrayOfRecords.test(&json!({"a": 1})));
    }

    #[test]
    fn test_empty_to_null_inside_each() {
        let f = Formatter::each(Formatter::fields(vec![("to", Formatter::EmptyToNull)]));
        assert_eq!(
            f.apply(json!([{"to": ""}, {"to": "0x01"}])),
            json!([{"to": null}, {"to": "0x01"}])
        );
    }
}
