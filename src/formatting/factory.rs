use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::formatter::{Formatter, Predicate};
use super::normalizer::NormalizerChain;
use crate::schema::{MethodSchemaCatalog, ParamSchema};

/// Per-method formatters, keyed by RPC method name.
#[derive(Clone, Default)]
pub struct FormatterTable {
    formatters: HashMap<String, Formatter>,
}

impl FormatterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: &str, formatter: Formatter) {
        self.formatters.insert(method.to_string(), formatter);
    }

    pub fn with(mut self, method: &str, formatter: Formatter) -> Self {
        self.insert(method, formatter);
        self
    }

    pub fn get(&self, method: &str) -> Option<&Formatter> {
        self.formatters.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.formatters.contains_key(method)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }

    /// Wrap every formatter in the table with `outer`.
    pub fn map(self, outer: impl Fn(Formatter) -> Formatter) -> Self {
        Self {
            formatters: self
                .formatters
                .into_iter()
                .map(|(method, f)| (method, outer(f)))
                .collect(),
        }
    }

    /// Gate every formatter on `predicate`, leaving other results untouched.
    pub fn gated(self, predicate: Predicate) -> Self {
        self.map(|f| f.gated(predicate))
    }
}

/// Turns a schema catalog plus a normalizer chain into per-method formatters.
pub struct FormatterFactory;

impl FormatterFactory {
    pub fn build(catalog: &MethodSchemaCatalog, chain: NormalizerChain) -> FormatterTable {
        let chain = Arc::new(chain);
        let mut table = FormatterTable::new();

        for (method, schema) in catalog.iter() {
            table.insert(method, Self::for_schema(schema, &chain));
        }

        debug!("Built {} schema formatters with chain {:?}", table.len(), chain);
        table
    }

    /// Formatter over the whole argument list for one schema.
    ///
    /// Positional schemas normalize argument i with kind i. Keyed schemas
    /// normalize the record in argument 0 and leave the rest untouched.
    pub fn for_schema(schema: &ParamSchema, chain: &Arc<NormalizerChain>) -> Formatter {
        match schema {
            ParamSchema::Positional(kinds) => Formatter::Args(
                kinds
                    .iter()
                    .map(|kind| match kind {
                        Some(kind) => Formatter::Normalize(kind.clone(), Arc::clone(chain)),
                        None => Formatter::Identity,
                    })
                    .collect(),
            ),
            ParamSchema::Keyed(fields) => Formatter::at_index(
                0,
                Formatter::Fields(
                    fields
                        .iter()
                        .map(|(name, kind)| {
                            (name.clone(), Formatter::Normalize(kind.clone(), Arc::clone(chain)))
                        })
                        .collect(),
                ),
            ),
        }
    }

    /// Result formatters: each schema's record formatter, run only when the
    /// result is a record.
    ///
    /// The proxy does not install these; they are for callers that pair a
    /// catalog describing result records with [`NormalizerChain::result_default`]
    /// in their own [`FormattingMiddleware`](crate::middleware::FormattingMiddleware).
    pub fn build_results(catalog: &MethodSchemaCatalog, chain: NormalizerChain) -> FormatterTable {
        let chain = Arc::new(chain);
        let mut table = FormatterTable::new();

        for (method, schema) in catalog.iter() {
            if let ParamSchema::Keyed(fields) = schema {
                let record = Formatter::Fields(
                    fields
                        .iter()
                        .map(|(name, kind)| {
                            (name.clone(), Formatter::Normalize(kind.clone(), Arc::clone(&chain)))
                        })
                        .collect(),
                );
                table.insert(method, record.gated(Predicate::IsRecord));
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Kind, ParamSchema};
    use serde_json::{json, Value};

    fn request_table() -> FormatterTable {
        FormatterFactory::build(&MethodSchemaCatalog::builtin(), NormalizerChain::request_default())
    }

    #[test]
    fn test_one_formatter_per_method() {
        let catalog = MethodSchemaCatalog::builtin();
        let table = request_table();
        assert_eq!(table.len(), catalog.len());
        for (method, _) in catalog.iter() {
            assert!(table.contains(method), "missing formatter for {}", method);
        }
    }

    #[test]
    fn test_positional_formats_first_n_only() {
        let table = request_table();
        let f = table.get("eth_getStorageAt").unwrap();

        // [address, uint, _] plus an extra trailing value
        let out = f.apply(json!([
            "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            5,
            7,
            9
        ]));
        assert_eq!(
            out,
            json!(["0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "0x5", 7, 9])
        );
    }

    #[test]
    fn test_keyed_formats_first_argument_only() {
        let table = request_table();
        let f = table.get("eth_call").unwrap();

        let out = f.apply(json!([
            {"gas": 21000, "value": 1, "memo": 5, "data": [0xde, 0xad]},
            12
        ]));
        assert_eq!(
            out,
            json!([
                {"gas": "0x5208", "value": "0x1", "memo": 5, "data": "0xdead"},
                12
            ])
        );
    }

    #[test]
    fn test_keyed_value_above_u64_becomes_hex() {
        let table = request_table();
        let f = table.get("eth_sendTransaction").unwrap();

        let args: Value = serde_json::from_str(r#"[{"value": 20000000000000000000}]"#).unwrap();
        assert_eq!(f.apply(args), json!([{"value": "0x1158e460913d00000"}]));
    }

    #[test]
    fn test_keyed_array_kind() {
        let table = request_table();
        let f = table.get("eth_getLogs").unwrap();

        let a = vec![0x11u8; 20];
        let b = vec![0x22u8; 20];
        let out = f.apply(json!([{"address": [a, b], "fromBlock": "latest"}]));

        let addresses = out[0]["address"].as_array().unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0], json!(format!("0x{}", "11".repeat(20))));
        assert_eq!(addresses[1], json!(format!("0x{}", "22".repeat(20))));
        assert_eq!(out[0]["fromBlock"], json!("latest"));
    }

    #[test]
    fn test_methods_without_schema_have_no_formatter() {
        let table = request_table();
        assert!(table.get("eth_blockNumber").is_none());
    }

    #[test]
    fn test_result_formatters_are_gated_on_records() {
        let mut catalog = MethodSchemaCatalog::new();
        catalog
            .insert("custom_balance", ParamSchema::keyed(&[("amount", "uint")]))
            .unwrap();
        let table = FormatterFactory::build_results(&catalog, NormalizerChain::result_default());
        let f = table.get("custom_balance").unwrap();

        assert_eq!(f.apply(json!({"amount": "0x10", "x": "0x1"})), json!({"amount": 16, "x": "0x1"}));
        assert_eq!(f.apply(json!(null)), json!(null));
        assert_eq!(f.apply(json!("0x10")), json!("0x10"));
    }

    #[test]
    fn test_compose_with_outer_formatter() {
        let table = request_table().map(|f| {
            f.then(Formatter::custom(|v| json!({ "wrapped": v })))
        });
        let f = table.get("eth_getTransactionByHash").unwrap();
        let hash = "ab".repeat(32);
        assert_eq!(
            f.apply(json!([hash.clone()])),
            json!({ "wrapped": [format!("0x{}", hash)] })
        );
    }

    #[test]
    fn test_positional_none_is_identity() {
        let schema = ParamSchema::Positional(vec![None, Some(Kind::Uint)]);
        let f = FormatterFactory::for_schema(&schema, &Arc::new(NormalizerChain::request_default()));
        assert_eq!(f.apply(json!([1, 1])), json!([1, "0x1"]));
    }
}
