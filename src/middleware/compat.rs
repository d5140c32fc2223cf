//! Reconciles the standard node surface with the in-process test backend.
//!
//! The test backend names record fields in snake_case and takes quantities
//! as native integers; the wire protocol uses camelCase and hex quantities.
//! Requests are rewritten into the backend's convention and results back into
//! the wire convention.

use std::sync::Arc;

use super::formatting::FormattingMiddleware;
use crate::error::SchemaError;
use crate::formatting::{Direction, FieldRenameTable, Formatter, FormatterTable, Predicate};

/// `(internal, wire)` field pairs per data category.
pub const TRANSACTION_KEYS: &[(&str, &str)] = &[
    ("block_hash", "blockHash"),
    ("block_number", "blockNumber"),
    ("gas_price", "gasPrice"),
    ("transaction_hash", "transactionHash"),
    ("transaction_index", "transactionIndex"),
];

pub const LOG_KEYS: &[(&str, &str)] = &[
    ("log_index", "logIndex"),
    ("transaction_index", "transactionIndex"),
    ("transaction_hash", "transactionHash"),
    ("block_hash", "blockHash"),
    ("block_number", "blockNumber"),
];

pub const RECEIPT_KEYS: &[(&str, &str)] = &[
    ("block_hash", "blockHash"),
    ("block_number", "blockNumber"),
    ("contract_address", "contractAddress"),
    ("gas_used", "gasUsed"),
    ("cumulative_gas_used", "cumulativeGasUsed"),
    ("transaction_hash", "transactionHash"),
    ("transaction_index", "transactionIndex"),
];

pub const BLOCK_KEYS: &[(&str, &str)] = &[
    ("gas_limit", "gasLimit"),
    ("sha3_uncles", "sha3Uncles"),
    ("transactions_root", "transactionsRoot"),
    ("parent_hash", "parentHash"),
    ("bloom", "logsBloom"),
    ("state_root", "stateRoot"),
    ("receipt_root", "receiptsRoot"),
    ("total_difficulty", "totalDifficulty"),
    ("extra_data", "extraData"),
    ("gas_used", "gasUsed"),
];

pub const TRANSACTION_PARAM_KEYS: &[(&str, &str)] = &[("gas_price", "gasPrice")];

pub const FILTER_PARAM_KEYS: &[(&str, &str)] = &[("from_block", "fromBlock"), ("to_block", "toBlock")];

/// The rename tables, validated and shared by the formatters built from them.
pub struct RenameTables {
    pub transaction: Arc<FieldRenameTable>,
    pub log: Arc<FieldRenameTable>,
    pub receipt: Arc<FieldRenameTable>,
    pub block: Arc<FieldRenameTable>,
    pub transaction_params: Arc<FieldRenameTable>,
    pub filter_params: Arc<FieldRenameTable>,
}

impl RenameTables {
    pub fn load() -> Result<Self, SchemaError> {
        let table = |name: &'static str, pairs: &'static [(&'static str, &'static str)]| {
            FieldRenameTable::new(name, pairs).map(Arc::new)
        };
        Ok(Self {
            transaction: table("transaction", TRANSACTION_KEYS)?,
            log: table("log", LOG_KEYS)?,
            receipt: table("receipt", RECEIPT_KEYS)?,
            block: table("block", BLOCK_KEYS)?,
            transaction_params: table("transaction_params", TRANSACTION_PARAM_KEYS)?,
            filter_params: table("filter_params", FILTER_PARAM_KEYS)?,
        })
    }
}

/// Transaction params: backend field names, integer quantities, no nonce.
fn transaction_params(tables: &RenameTables) -> Formatter {
    Formatter::rename(&tables.transaction_params, Direction::ToInternal)
        .then(Formatter::fields(vec![
            ("gas", Formatter::integer_if_hex()),
            ("gas_price", Formatter::integer_if_hex()),
            ("value", Formatter::integer_if_hex()),
        ]))
        // the test backend rejects explicit nonces
        .then(Formatter::RemoveKey("nonce".to_string()))
}

fn filter_params(tables: &RenameTables) -> Formatter {
    Formatter::rename(&tables.filter_params, Direction::ToInternal).then(Formatter::fields(vec![
        ("from_block", Formatter::integer_if_hex()),
        ("to_block", Formatter::integer_if_hex()),
    ]))
}

fn request_formatters(tables: &RenameTables) -> FormatterTable {
    let block = Formatter::block_number_or_tag;
    let block_and_index = || Formatter::Args(vec![block(), Formatter::integer_if_hex()]);

    FormatterTable::new()
        // eth
        .with("eth_getBlockByNumber", Formatter::Args(vec![block()]))
        .with("eth_getFilterChanges", Formatter::Args(vec![Formatter::HexToInteger]))
        .with("eth_getFilterLogs", Formatter::Args(vec![Formatter::HexToInteger]))
        .with("eth_getBlockTransactionCountByNumber", Formatter::Args(vec![block()]))
        .with("eth_getUncleCountByBlockNumber", Formatter::Args(vec![block()]))
        .with(
            "eth_getTransactionByBlockHashAndIndex",
            Formatter::Args(vec![Formatter::Identity, Formatter::integer_if_hex()]),
        )
        .with("eth_getTransactionByBlockNumberAndIndex", block_and_index())
        .with("eth_getUncleByBlockNumberAndIndex", block_and_index())
        .with("eth_newFilter", Formatter::Args(vec![filter_params(tables)]))
        .with("eth_getLogs", Formatter::Args(vec![filter_params(tables)]))
        .with("eth_sendTransaction", Formatter::Args(vec![transaction_params(tables)]))
        .with("eth_estimateGas", Formatter::Args(vec![transaction_params(tables)]))
        .with("eth_call", Formatter::Args(vec![transaction_params(tables), block()]))
        .with("eth_uninstallFilter", Formatter::Args(vec![Formatter::HexToInteger]))
        .with("eth_getCode", Formatter::Args(vec![Formatter::Identity, block()]))
        // evm
        .with("evm_revert", Formatter::Args(vec![Formatter::HexToInteger]))
        // personal
        .with(
            "personal_sendTransaction",
            Formatter::Args(vec![transaction_params(tables), Formatter::Identity]),
        )
}

fn result_formatters(tables: &RenameTables) -> FormatterTable {
    let record = |f: Formatter| f.gated(Predicate::IsRecord);
    let logs = || {
        Formatter::each(Formatter::rename(&tables.log, Direction::ToWire))
            .gated(Predicate::IsArrayOfRecords)
    };

    let transaction = Formatter::fields(vec![("to", Formatter::EmptyToNull)])
        .then(Formatter::rename(&tables.transaction, Direction::ToWire));
    let receipt = Formatter::fields(vec![(
        "logs",
        Formatter::each(Formatter::rename(&tables.log, Direction::ToWire)),
    )])
    .then(Formatter::rename(&tables.receipt, Direction::ToWire));

    FormatterTable::new()
        // eth
        .with("eth_getBlockByHash", record(Formatter::rename(&tables.block, Direction::ToWire)))
        .with("eth_getBlockByNumber", record(Formatter::rename(&tables.block, Direction::ToWire)))
        .with(
            "eth_getBlockTransactionCountByHash",
            record(Formatter::rename(&tables.transaction, Direction::ToWire)),
        )
        .with(
            "eth_getBlockTransactionCountByNumber",
            record(Formatter::rename(&tables.transaction, Direction::ToWire)),
        )
        .with("eth_getTransactionByHash", record(transaction))
        .with("eth_getTransactionReceipt", record(receipt))
        .with("eth_newFilter", Formatter::IntegerToHex)
        .with("eth_newBlockFilter", Formatter::IntegerToHex)
        .with("eth_newPendingTransactionFilter", Formatter::IntegerToHex)
        .with("eth_getLogs", logs())
        .with("eth_getFilterChanges", logs())
        .with("eth_getFilterLogs", logs())
        // evm
        .with("evm_snapshot", Formatter::IntegerToHex)
}

/// The formatting middleware placed in front of the in-process test backend.
pub fn tester_compat_middleware() -> Result<FormattingMiddleware, SchemaError> {
    let tables = RenameTables::load()?;
    Ok(FormattingMiddleware::new(
        "tester_compat",
        request_formatters(&tables),
        result_formatters(&tables),
    ))
}
