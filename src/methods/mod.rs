//! Static tables of RPC method names.
//!
//! These are the methods the proxy exposes. Which of them are formatted is
//! decided by the schema catalog and the formatter tables, not here.

pub mod admin;

pub use admin::{AdminApi, AdminStartParams, DeprecatedAlias, ADMIN_METHODS, DEPRECATED_ALIASES};

pub const ETH_METHODS: &[&str] = &[
    "eth_accounts",
    "eth_blockNumber",
    "eth_call",
    "eth_chainId",
    "eth_coinbase",
    "eth_estimateGas",
    "eth_feeHistory",
    "eth_gasPrice",
    "eth_getBalance",
    "eth_getBlockByHash",
    "eth_getBlockByNumber",
    "eth_getBlockTransactionCountByHash",
    "eth_getBlockTransactionCountByNumber",
    "eth_getCode",
    "eth_getFilterChanges",
    "eth_getFilterLogs",
    "eth_getLogs",
    "eth_getProof",
    "eth_getStorageAt",
    "eth_getTransactionByBlockHashAndIndex",
    "eth_getTransactionByBlockNumberAndIndex",
    "eth_getTransactionByHash",
    "eth_getTransactionCount",
    "eth_getTransactionReceipt",
    "eth_getUncleByBlockHashAndIndex",
    "eth_getUncleByBlockNumberAndIndex",
    "eth_getUncleCountByBlockHash",
    "eth_getUncleCountByBlockNumber",
    "eth_hashrate",
    "eth_maxPriorityFeePerGas",
    "eth_mining",
    "eth_newBlockFilter",
    "eth_newFilter",
    "eth_newPendingTransactionFilter",
    "eth_protocolVersion",
    "eth_sendRawTransaction",
    "eth_sendTransaction",
    "eth_sign",
    "eth_signTransaction",
    "eth_signTypedData",
    "eth_submitHashrate",
    "eth_submitWork",
    "eth_syncing",
    "eth_uninstallFilter",
];

pub const NET_METHODS: &[&str] = &["net_listening", "net_peerCount", "net_version"];

pub const WEB3_METHODS: &[&str] = &["web3_clientVersion", "web3_sha3"];

pub const PERSONAL_METHODS: &[&str] = &[
    "personal_importRawKey",
    "personal_listAccounts",
    "personal_lockAccount",
    "personal_newAccount",
    "personal_sendTransaction",
    "personal_sign",
    "personal_signTypedData",
    "personal_unlockAccount",
];

/// Test-backend and tracing extensions.
pub const EXTENSION_METHODS: &[&str] = &[
    "evm_mine",
    "evm_revert",
    "evm_snapshot",
    "parity_listStorageKeys",
    "trace_call",
];

/// Every canonical method name, admin methods included.
pub fn all_methods() -> impl Iterator<Item = &'static str> {
    ETH_METHODS
        .iter()
        .chain(NET_METHODS)
        .chain(WEB3_METHODS)
        .chain(PERSONAL_METHODS)
        .chain(EXTENSION_METHODS)
        .chain(ADMIN_METHODS)
        .copied()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::schema::MethodSchemaCatalog;

    #[test]
    fn test_method_names_are_unique() {
        let mut seen = HashSet::new();
        for method in all_methods() {
            assert!(seen.insert(method), "duplicate method {}", method);
        }
    }

    #[test]
    fn test_every_schema_method_is_exposed() {
        let exposed: HashSet<&str> = all_methods().collect();
        for (method, _) in MethodSchemaCatalog::builtin().iter() {
            assert!(exposed.contains(method), "{} has a schema but is not exposed", method);
        }
    }

    #[test]
    fn test_aliases_do_not_shadow_methods() {
        let exposed: HashSet<&str> = all_methods().collect();
        for alias in DEPRECATED_ALIASES {
            assert!(!exposed.contains(alias.alias));
        }
    }
}
