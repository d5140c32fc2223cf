use serde_json::Value;
use tracing::debug;

use crate::error::RpcError;
use crate::middleware::RpcSend;

pub const ADD_PEER: &str = "admin_addPeer";
pub const DATADIR: &str = "admin_datadir";
pub const NODE_INFO: &str = "admin_nodeInfo";
pub const PEERS: &str = "admin_peers";
pub const START_RPC: &str = "admin_startRPC";
pub const START_WS: &str = "admin_startWS";
pub const STOP_RPC: &str = "admin_stopRPC";
pub const STOP_WS: &str = "admin_stopWS";

/// Node-management methods. None of them carry a parameter schema.
pub const ADMIN_METHODS: &[&str] = &[
    ADD_PEER, DATADIR, NODE_INFO, PEERS, START_RPC, START_WS, STOP_RPC, STOP_WS,
];

/// A deprecated method name and what replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedAlias {
    /// Name callers may still use
    pub alias: &'static str,
    /// Name of the replacement operation, as shown in the notice
    pub replacement: &'static str,
    /// RPC method the alias forwards to
    pub method: &'static str,
}

impl DeprecatedAlias {
    pub fn notice(&self) -> String {
        format!(
            "{} is deprecated in favor of {} ({})",
            self.alias, self.replacement, self.method
        )
    }
}

pub const DEPRECATED_ALIASES: &[DeprecatedAlias] = &[
    DeprecatedAlias { alias: "addPeer", replacement: "add_peer", method: ADD_PEER },
    DeprecatedAlias { alias: "nodeInfo", replacement: "node_info", method: NODE_INFO },
    DeprecatedAlias { alias: "startRPC", replacement: "start_rpc", method: START_RPC },
    DeprecatedAlias { alias: "stopRPC", replacement: "stop_rpc", method: STOP_RPC },
    DeprecatedAlias { alias: "startWS", replacement: "start_ws", method: START_WS },
    DeprecatedAlias { alias: "stopWS", replacement: "stop_ws", method: STOP_WS },
];

/// Arguments for `admin_startRPC` / `admin_startWS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStartParams {
    pub host: String,
    pub port: String,
    pub cors: String,
    pub apis: String,
}

impl Default for AdminStartParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "8546".to_string(),
            cors: String::new(),
            apis: "eth,net,web3".to_string(),
        }
    }
}

impl AdminStartParams {
    /// Positional arguments in wire order: host, port, cors, apis.
    pub fn into_params(self) -> Vec<Value> {
        vec![
            Value::String(self.host),
            Value::String(self.port),
            Value::String(self.cors),
            Value::String(self.apis),
        ]
    }
}

/// Typed access to the admin namespace over any send stage.
pub struct AdminApi<'a> {
    client: &'a dyn RpcSend,
}

impl<'a> AdminApi<'a> {
    pub fn new(client: &'a dyn RpcSend) -> Self {
        Self { client }
    }

    pub async fn add_peer(&self, enode: &str) -> Result<Value, RpcError> {
        debug!("admin_addPeer: {}", enode);
        self.client.send(ADD_PEER, vec![Value::String(enode.to_string())]).await
    }

    pub async fn datadir(&self) -> Result<Value, RpcError> {
        self.client.send(DATADIR, Vec::new()).await
    }

    pub async fn node_info(&self) -> Result<Value, RpcError> {
        self.client.send(NODE_INFO, Vec::new()).await
    }

    pub async fn peers(&self) -> Result<Value, RpcError> {
        self.client.send(PEERS, Vec::new()).await
    }

    pub async fn start_rpc(&self, params: AdminStartParams) -> Result<Value, RpcError> {
        self.client.send(START_RPC, params.into_params()).await
    }

    pub async fn start_ws(&self, params: AdminStartParams) -> Result<Value, RpcError> {
        self.client.send(START_WS, params.into_params()).await
    }

    pub async fn stop_rpc(&self) -> Result<Value, RpcError> {
        self.client.send(STOP_RPC, Vec::new()).await
    }

    pub async fn stop_ws(&self) -> Result<Value, RpcError> {
        self.client.send(STOP_WS, Vec::new()).await
    }
}
