use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::middleware::GasEstimatePolicy;
use crate::schema::MethodSchemaCatalog;

/// Which backend dialect the proxy talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendDialect {
    /// A standard node: wire conventions on both sides
    Node,
    /// The in-process test backend: snake_case records, integer quantities
    Tester,
}

impl FromStr for BackendDialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Ok(BackendDialect::Node),
            "tester" | "eth_tester" => Ok(BackendDialect::Tester),
            other => Err(anyhow!("unknown backend dialect '{}' (expected node or tester)", other)),
        }
    }
}

/// Proxy configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend JSON-RPC endpoint URL
    pub backend_rpc_url: String,
    /// Backend dialect (decides whether the compat layer is installed)
    pub backend_dialect: BackendDialect,
    /// Proxy server port
    pub proxy_port: u16,
    /// Fill omitted `from` / `gas` fields before forwarding
    pub fill_default_fields: bool,
    /// Multiplier applied to gas estimates injected into `eth_call`
    pub gas_estimate_multiplier: u64,
    /// Optional JSON file with extra method schemas
    pub schema_file: Option<PathBuf>,
    /// Log filter directive (`RUST_LOG`), used to build the subscriber filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_rpc_url: "http://127.0.0.1:8545".to_string(),
            backend_dialect: BackendDialect::Node,
            proxy_port: 8546,
            fill_default_fields: true,
            gas_estimate_multiplier: GasEstimatePolicy::default().multiplier,
            schema_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let backend_rpc_url = lookup("BACKEND_RPC_URL").unwrap_or(defaults.backend_rpc_url);

        let backend_dialect = match lookup("BACKEND_DIALECT") {
            Some(value) => value.parse().context("BACKEND_DIALECT is invalid")?,
            None => defaults.backend_dialect,
        };

        let proxy_port: u16 = match lookup("PROXY_PORT") {
            Some(value) => value.parse().context("PROXY_PORT must be a valid u16")?,
            None => defaults.proxy_port,
        };

        let fill_default_fields = match lookup("FILL_DEFAULT_FIELDS") {
            Some(value) => parse_bool(&value).context("FILL_DEFAULT_FIELDS must be true or false")?,
            None => defaults.fill_default_fields,
        };

        let gas_estimate_multiplier: u64 = match lookup("GAS_ESTIMATE_MULTIPLIER") {
            Some(value) => value
                .parse()
                .context("GAS_ESTIMATE_MULTIPLIER must be a valid u64")?,
            None => defaults.gas_estimate_multiplier,
        };
        if gas_estimate_multiplier == 0 {
            bail!("GAS_ESTIMATE_MULTIPLIER must be at least 1");
        }

        let schema_file = lookup("SCHEMA_FILE").filter(|s| !s.is_empty()).map(PathBuf::from);

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        Ok(Config {
            backend_rpc_url,
            backend_dialect,
            proxy_port,
            fill_default_fields,
            gas_estimate_multiplier,
            schema_file,
            log_level,
        })
    }

    pub fn gas_policy(&self) -> GasEstimatePolicy {
        GasEstimatePolicy {
            multiplier: self.gas_estimate_multiplier,
        }
    }

    /// Builtin schemas plus the entries of `SCHEMA_FILE`, if set.
    ///
    /// The file holds a JSON object of method name to schema. Methods that
    /// already have a builtin schema are rejected.
    pub fn load_catalog(&self) -> Result<MethodSchemaCatalog> {
        let mut catalog = MethodSchemaCatalog::builtin();
        if let Some(path) = &self.schema_file {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file {}", path.display()))?;
            let table: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("Schema file {} is not valid JSON", path.display()))?;
            catalog
                .extend_from_json(&table)
                .with_context(|| format!("Schema file {} was rejected", path.display()))?;
        }
        Ok(catalog)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("not a boolean: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend_rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.backend_dialect, BackendDialect::Node);
        assert_eq!(config.proxy_port, 8546);
        assert!(config.fill_default_fields);
        assert_eq!(config.gas_policy(), GasEstimatePolicy { multiplier: 2 });
        assert!(config.schema_file.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BACKEND_RPC_URL", "http://node:8545"),
            ("BACKEND_DIALECT", "tester"),
            ("PROXY_PORT", "9000"),
            ("FILL_DEFAULT_FIELDS", "off"),
            ("GAS_ESTIMATE_MULTIPLIER", "1"),
            ("SCHEMA_FILE", "/etc/schemas.json"),
            ("RUST_LOG", "eth_rpc_format=debug"),
        ]))
        .unwrap();

        assert_eq!(config.backend_rpc_url, "http://node:8545");
        assert_eq!(config.backend_dialect, BackendDialect::Tester);
        assert_eq!(config.proxy_port, 9000);
        assert!(!config.fill_default_fields);
        assert_eq!(config.gas_estimate_multiplier, 1);
        assert_eq!(config.schema_file, Some(PathBuf::from("/etc/schemas.json")));
        assert_eq!(config.log_level, "eth_rpc_format=debug");
    }

    #[test]
    fn test_load_catalog_without_file() {
        let config = Config::default();
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.len(), MethodSchemaCatalog::builtin().len());
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let config = Config {
            schema_file: Some(PathBuf::from("/nonexistent/schemas.json")),
            ..Config::default()
        };
        let err = config.load_catalog().unwrap_err();
        assert!(err.to_string().contains("Failed to read schema file"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("PROXY_PORT", "99999")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BACKEND_DIALECT", "geth")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GAS_ESTIMATE_MULTIPLIER", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("FILL_DEFAULT_FIELDS", "maybe")])).is_err());
    }
}
