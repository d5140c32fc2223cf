//! Ethereum JSON-RPC Formatting Proxy
//!
//! This crate implements the request/response formatting layer that sits
//! between an Ethereum client library and a JSON-RPC node. Outgoing
//! arguments are normalized according to a declarative per-method schema,
//! omitted transaction fields are filled in, deprecated method names are
//! forwarded to their replacements, and an in-process test backend with its
//! own field-naming and integer conventions can be spoken to transparently.
//!
//! # Architecture
//!
//! ```text
//! Client (ethers.js/web3/curl)
//!     |
//!     | JSON-RPC calls
//!     v
//! Proxy server (this crate)
//!     |  legacy method shim
//!     |  default-field injector
//!     |  schema normalization
//!     |  test-backend compat (optional)
//!     v
//! Backend node (JSON-RPC over HTTP)
//! ```
//!
//! # Modules
//!
//! - `config` - Environment and configuration management
//! - `error` - Schema and RPC error types
//! - `schema` - Method schema catalog and value kinds
//! - `formatting` - Normalizers, formatters and the formatter factory
//! - `middleware` - Onion-style pipeline and its layers
//! - `methods` - Method name tables and the admin namespace
//! - `transport` - JSON-RPC over HTTP backend client
//! - `server` - JSON-RPC server setup and method registration

pub mod config;
pub mod error;
pub mod formatting;
pub mod methods;
pub mod middleware;
pub mod schema;
pub mod server;
pub mod transport;
