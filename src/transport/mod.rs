pub mod http;
pub mod types;

pub use http::HttpTransport;
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
