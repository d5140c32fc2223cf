use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use jsonrpsee::server::{RpcModule, Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::{BackendDialect, Config};
use crate::error::RpcError;
use crate::formatting::NormalizerChain;
use crate::methods::{all_methods, DEPRECATED_ALIASES};
use crate::middleware::{
    tester_compat_middleware, DefaultFields, FormattingMiddleware, LegacyMethodShim, Pipeline,
    RpcSend,
};
use crate::schema::MethodSchemaCatalog;
use crate::transport::HttpTransport;

/// Shared state for the proxy server.
pub struct ProxyState {
    pub config: Config,
    pub pipeline: Pipeline,
}

/// Compose the request pipeline on top of `transport`.
///
/// Outermost first: legacy shim, default fields, schema normalization, then
/// the test-backend compat layer when the dialect needs it.
pub fn build_pipeline(
    config: &Config,
    catalog: &MethodSchemaCatalog,
    transport: Arc<dyn RpcSend>,
) -> Result<Pipeline> {
    let compat = match config.backend_dialect {
        BackendDialect::Tester => Some(tester_compat_middleware()?),
        BackendDialect::Node => None,
    };

    let mut builder = Pipeline::builder()
        .layer(LegacyMethodShim::default())
        .layer_if(
            config.fill_default_fields,
            DefaultFields::new(config.gas_policy()),
        )
        .layer(FormattingMiddleware::from_catalog(
            catalog,
            NormalizerChain::request_default(),
        ));
    if let Some(compat) = compat {
        builder = builder.layer(compat);
    }
    Ok(builder.build(transport))
}

/// Build the RPC module exposing every known method, every deprecated alias
/// and any extra method the catalog declares.
pub fn build_module(
    state: Arc<ProxyState>,
    catalog: &MethodSchemaCatalog,
) -> Result<RpcModule<Arc<ProxyState>>> {
    let mut module = RpcModule::new(state);
    let mut registered = HashSet::new();

    let builtin = all_methods().chain(DEPRECATED_ALIASES.iter().map(|alias| alias.alias));
    for method in builtin {
        if registered.insert(method.to_string()) {
            register_forward(&mut module, method)?;
        }
    }

    let mut extra: Vec<&str> = catalog
        .iter()
        .map(|(method, _)| method)
        .filter(|method| !registered.contains(*method))
        .collect();
    extra.sort_unstable();
    for method in extra {
        debug!("Registering schema-only method {}", method);
        // Method names live as long as the server
        let name: &'static str = method.to_string().leak();
        register_forward(&mut module, name)?;
    }

    info!("Registered {} RPC methods", module.method_names().count());
    Ok(module)
}

fn register_forward(module: &mut RpcModule<Arc<ProxyState>>, method: &'static str) -> Result<()> {
    module.register_async_method(method, move |params, ctx, _| async move {
        // Absent params mean no arguments; by-name params are rejected with -32602
        let p: Option<Vec<Value>> = params.parse()?;
        ctx.pipeline
            .request(method, p.unwrap_or_default())
            .await
            .map_err(to_error_object)
    })?;
    Ok(())
}

/// Bind the proxy and start serving. Returns the bound address and a handle
/// that stops the server when asked.
pub async fn bind(config: Config, addr: SocketAddr) -> Result<(SocketAddr, ServerHandle)> {
    let catalog = config.load_catalog()?;
    info!("Method schema catalog: {} methods", catalog.len());

    let transport = Arc::new(HttpTransport::new(&config.backend_rpc_url));
    let pipeline = build_pipeline(&config, &catalog, transport)?;

    // Check backend reachability
    match pipeline.request("web3_clientVersion", vec![]).await {
        Ok(version) => info!("Backend client version: {}", version),
        Err(e) => warn!("Could not reach backend (will retry on requests): {}", e),
    }

    let state = Arc::new(ProxyState { config, pipeline });
    let module = build_module(state, &catalog)?;

    let cors = tower::ServiceBuilder::new().layer(CorsLayer::permissive());
    let server = Server::builder()
        .set_http_middleware(cors)
        .build(addr)
        .await
        .map_err(|e| anyhow!("Failed to bind server to {}: {}", addr, e))?;
    let local_addr = server
        .local_addr()
        .context("Failed to read bound server address")?;

    Ok((local_addr, server.start(module)))
}

/// Start the proxy and run until it is stopped.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.proxy_port));

    info!("Starting formatting proxy on {}", addr);
    info!("Backend RPC: {} ({:?})", config.backend_rpc_url, config.backend_dialect);

    let (local_addr, handle) = bind(config, addr).await?;
    info!("Formatting proxy listening on http://{}", local_addr);

    handle.stopped().await;

    info!("Formatting proxy stopped");
    Ok(())
}

/// Map a pipeline error to a JSON-RPC error object, keeping backend codes.
fn to_error_object(err: RpcError) -> ErrorObjectOwned {
    let code = i32::try_from(err.code()).unwrap_or(-32603);
    match err {
        RpcError::Backend { message, data, .. } => ErrorObjectOwned::owned(code, message, data),
        other => ErrorObjectOwned::owned(code, other.to_string(), None::<()>),
    }
}
