//! Server initialization and runtime for the facilitator binary.
//!
//! Builds EVM chain providers from [`FacilitatorConfig`], registers the
//! "exact" scheme handlers for them, and serves the facilitator HTTP API
//! until a shutdown signal is received.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::http::Method;
use r402::networks::NetworkRegistry;
use r402::scheme::{SchemeHandlerSlug, SchemeRegistry, X402SchemeId};
use tower_http::cors;

use crate::config::{ChainConfig, FacilitatorConfig};
use crate::handlers::{FacilitatorState, facilitator_router};
use crate::local::FacilitatorLocal;
use crate::util::SigDown;

#[cfg(feature = "chain-eip155")]
fn register_eip155_chain(
    registry: &mut SchemeRegistry,
    network_id: &str,
    chain_cfg: &ChainConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use alloy_network::EthereumWallet;
    use alloy_signer_local::PrivateKeySigner;
    use r402::chain::ChainId;
    use r402::scheme::SchemeHandlerBuilder;
    use r402_evm::chain::{Eip155ChainProvider, Eip155ChainReference};
    use r402_evm::{V1Eip155Exact, V2Eip155Exact};

    let key_str = chain_cfg.signer_private_key.trim();
    if key_str.is_empty() || key_str.starts_with('$') {
        tracing::warn!(
            network = %network_id,
            "Skipping chain: signer_private_key not resolved (missing env var?)"
        );
        return Ok(());
    }

    let chain_id: ChainId = network_id
        .parse()
        .map_err(|e| format!("Invalid CAIP-2 network id {network_id}: {e}"))?;
    let chain_ref = Eip155ChainReference::try_from(&chain_id)
        .map_err(|e| format!("Not an eip155 network {network_id}: {e}"))?;

    let signer: PrivateKeySigner = key_str
        .parse()
        .map_err(|e| format!("Invalid signer key for {network_id}: {e}"))?;
    let wallet = EthereumWallet::from(signer);

    let rpc_url: url::Url = chain_cfg
        .rpc_url
        .parse()
        .map_err(|e| format!("Invalid RPC URL for {network_id}: {e}"))?;

    let provider = Arc::new(Eip155ChainProvider::new(
        chain_ref,
        wallet,
        &[(rpc_url, None)],
        true,
        false,
        120,
    )?);

    let v1_handler = V1Eip155Exact.build(Arc::clone(&provider), None)?;
    let v1_slug = SchemeHandlerSlug::new(
        chain_id.clone(),
        V1Eip155Exact.x402_version(),
        V1Eip155Exact.scheme().to_owned(),
    );
    registry.insert(v1_slug, v1_handler);

    let v2_handler = V2Eip155Exact.build(Arc::clone(&provider), None)?;
    let v2_slug = SchemeHandlerSlug::new(
        chain_id,
        V2Eip155Exact.x402_version(),
        V2Eip155Exact.scheme().to_owned(),
    );
    registry.insert(v2_slug, v2_handler);

    tracing::info!(network = %network_id, "Registered eip155 exact scheme (v1 + v2)");
    Ok(())
}

/// Builds the scheme handler registry from the configured chains.
///
/// Chains whose signer key did not resolve (e.g. a `$VAR` left unexpanded)
/// are skipped with a warning rather than failing startup.
fn build_registry(config: &FacilitatorConfig) -> Result<SchemeRegistry, Box<dyn std::error::Error>> {
    let mut registry = SchemeRegistry::new();

    #[cfg(feature = "chain-eip155")]
    for (network_id, chain_cfg) in &config.chains {
        register_eip155_chain(&mut registry, network_id, chain_cfg)?;
    }

    #[cfg(not(feature = "chain-eip155"))]
    {
        let _ = &config.chains;
    }

    Ok(registry)
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Loads configuration, wires up chain providers, and serves the facilitator
/// HTTP API until a shutdown signal is received.
///
/// # Errors
///
/// Returns an error if configuration loading, chain provider construction,
/// or the HTTP listener fails.
pub async fn run(config: FacilitatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        chains = config.chains.len(),
        "Loaded configuration"
    );

    if config.chains.is_empty() {
        tracing::warn!("No chains configured — facilitator will report no supported schemes");
    }

    let registry = build_registry(&config)?;
    let networks = NetworkRegistry::new();
    let facilitator: FacilitatorState = Arc::new(FacilitatorLocal::new(registry, networks));

    let app = axum::Router::new()
        .merge(facilitator_router(Arc::clone(&facilitator)))
        .route("/health", axum::routing::get(health))
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Facilitator listening on http://{addr}");

    let sig_down = SigDown::try_new()?;
    let token = sig_down.cancellation_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await?;

    tracing::info!("Facilitator shut down gracefully");
    Ok(())
}
