//! Axum route handlers for the local facilitator service.
//!
//! Provides REST endpoints for verify, settle, and supported operations.
//! Corresponds to the facilitator HTTP API defined by the x402 protocol.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use r402::facilitator::Facilitator;
use r402::proto::{SettleResponse, SupportedResponse, VerifyResponse};

use crate::error::FacilitatorError;

/// Shared application state for the facilitator service.
pub type FacilitatorState = Arc<dyn Facilitator>;

/// `GET /supported` — Returns the list of supported payment kinds.
///
/// # Errors
///
/// Returns 500 if no scheme handler could report its supported kinds.
pub async fn get_supported(
    State(fac): State<FacilitatorState>,
) -> Result<Json<SupportedResponse>, FacilitatorError> {
    let result = fac.supported().await.map_err(|e| FacilitatorError::scheme(Box::new(e)))?;
    Ok(Json(result))
}

/// `POST /verify` — Verifies a payment payload against its requirements.
///
/// # Errors
///
/// Returns 404 if no scheme handler is registered, or 400 on bad input.
pub async fn post_verify(
    State(fac): State<FacilitatorState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VerifyResponse>, FacilitatorError> {
    let request = r402::proto::VerifyRequest::from(body);
    let result = fac.verify(request).await.map_err(|e| FacilitatorError::scheme(Box::new(e)))?;
    Ok(Json(result))
}

/// `POST /settle` — Settles a payment on-chain.
///
/// # Errors
///
/// Returns 404 if no scheme handler is registered, or 400 on bad input.
pub async fn post_settle(
    State(fac): State<FacilitatorState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SettleResponse>, FacilitatorError> {
    let request = r402::proto::SettleRequest::from(body);
    let result = fac.settle(request).await.map_err(|e| FacilitatorError::scheme(Box::new(e)))?;
    Ok(Json(result))
}

/// Creates an Axum [`axum::Router`] with all facilitator endpoints.
///
/// Both V1 and V2 payloads are accepted on the same `/verify` and `/settle`
/// endpoints — the protocol version is carried in the body's `x402Version`
/// field and resolved by the registered scheme handler.
///
/// Endpoints:
/// - `GET /supported` — list supported payment kinds
/// - `POST /verify` — verify a payment
/// - `POST /settle` — settle a payment
pub fn facilitator_router(state: FacilitatorState) -> axum::Router {
    axum::Router::new()
        .route("/supported", axum::routing::get(get_supported))
        .route("/verify", axum::routing::post(post_verify))
        .route("/settle", axum::routing::post(post_settle))
        .with_state(state)
}
