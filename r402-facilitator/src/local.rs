//! Local facilitator implementation for x402 payments.
//!
//! This module provides [`FacilitatorLocal`], a [`Facilitator`] implementation that
//! validates x402 payment payloads and performs on-chain settlements using the
//! registered scheme handlers.
//!
//! # Architecture
//!
//! The local facilitator delegates payment processing to scheme handlers registered
//! in a [`SchemeRegistry`]. Each handler is responsible for:
//!
//! - Verifying payment signatures and requirements
//! - Checking on-chain balances
//! - Executing settlement transactions
//!
//! # Scheme Routing
//!
//! The facilitator routes requests to the appropriate scheme handler based on the
//! payment's chain ID and scheme name. The scheme handler slug is extracted from
//! the request (resolving V1 network names through a [`NetworkRegistry`]) and used
//! to look up the handler in the registry.
//!
//! If no matching handler is found, the request fails with
//! [`PaymentVerificationError::UnsupportedScheme`].

use std::collections::HashMap;

use r402::facilitator::{BoxFuture, Facilitator, FacilitatorError};
use r402::networks::NetworkRegistry;
use r402::proto;
use r402::proto::PaymentVerificationError;
use r402::scheme::SchemeRegistry;

/// A local [`Facilitator`] implementation that delegates to scheme handlers.
///
/// Wraps a [`SchemeRegistry`] and a [`NetworkRegistry`], and routes payment
/// verification and settlement requests to the appropriate scheme handler
/// based on the payment's chain ID and scheme name.
pub struct FacilitatorLocal {
    handlers: SchemeRegistry,
    networks: NetworkRegistry,
}

impl std::fmt::Debug for FacilitatorLocal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorLocal")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl FacilitatorLocal {
    /// Creates a new [`FacilitatorLocal`] with the given scheme handler registry
    /// and network registry (used to resolve V1 network names to chain IDs).
    #[must_use]
    pub const fn new(handlers: SchemeRegistry, networks: NetworkRegistry) -> Self {
        Self { handlers, networks }
    }
}

impl Facilitator for FacilitatorLocal {
    fn verify(
        &self,
        request: proto::VerifyRequest,
    ) -> BoxFuture<'_, Result<proto::VerifyResponse, FacilitatorError>> {
        Box::pin(async move {
            let slug = request
                .scheme_handler_slug(&self.networks)
                .ok_or(PaymentVerificationError::UnsupportedScheme)?;
            let handler = self
                .handlers
                .by_slug(&slug)
                .ok_or(PaymentVerificationError::UnsupportedScheme)?;
            handler.verify(request).await
        })
    }

    fn settle(
        &self,
        request: proto::SettleRequest,
    ) -> BoxFuture<'_, Result<proto::SettleResponse, FacilitatorError>> {
        Box::pin(async move {
            let slug = request
                .scheme_handler_slug(&self.networks)
                .ok_or(PaymentVerificationError::UnsupportedScheme)?;
            let handler = self
                .handlers
                .by_slug(&slug)
                .ok_or(PaymentVerificationError::UnsupportedScheme)?;
            handler.settle(request).await
        })
    }

    fn supported(&self) -> BoxFuture<'_, Result<proto::SupportedResponse, FacilitatorError>> {
        Box::pin(async move {
            let mut kinds = Vec::new();
            let mut signers = HashMap::new();
            for provider in self.handlers.values() {
                if let Ok(mut supported) = provider.supported().await {
                    kinds.append(&mut supported.kinds);
                    for (chain_id, signer_addresses) in supported.signers {
                        signers.entry(chain_id).or_insert(signer_addresses);
                    }
                }
            }
            Ok(proto::SupportedResponse {
                kinds,
                extensions: Vec::new(),
                signers,
            })
        })
    }
}
