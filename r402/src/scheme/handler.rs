//! Facilitator-side scheme handler trait and builder.
//!
//! This module provides [`SchemeHandler`], the trait object type stored in a
//! [`super::SchemeRegistry`], and [`SchemeHandlerBuilder`] for constructing
//! handlers from chain providers.

use crate::facilitator::{BoxFuture, Facilitator, FacilitatorError};
use crate::proto;

/// Errors produced by a built scheme handler.
///
/// A handler is always also a [`Facilitator`] (see the blanket impl below),
/// so this is the same error type rather than a parallel taxonomy.
pub type SchemeHandlerError = FacilitatorError;

/// A built scheme handler: anything capable of verifying and settling
/// payments for the `(chain, scheme)` combination it was built for.
///
/// This is what [`super::SchemeRegistry`] stores. Any [`Facilitator`]
/// implementation gets this for free through the blanket impl below, so
/// chain crates only ever need to implement `Facilitator`.
pub trait SchemeHandler: Send + Sync {
    /// See [`Facilitator::verify`].
    fn verify(
        &self,
        request: proto::VerifyRequest,
    ) -> BoxFuture<'_, Result<proto::VerifyResponse, SchemeHandlerError>>;

    /// See [`Facilitator::settle`].
    fn settle(
        &self,
        request: proto::SettleRequest,
    ) -> BoxFuture<'_, Result<proto::SettleResponse, SchemeHandlerError>>;

    /// See [`Facilitator::supported`].
    fn supported(&self) -> BoxFuture<'_, Result<proto::SupportedResponse, SchemeHandlerError>>;
}

impl<T: Facilitator + ?Sized> SchemeHandler for T {
    fn verify(
        &self,
        request: proto::VerifyRequest,
    ) -> BoxFuture<'_, Result<proto::VerifyResponse, SchemeHandlerError>> {
        Facilitator::verify(self, request)
    }

    fn settle(
        &self,
        request: proto::SettleRequest,
    ) -> BoxFuture<'_, Result<proto::SettleResponse, SchemeHandlerError>> {
        Facilitator::settle(self, request)
    }

    fn supported(&self) -> BoxFuture<'_, Result<proto::SupportedResponse, SchemeHandlerError>> {
        Facilitator::supported(self)
    }
}

/// Trait for building scheme handlers from chain providers.
///
/// The type parameter `P` represents the chain provider type.
pub trait SchemeHandlerBuilder<P> {
    /// Creates a new handler for the given chain provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler cannot be built from the provider.
    fn build(
        &self,
        provider: P,
        config: Option<serde_json::Value>,
    ) -> Result<Box<dyn SchemeHandler>, Box<dyn std::error::Error>>;
}
