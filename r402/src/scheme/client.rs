//! Client-side scheme abstractions for generating and signing payment candidates.
//!
//! This module provides the trait resource clients use to turn a 402
//! response into one or more candidate payments, plus the selection
//! policies used to pick a single candidate to actually sign and send.

use std::future::Future;
use std::pin::Pin;

use crate::chain::ChainId;
use crate::proto::PaymentRequired;

use super::X402SchemeId;

/// Errors that can occur while generating or signing a payment candidate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Signing the payment authorization failed.
    #[error("signing failed: {0}")]
    SigningError(String),
    /// The 402 response carried no requirement this client understands.
    #[error("no matching payment requirement")]
    NoMatchingRequirement,
    /// Any other error not covered by the specific variants.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A candidate payment a client is able to make in response to a 402.
///
/// One [`X402SchemeClient`] may emit several candidates (one per acceptable
/// requirement); [`PaymentSelector`] then picks one to actually sign.
pub struct PaymentCandidate {
    /// The chain this candidate would pay on.
    pub chain_id: ChainId,
    /// The token/asset identifier.
    pub asset: String,
    /// The atomic amount, as a decimal string.
    pub amount: String,
    /// The scheme name (e.g. `"exact"`).
    pub scheme: String,
    /// The recipient address.
    pub pay_to: String,
    /// Produces the base64-encoded `X-PAYMENT` header value for this candidate.
    pub signer: Box<dyn PaymentCandidateSigner>,
}

impl std::fmt::Debug for PaymentCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCandidate")
            .field("chain_id", &self.chain_id)
            .field("asset", &self.asset)
            .field("amount", &self.amount)
            .field("scheme", &self.scheme)
            .field("pay_to", &self.pay_to)
            .finish_non_exhaustive()
    }
}

impl PaymentCandidate {
    /// Signs this candidate, producing the base64-encoded `X-PAYMENT` header value.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub async fn sign(&self) -> Result<String, ClientError> {
        self.signer.sign_payment().await
    }
}

/// Errors surfaced by HTTP-level client middleware wrapping the scheme system.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum X402Error {
    /// The 402 response body or headers could not be parsed.
    #[error("failed to parse 402 response: {0}")]
    ParseError(String),
    /// No registered scheme client produced a usable candidate.
    #[error("no registered scheme can satisfy any offered payment requirement")]
    NoMatchingPaymentOption,
    /// The original request could not be cloned to retry with payment.
    #[error("request body is not cloneable, cannot retry with payment")]
    RequestNotCloneable,
    /// Signing the selected candidate failed.
    #[error(transparent)]
    Signing(#[from] ClientError),
}

/// Produces the signed, wire-ready payment payload for a single candidate.
///
/// Split out from [`PaymentCandidate`] so signing (which is async, since it
/// may hit a hardware signer or remote key service) happens only for the
/// candidate actually selected, not every candidate a 402 response offers.
pub trait PaymentCandidateSigner: Send + Sync {
    /// Signs this candidate and returns the base64-encoded `X-PAYMENT` value.
    fn sign_payment(&self) -> Pin<Box<dyn Future<Output = Result<String, ClientError>> + Send + '_>>;
}

/// Trait for client-side scheme processing.
///
/// Implementations inspect a [`PaymentRequired`] response and produce the
/// [`PaymentCandidate`]s they are able to satisfy; unrecognized requirements
/// are simply omitted rather than treated as an error, since a 402 response
/// typically offers several mutually-acceptable requirements.
pub trait X402SchemeClient: X402SchemeId + Send + Sync {
    /// Returns the candidates this client can pay for the given 402 response.
    fn accept(&self, payment_required: &PaymentRequired) -> Vec<PaymentCandidate>;
}

/// Chooses one [`PaymentCandidate`] out of several to actually sign and send.
///
/// Takes a slice of references since candidates are typically filtered by a
/// [`PaymentPolicy`] chain (which narrows a `Vec<&PaymentCandidate>`) before
/// a selector picks the final one.
pub trait PaymentSelector: Send + Sync {
    /// Returns the selected candidate, or `None` if nothing is acceptable.
    fn select<'a>(&self, candidates: &[&'a PaymentCandidate]) -> Option<&'a PaymentCandidate>;
}

/// Selects the first candidate, in the order the scheme clients produced them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl PaymentSelector for FirstMatch {
    fn select<'a>(&self, candidates: &[&'a PaymentCandidate]) -> Option<&'a PaymentCandidate> {
        candidates.first().copied()
    }
}

/// Prefers a candidate on a specific chain, falling back to the first match.
#[derive(Debug, Clone)]
pub struct PreferChain(pub ChainId);

impl PaymentSelector for PreferChain {
    fn select<'a>(&self, candidates: &[&'a PaymentCandidate]) -> Option<&'a PaymentCandidate> {
        candidates
            .iter()
            .find(|c| c.chain_id == self.0)
            .or_else(|| candidates.first())
            .copied()
    }
}

/// Selects the cheapest candidate by atomic amount, falling back to the
/// first match if no amount parses as a `u128`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxAmount;

impl PaymentSelector for MaxAmount {
    fn select<'a>(&self, candidates: &[&'a PaymentCandidate]) -> Option<&'a PaymentCandidate> {
        candidates
            .iter()
            .filter(|c| c.amount.parse::<u128>().is_ok())
            .min_by_key(|c| c.amount.parse::<u128>().unwrap_or(u128::MAX))
            .or_else(|| candidates.first())
            .copied()
    }
}

/// Filters and reorders candidates before a [`PaymentSelector`] picks one.
///
/// Unlike [`PaymentSelector`], which always returns a single candidate,
/// a policy can narrow the list down to nothing, rejecting every option a
/// 402 response offered.
pub trait PaymentPolicy: Send + Sync {
    /// Returns the filtered and/or reordered candidate list.
    fn apply<'a>(&self, candidates: Vec<&'a PaymentCandidate>) -> Vec<&'a PaymentCandidate>;
}

/// Keeps only candidates on the given chain, in their original order.
#[derive(Debug, Clone)]
pub struct PreferredChain(pub ChainId);

impl PaymentPolicy for PreferredChain {
    fn apply<'a>(&self, candidates: Vec<&'a PaymentCandidate>) -> Vec<&'a PaymentCandidate> {
        candidates
            .into_iter()
            .filter(|c| c.chain_id == self.0)
            .collect()
    }
}

/// Keeps only candidates using the given scheme name.
#[derive(Debug, Clone)]
pub struct PreferredScheme(pub String);

impl PaymentPolicy for PreferredScheme {
    fn apply<'a>(&self, candidates: Vec<&'a PaymentCandidate>) -> Vec<&'a PaymentCandidate> {
        candidates
            .into_iter()
            .filter(|c| c.scheme == self.0)
            .collect()
    }
}

/// Keeps only candidates whose atomic amount is at most the given ceiling.
///
/// Candidates whose amount does not parse as a `u128` are dropped.
#[derive(Debug, Clone, Copy)]
pub struct AmountCeiling(pub u128);

impl PaymentPolicy for AmountCeiling {
    fn apply<'a>(&self, candidates: Vec<&'a PaymentCandidate>) -> Vec<&'a PaymentCandidate> {
        candidates
            .into_iter()
            .filter(|c| c.amount.parse::<u128>().is_ok_and(|a| a <= self.0))
            .collect()
    }
}
