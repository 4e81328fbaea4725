//! x402 client core.
//!
//! Transport-agnostic payment client logic: turns a [`PaymentRequired`]
//! response into a signed payment by running registered scheme clients'
//! candidates through a policy chain and a selector. HTTP-specific retry
//! and header wiring lives in `r402-http`'s client middleware, which is
//! built on these same scheme abstractions.
//!
//! Corresponds to Python SDK's `client_base.py`.

use std::sync::Arc;

use crate::proto::PaymentRequired;
use crate::scheme::{
    FirstMatch, PaymentCandidate, PaymentPolicy, PaymentSelector, X402Error, X402SchemeClient,
};

/// State of a single client-side payment attempt.
///
/// A successful attempt moves `Init -> Selected -> Signed -> Paid`. An
/// attempt moves to `Failed` from `Init` (nothing to select) or `Selected`
/// (signing the chosen candidate errored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    /// No candidate has been chosen yet.
    Init,
    /// A candidate survived the policy chain and selector.
    Selected,
    /// The selected candidate has been signed.
    Signed,
    /// The signed payment is ready to attach to a retried request.
    Paid,
    /// The attempt failed and produced no usable payment.
    Failed,
}

/// A selected and signed payment, ready to attach to a retried request.
#[derive(Debug)]
pub struct SignedPayment {
    /// The candidate that was selected and signed.
    pub candidate: PaymentCandidate,
    /// The base64-encoded payment header value.
    pub header_value: String,
    /// Always [`PaymentState::Paid`]; kept on the result so callers that
    /// pattern-match on state don't need a separate success marker.
    pub state: PaymentState,
}

/// Registered scheme clients an [`X402ClientBase`] draws candidates from.
#[derive(Default)]
struct ClientSchemes(Vec<Arc<dyn X402SchemeClient>>);

impl ClientSchemes {
    fn push(&mut self, scheme: impl X402SchemeClient + 'static) {
        self.0.push(Arc::new(scheme));
    }

    fn candidates(&self, payment_required: &PaymentRequired) -> Vec<PaymentCandidate> {
        self.0
            .iter()
            .flat_map(|scheme| scheme.accept(payment_required))
            .collect()
    }
}

impl std::fmt::Debug for ClientSchemes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSchemes")
            .field("registered", &self.0.len())
            .finish()
    }
}

/// Transport-agnostic x402 client core.
///
/// Holds registered scheme clients, a chain of [`PaymentPolicy`]s applied in
/// registration order, and a [`PaymentSelector`] that picks the final
/// candidate. [`Self::create_payment`] runs a 402 response through all
/// three stages and signs the result.
///
/// Corresponds to Python SDK's `x402ClientBase`.
#[derive(Debug)]
pub struct X402ClientBase<TSelector = FirstMatch> {
    schemes: ClientSchemes,
    policies: Vec<Arc<dyn PaymentPolicy>>,
    selector: TSelector,
}

impl Default for X402ClientBase<FirstMatch> {
    fn default() -> Self {
        Self {
            schemes: ClientSchemes::default(),
            policies: Vec::new(),
            selector: FirstMatch,
        }
    }
}

impl X402ClientBase<FirstMatch> {
    /// Creates a new client core using [`FirstMatch`] selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<TSelector> X402ClientBase<TSelector> {
    /// Registers a scheme client.
    #[must_use]
    pub fn register(mut self, scheme: impl X402SchemeClient + 'static) -> Self {
        self.schemes.push(scheme);
        self
    }

    /// Adds a payment policy to the filtering chain.
    ///
    /// Policies run in registration order, each narrowing the candidate
    /// list before the selector picks the final candidate.
    #[must_use]
    pub fn with_policy(mut self, policy: impl PaymentPolicy + 'static) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    /// Replaces the payment selector.
    pub fn with_selector<P: PaymentSelector>(self, selector: P) -> X402ClientBase<P> {
        X402ClientBase {
            schemes: self.schemes,
            policies: self.policies,
            selector,
        }
    }
}

impl<TSelector: PaymentSelector> X402ClientBase<TSelector> {
    /// Selects a single payment candidate for the given 402 response.
    ///
    /// Gathers candidates from every registered scheme client, narrows them
    /// through the policy chain, then asks the selector to pick one.
    ///
    /// # Errors
    ///
    /// Returns [`X402Error::NoMatchingPaymentOption`] if no scheme client
    /// produces a candidate, a policy filters the list to empty, or the
    /// selector accepts nothing.
    pub fn select_payment_requirements(
        &self,
        payment_required: &PaymentRequired,
    ) -> Result<PaymentCandidate, X402Error> {
        let mut candidates = self.schemes.candidates(payment_required);
        if candidates.is_empty() {
            return Err(X402Error::NoMatchingPaymentOption);
        }

        let mut filtered: Vec<&PaymentCandidate> = candidates.iter().collect();
        for policy in &self.policies {
            filtered = policy.apply(filtered);
            if filtered.is_empty() {
                return Err(X402Error::NoMatchingPaymentOption);
            }
        }

        let selected: *const PaymentCandidate = self
            .selector
            .select(&filtered)
            .ok_or(X402Error::NoMatchingPaymentOption)?;

        let index = candidates
            .iter()
            .position(|c| std::ptr::eq(c, selected))
            .expect("selector returned a candidate from the filtered list");

        Ok(candidates.swap_remove(index))
    }

    /// Runs the full payment creation pipeline: selection, then signing.
    ///
    /// Tracks progress as a [`PaymentState`] so callers can report where in
    /// `Init -> Selected -> Signed -> Paid` an attempt failed.
    ///
    /// # Errors
    ///
    /// Returns [`X402Error::NoMatchingPaymentOption`] if selection fails
    /// (state stays `Init`), or [`X402Error::Signing`] if the selected
    /// candidate's signer errors (state reaches `Selected` but not `Paid`).
    pub async fn create_payment(
        &self,
        payment_required: &PaymentRequired,
    ) -> Result<SignedPayment, X402Error> {
        let candidate = self.select_payment_requirements(payment_required)?;
        let header_value = candidate.sign().await?;

        Ok(SignedPayment {
            candidate,
            header_value,
            state: PaymentState::Paid,
        })
    }
}
