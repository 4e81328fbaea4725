//! Lifecycle hooks for the x402 client payment creation pipeline.
//!
//! Hooks allow applications to intercept and customize the payment
//! creation lifecycle.
//!
//! ## Hook Lifecycle
//!
//! 1. **`before_payment_creation`** — Run before payment creation; can abort it.
//! 2. **Payment signing executes**
//! 3. **`after_payment_creation`** (on success) — Observes the result.
//! 4. **`on_payment_creation_failure`** (on error) — Can recover with substitute headers.
//!
//! ## Usage
//!
//! Push closures onto the [`ClientHooks`] vectors, or build one up with
//! [`ClientHooks::new`] and direct field access. Every hook is a boxed async
//! closure so heterogeneous hooks (sync logging, async remote calls) can
//! coexist in the same list.

use http::HeaderMap;
use r402::proto;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, type-erased future, as returned by hook closures.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type a hook closure may fail with; swallowed by the caller, which
/// treats a hook error the same as "no opinion".
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Context passed to client payment creation lifecycle hooks.
#[derive(Debug, Clone)]
pub struct PaymentCreationContext {
    /// The parsed payment requirements from the 402 response.
    pub payment_required: proto::PaymentRequired,
}

/// Context passed to after-payment-creation hooks.
#[derive(Debug, Clone)]
pub struct PaymentCreatedContext {
    /// The context the payment was created from.
    pub ctx: PaymentCreationContext,
    /// The signed payment headers.
    pub headers: HeaderMap,
}

/// Context passed to payment-creation-failure hooks.
#[derive(Debug, Clone)]
pub struct PaymentCreationFailureContext {
    /// The context payment creation was attempted from.
    pub ctx: PaymentCreationContext,
    /// Description of the error that caused the failure.
    pub error: String,
}

/// Outcome of a before-payment-creation hook.
#[derive(Debug, Clone, Default)]
pub struct BeforeHookResult {
    /// If `true`, payment creation is skipped and the original 402 is
    /// returned to the caller.
    pub abort: bool,
    /// Human-readable reason, surfaced when `abort` is set.
    pub reason: String,
}

/// Outcome of a payment-creation-failure hook.
#[derive(Debug, Clone)]
pub struct FailureHookResult {
    /// If `true`, `headers` replaces the original error.
    pub recovered: bool,
    /// The substitute headers to retry the request with.
    pub headers: HeaderMap,
}

type BeforeHook = Arc<
    dyn Fn(PaymentCreationContext) -> BoxFuture<'static, Result<Option<BeforeHookResult>, HookError>>
        + Send
        + Sync,
>;
type AfterHook =
    Arc<dyn Fn(PaymentCreatedContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;
type FailureHook = Arc<
    dyn Fn(
            PaymentCreationFailureContext,
        ) -> BoxFuture<'static, Result<Option<FailureHookResult>, HookError>>
        + Send
        + Sync,
>;

/// Lifecycle hooks for client-side payment creation.
///
/// Each lifecycle stage is a list of closures run in registration order.
/// Construct with [`ClientHooks::new`] and push onto the public fields, or
/// use [`ClientHooks::default`] for a client with no hooks.
#[derive(Clone, Default)]
pub struct ClientHooks {
    /// Run before payment creation; any hook returning `abort: true` skips
    /// signing and returns the original 402 to the caller.
    pub before_payment_creation: Vec<BeforeHook>,
    /// Run after a payment is successfully created. Errors are ignored.
    pub after_payment_creation: Vec<AfterHook>,
    /// Run when payment creation fails; the first hook to return
    /// `recovered: true` substitutes its headers for the error.
    pub on_payment_creation_failure: Vec<FailureHook>,
}

impl std::fmt::Debug for ClientHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHooks")
            .field("before_payment_creation", &self.before_payment_creation.len())
            .field("after_payment_creation", &self.after_payment_creation.len())
            .field("on_payment_creation_failure", &self.on_payment_creation_failure.len())
            .finish()
    }
}

impl ClientHooks {
    /// Creates an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a before-payment-creation hook.
    #[must_use]
    pub fn with_before_payment_creation<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PaymentCreationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<BeforeHookResult>, HookError>> + Send + 'static,
    {
        self.before_payment_creation
            .push(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }

    /// Registers an after-payment-creation hook.
    #[must_use]
    pub fn with_after_payment_creation<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PaymentCreatedContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.after_payment_creation
            .push(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }

    /// Registers a payment-creation-failure hook.
    #[must_use]
    pub fn with_payment_creation_failure<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PaymentCreationFailureContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<FailureHookResult>, HookError>> + Send + 'static,
    {
        self.on_payment_creation_failure
            .push(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }
}
