//! Error types for x402 payment verification.
//!
//! This module defines structured error types used when payment verification
//! or settlement fails, along with machine-readable reason codes.

use serde::{Deserialize, Serialize};

/// Errors that can occur during payment verification.
///
/// These errors are returned when a payment fails validation checks
/// performed by the facilitator before settlement.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PaymentVerificationError {
    /// The payment payload format is invalid or malformed.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// The payment amount doesn't match the requirements.
    #[error("Payment amount is invalid with respect to the payment requirements")]
    InvalidPaymentAmount,
    /// The payment authorization's `validAfter` timestamp is in the future.
    #[error("Payment authorization is not yet valid")]
    Early,
    /// The payment authorization's `validBefore` timestamp has passed.
    #[error("Payment authorization is expired")]
    Expired,
    /// The payment's chain ID doesn't match the requirements.
    #[error("Payment chain id is invalid with respect to the payment requirements")]
    ChainIdMismatch,
    /// The payment recipient doesn't match the requirements.
    #[error("Payment recipient is invalid with respect to the payment requirements")]
    RecipientMismatch,
    /// The payment asset (token) doesn't match the requirements.
    #[error("Payment asset is invalid with respect to the payment requirements")]
    AssetMismatch,
    /// The payer's on-chain balance is insufficient.
    #[error("Onchain balance is not enough to cover the payment amount")]
    InsufficientFunds,
    /// The payer's Permit2 allowance is insufficient.
    #[error("Permit2 allowance is not enough to cover the payment amount")]
    Permit2AllowanceInsufficient,
    /// The payment signature is invalid.
    #[error("{0}")]
    InvalidSignature(String),
    /// Transaction simulation failed.
    #[error("{0}")]
    TransactionSimulation(String),
    /// The chain is not supported by this facilitator.
    #[error("Unsupported chain")]
    UnsupportedChain,
    /// The payment scheme is not supported by this facilitator.
    #[error("Unsupported scheme")]
    UnsupportedScheme,
    /// The accepted payment details don't match the requirements.
    #[error("Accepted does not match payment requirements")]
    AcceptedRequirementsMismatch,
    /// The EIP-3009 authorization nonce has already been consumed on-chain.
    #[error("Authorization nonce already used")]
    NonceAlreadyUsed,
}

impl AsPaymentProblem for PaymentVerificationError {
    fn as_payment_problem(&self) -> PaymentProblem {
        // Several internal variants collapse onto the same wire reason; the
        // flat protocol taxonomy is deliberately coarser than our internal
        // diagnostics, which stay available in `details()`/the Display impl.
        let error_reason = match self {
            Self::InvalidFormat(_) => ErrorReason::InvalidPayload,
            Self::InvalidPaymentAmount
            | Self::InsufficientFunds
            | Self::Permit2AllowanceInsufficient => ErrorReason::InsufficientAmount,
            Self::Early | Self::Expired => ErrorReason::PaymentExpired,
            Self::ChainIdMismatch | Self::UnsupportedChain => ErrorReason::InvalidNetwork,
            Self::RecipientMismatch | Self::AcceptedRequirementsMismatch => {
                ErrorReason::InvalidPaymentRequirements
            }
            Self::AssetMismatch => ErrorReason::InvalidAsset,
            Self::InvalidSignature(_) => ErrorReason::InvalidSignature,
            Self::TransactionSimulation(_) => ErrorReason::UnexpectedVerifyError,
            Self::UnsupportedScheme => ErrorReason::InvalidScheme,
            Self::NonceAlreadyUsed => ErrorReason::NonceAlreadyUsed,
        };
        PaymentProblem::new(error_reason, self.to_string())
    }
}

impl From<serde_json::Error> for PaymentVerificationError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidFormat(value.to_string())
    }
}

/// Machine-readable error reason codes for payment failures.
///
/// These are the flat wire codes transported on `VerifyResponse.invalidReason`
/// and `SettleResponse.errorReason`. The first block applies to verification
/// failures, the second to settlement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorReason {
    /// The `(scheme, network)` pair is not registered with any handler.
    InvalidScheme,
    /// The network identifier is malformed or not served by this facilitator.
    InvalidNetwork,
    /// The payload is malformed or fails schema validation.
    InvalidPayload,
    /// The payload doesn't match the payment requirements it claims to satisfy.
    InvalidPaymentRequirements,
    /// The authorized amount is insufficient, unfunded, or under-allowanced.
    InsufficientAmount,
    /// The payment authorization is outside its validity window.
    PaymentExpired,
    /// The signature over the payment authorization is invalid.
    InvalidSignature,
    /// The token asset doesn't match the requirements.
    InvalidAsset,
    /// The payer address could not be established or is invalid.
    InvalidPayer,
    /// The authorization nonce has already been consumed.
    NonceAlreadyUsed,
    /// Verification failed for a reason with no dedicated code.
    UnexpectedVerifyError,
    /// The settlement transaction failed for a reason with no more specific code.
    TransactionFailed,
    /// The payer's on-chain balance could not cover settlement.
    InsufficientBalance,
    /// Gas estimation for the settlement transaction failed.
    GasEstimationFailed,
    /// The settlement transaction was mined but reverted.
    TransactionReverted,
    /// An RPC/transport error occurred while talking to the chain.
    NetworkError,
    /// Settlement did not complete within `maxTimeoutSeconds`.
    Timeout,
    /// A dependency (RPC provider, remote facilitator) was unavailable.
    ServiceUnavailable,
    /// Settlement failed for a reason with no dedicated code.
    UnexpectedSettleError,
}

impl ErrorReason {
    /// Returns the `snake_case` string representation matching the wire format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidScheme => "invalid_scheme",
            Self::InvalidNetwork => "invalid_network",
            Self::InvalidPayload => "invalid_payload",
            Self::InvalidPaymentRequirements => "invalid_payment_requirements",
            Self::InsufficientAmount => "insufficient_amount",
            Self::PaymentExpired => "payment_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidAsset => "invalid_asset",
            Self::InvalidPayer => "invalid_payer",
            Self::NonceAlreadyUsed => "nonce_already_used",
            Self::UnexpectedVerifyError => "unexpected_verify_error",
            Self::TransactionFailed => "transaction_failed",
            Self::InsufficientBalance => "insufficient_balance",
            Self::GasEstimationFailed => "gas_estimation_failed",
            Self::TransactionReverted => "transaction_reverted",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "service_unavailable",
            Self::UnexpectedSettleError => "unexpected_settle_error",
        }
    }
}

impl core::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for converting errors into structured payment problems.
pub trait AsPaymentProblem {
    /// Converts this error into a [`PaymentProblem`].
    fn as_payment_problem(&self) -> PaymentProblem;
}

/// A structured payment error with reason code and details.
///
/// This type is used to return detailed error information to clients
/// when a payment fails verification or settlement.
#[derive(Debug)]
pub struct PaymentProblem {
    /// The machine-readable error reason.
    reason: ErrorReason,
    /// Human-readable error details.
    details: String,
}

impl PaymentProblem {
    /// Creates a new payment problem with the given reason and details.
    #[must_use]
    pub const fn new(reason: ErrorReason, details: String) -> Self {
        Self { reason, details }
    }

    /// Returns the error reason code.
    #[must_use]
    pub const fn reason(&self) -> ErrorReason {
        self.reason
    }

    /// Returns the human-readable error details.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}
