//! HTTP header encoding and decoding for x402 protocol messages.
//!
//! Handles Base64-encoded JSON payloads in `PAYMENT-SIGNATURE`,
//! `PAYMENT-REQUIRED`, `PAYMENT-RESPONSE`, and legacy `X-PAYMENT` headers.
//!
//! Corresponds to Python SDK's `http/x402_http_client_base.py`.

use base64::prelude::*;
use r402::proto::{v1, v2, PaymentRequired, SettleResponse};

use crate::error::HttpError;

/// Encodes a V2 payment payload as a Base64 string for the
/// `PAYMENT-SIGNATURE` header.
///
/// # Errors
///
/// Returns [`HttpError::Serialize`] if JSON serialization fails.
pub fn encode_payment_signature<TAccepted: serde::Serialize, TPayload: serde::Serialize>(
    payload: &v2::PaymentPayload<TAccepted, TPayload>,
) -> Result<String, HttpError> {
    let json = serde_json::to_vec(payload)?;
    Ok(BASE64_STANDARD.encode(&json))
}

/// Encodes a V1 payment payload as a Base64 string for the
/// legacy `X-PAYMENT` header.
///
/// # Errors
///
/// Returns [`HttpError::Serialize`] if JSON serialization fails.
pub fn encode_x_payment<TScheme: serde::Serialize, TPayload: serde::Serialize>(
    payload: &v1::PaymentPayload<TScheme, TPayload>,
) -> Result<String, HttpError> {
    let json = serde_json::to_vec(payload)?;
    Ok(BASE64_STANDARD.encode(&json))
}

/// Decodes a `PAYMENT-SIGNATURE` or `X-PAYMENT` header value as raw JSON.
///
/// Scheme implementations further decode the payload into their concrete
/// payment payload type once the scheme is known.
///
/// # Errors
///
/// Returns [`HttpError`] on Base64 or JSON decode failure.
pub fn decode_payment_payload(header_value: &str) -> Result<serde_json::Value, HttpError> {
    let bytes = BASE64_STANDARD.decode(header_value.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Encodes a [`PaymentRequired`] as a Base64 string for the
/// `PAYMENT-REQUIRED` header.
///
/// # Errors
///
/// Returns [`HttpError::Serialize`] if JSON serialization fails.
pub fn encode_payment_required(required: &PaymentRequired) -> Result<String, HttpError> {
    let json = match required {
        PaymentRequired::V1(r) => serde_json::to_vec(r)?,
        PaymentRequired::V2(r) => serde_json::to_vec(r)?,
    };
    Ok(BASE64_STANDARD.encode(&json))
}

/// Decodes a `PAYMENT-REQUIRED` header value into a [`PaymentRequired`].
///
/// Attempts V2 first, then falls back to V1.
///
/// # Errors
///
/// Returns [`HttpError`] on Base64 or JSON decode failure.
pub fn decode_payment_required(header_value: &str) -> Result<PaymentRequired, HttpError> {
    let bytes = BASE64_STANDARD.decode(header_value.trim())?;
    if let Ok(v2) = serde_json::from_slice::<v2::PaymentRequired>(&bytes) {
        return Ok(PaymentRequired::V2(v2));
    }
    let v1 = serde_json::from_slice::<v1::PaymentRequired>(&bytes)?;
    Ok(PaymentRequired::V1(v1))
}

/// Encodes a [`SettleResponse`] as a Base64 string for the
/// `PAYMENT-RESPONSE` header.
///
/// # Errors
///
/// Returns [`HttpError::Serialize`] if JSON serialization fails.
pub fn encode_payment_response(response: &SettleResponse) -> Result<String, HttpError> {
    let json = serde_json::to_vec(response)?;
    Ok(BASE64_STANDARD.encode(&json))
}

/// Decodes a `PAYMENT-RESPONSE` header value into a [`SettleResponse`].
///
/// # Errors
///
/// Returns [`HttpError`] on Base64 or JSON decode failure.
pub fn decode_payment_response(header_value: &str) -> Result<SettleResponse, HttpError> {
    let bytes = BASE64_STANDARD.decode(header_value.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}
