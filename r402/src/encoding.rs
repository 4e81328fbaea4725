//! Base64 encoding utilities.
//!
//! Re-exports [`Base64Bytes`] from [`crate::proto::encoding`], the canonical
//! definition, so call sites that import the crate-root path and call sites
//! that import the `proto` path share the same type.

pub use crate::proto::encoding::Base64Bytes;
