//! Wire format types for EVM chain interactions.
//!
//! This module provides types that handle serialization and deserialization
//! of EVM-specific values in the x402 protocol wire format, plus the
//! chain-level abstractions ([`Eip155ChainReference`], [`Eip155TokenDeployment`])
//! used to describe deployed tokens on a specific EVM network.

use std::fmt::{Display, Formatter};
use std::ops::Mul;
use std::str::FromStr;

use alloy_primitives::{Address, U256, hex};
use r402::amount::{MoneyAmount, MoneyAmountParseError};
use r402::chain::{ChainId, DeployedTokenAmount};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The CAIP-2 namespace for EVM-compatible chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// An Ethereum address that serializes with EIP-55 checksum encoding.
///
/// Ensures addresses are always serialized in checksummed format
/// (e.g., `0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045`) for compatibility
/// with the x402 protocol wire format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChecksummedAddress(pub Address);

impl FromStr for ChecksummedAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s).map(Self)
    }
}

impl Display for ChecksummedAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_checksum(None))
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl PartialEq<ChecksummedAddress> for Address {
    fn eq(&self, other: &ChecksummedAddress) -> bool {
        self.eq(&other.0)
    }
}

/// A `uint256` value that serializes as a decimal string on the wire.
///
/// EIP-3009 and Permit2 payloads carry amounts, nonces and deadlines as
/// decimal strings rather than JSON numbers, since `U256` exceeds the range
/// of an `f64`/JSON number.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    /// Returns the inner `U256` value.
    #[must_use]
    pub const fn inner(&self) -> U256 {
        self.0
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl FromStr for TokenAmount {
    type Err = <U256 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s, 10).map(Self)
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A numeric chain ID for EVM-compatible networks.
///
/// Wraps the numeric chain ID used by EVM networks (e.g., `1` for Ethereum
/// mainnet, `8453` for Base). Converts to/from a CAIP-2 [`ChainId`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Eip155ChainReference(u64);

impl Eip155ChainReference {
    /// Creates a new chain reference from a numeric chain ID.
    #[must_use]
    pub const fn new(chain_id: u64) -> Self {
        Self(chain_id)
    }

    /// Returns the numeric chain ID.
    #[must_use]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Converts this chain reference to a CAIP-2 [`ChainId`].
    #[must_use]
    pub fn as_chain_id(&self) -> ChainId {
        ChainId::new(EIP155_NAMESPACE, self.0.to_string())
    }
}

impl From<Eip155ChainReference> for ChainId {
    fn from(value: Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

impl From<&Eip155ChainReference> for ChainId {
    fn from(value: &Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

impl TryFrom<ChainId> for Eip155ChainReference {
    type Error = Eip155ChainReferenceFormatError;

    fn try_from(value: ChainId) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<&ChainId> for Eip155ChainReference {
    type Error = Eip155ChainReferenceFormatError;

    fn try_from(value: &ChainId) -> Result<Self, Self::Error> {
        if value.namespace != EIP155_NAMESPACE {
            return Err(Eip155ChainReferenceFormatError::InvalidNamespace(
                value.namespace.clone(),
            ));
        }
        let chain_id: u64 = value
            .reference
            .parse()
            .map_err(|_| Eip155ChainReferenceFormatError::InvalidReference(value.reference.clone()))?;
        Ok(Self(chain_id))
    }
}

/// Error returned when converting a [`ChainId`] to an [`Eip155ChainReference`].
#[derive(Debug, thiserror::Error)]
pub enum Eip155ChainReferenceFormatError {
    /// The chain ID namespace is not `eip155`.
    #[error("invalid namespace {0}, expected eip155")]
    InvalidNamespace(String),
    /// The chain reference is not a valid numeric value.
    #[error("invalid eip155 chain reference {0}")]
    InvalidReference(String),
}

impl Display for Eip155ChainReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// EIP-712 domain parameters (`name`, `version`) for a token deployment.
///
/// Needed by EIP-3009 `transferWithAuthorization` signature verification,
/// and surfaced in `PaymentRequirementsExtra` so clients can reconstruct
/// the signing domain.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TokenDeploymentEip712 {
    /// The token name as specified in the EIP-712 domain.
    pub name: String,
    /// The token version as specified in the EIP-712 domain.
    pub version: String,
}

/// The method used to transfer a deployed token.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "assetTransferMethod")]
pub enum AssetTransferMethod {
    /// EIP-712 domain parameters for EIP-3009 `transferWithAuthorization`.
    #[serde(rename = "eip3009")]
    Eip3009 {
        /// The token name as specified in the EIP-712 domain.
        name: String,
        /// The token version as specified in the EIP-712 domain.
        version: String,
    },
    /// Permit2 transfer method.
    #[serde(rename = "permit2")]
    Permit2,
}

impl<'de> Deserialize<'de> for AssetTransferMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Permit2Tagged {
                #[serde(rename = "assetTransferMethod")]
                _tag: Permit2Tag,
            },
            Eip3009Tagged {
                #[serde(rename = "assetTransferMethod")]
                _tag: Eip3009Tag,
                name: String,
                version: String,
            },
            Eip3009Implicit { name: String, version: String },
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum Permit2Tag {
            Permit2,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum Eip3009Tag {
            Eip3009,
        }

        let wire = Wire::deserialize(deserializer)
            .map_err(|e| serde::de::Error::custom(format!("invalid asset transfer method: {e}")))?;

        Ok(match wire {
            Wire::Permit2Tagged { .. } => Self::Permit2,
            Wire::Eip3009Tagged { name, version, .. } | Wire::Eip3009Implicit { name, version } => {
                Self::Eip3009 { name, version }
            }
        })
    }
}

/// Information about a token deployment on an EVM chain.
///
/// Contains everything needed to interact with a token contract: its
/// address, decimal places, and transfer method (including EIP-712 domain
/// parameters when signature-based transfer is used).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Eip155TokenDeployment {
    /// The chain this token is deployed on.
    pub chain_reference: Eip155ChainReference,
    /// The token contract address.
    pub address: Address,
    /// Number of decimal places for the token (e.g., 6 for USDC, 18 for most ERC-20s).
    pub decimals: u8,
    /// The method used to transfer this token.
    pub transfer_method: AssetTransferMethod,
}

impl Eip155TokenDeployment {
    /// Creates a token amount from a raw value already in the token's
    /// smallest unit (e.g., wei).
    pub fn amount<V: Into<u64>>(&self, v: V) -> DeployedTokenAmount<U256, Self> {
        DeployedTokenAmount {
            amount: U256::from(v.into()),
            token: self.clone(),
        }
    }

    /// Parses a human-readable amount string (e.g., `"10.50"`, `"$10.50"`)
    /// into token units, scaled by the token's decimal places.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be parsed, has more decimal
    /// places than the token supports, or is out of range.
    pub fn parse<V>(&self, v: V) -> Result<DeployedTokenAmount<U256, Self>, MoneyAmountParseError>
    where
        V: TryInto<MoneyAmount>,
        MoneyAmountParseError: From<<V as TryInto<MoneyAmount>>::Error>,
    {
        let money_amount = v.try_into()?;
        let atomic = money_amount.to_atomic(u32::from(self.decimals))?;
        let multiplier = U256::from(1);
        let value = U256::from(atomic).mul(multiplier);
        Ok(DeployedTokenAmount {
            amount: value,
            token: self.clone(),
        })
    }

    /// Returns the EIP-712 domain parameters for this deployment, if it uses
    /// signature-based (EIP-3009) transfer.
    #[must_use]
    pub fn eip712(&self) -> Option<TokenDeploymentEip712> {
        match &self.transfer_method {
            AssetTransferMethod::Eip3009 { name, version } => Some(TokenDeploymentEip712 {
                name: name.clone(),
                version: version.clone(),
            }),
            AssetTransferMethod::Permit2 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment(decimals: u8) -> Eip155TokenDeployment {
        Eip155TokenDeployment {
            chain_reference: Eip155ChainReference::new(1),
            address: Address::ZERO,
            decimals,
            transfer_method: AssetTransferMethod::Eip3009 {
                name: "TestToken".into(),
                version: "2".into(),
            },
        }
    }

    #[test]
    fn parses_whole_number() {
        let result = deployment(6).parse("100").unwrap();
        assert_eq!(result.amount, U256::from(100_000_000u64));
    }

    #[test]
    fn parses_with_decimals() {
        let result = deployment(6).parse("1.50").unwrap();
        assert_eq!(result.amount, U256::from(1_500_000u64));
    }

    #[test]
    fn rejects_excess_precision() {
        let err = deployment(2).parse("1.234").unwrap_err();
        assert!(matches!(err, MoneyAmountParseError::WrongPrecision { .. }));
    }

    #[test]
    fn chain_reference_roundtrips_through_chain_id() {
        let reference = Eip155ChainReference::new(8453);
        let chain_id: ChainId = reference.into();
        assert_eq!(chain_id.to_string(), "eip155:8453");
        assert_eq!(Eip155ChainReference::try_from(&chain_id).unwrap(), reference);
    }
}
