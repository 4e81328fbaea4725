//! Server-side price tag generation for the EIP-155 exact scheme.
//!
//! This module provides functionality for servers to create V1 and V2 price tags
//! that clients can use to generate payment authorizations.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use r402::chain::{ChainId, DeployedTokenAmount};
use r402::proto;
use r402::proto::{v1, v2};

use crate::chain::{ChecksummedAddress, Eip155TokenDeployment};
use crate::exact::types::PaymentRequirementsExtra;
use crate::exact::{ExactScheme, V1Eip155Exact, V2Eip155Exact};

impl V1Eip155Exact {
    /// Creates a V1 price tag for an EIP-155 token payment.
    ///
    /// V1 only supports EIP-3009; a [`crate::chain::AssetTransferMethod::Permit2`]
    /// deployment is rejected by the facilitator at verify time, so callers
    /// targeting V1 should deploy tokens with an EIP-3009 transfer method.
    ///
    /// # Panics
    ///
    /// Panics if the chain ID has no known network name.
    #[allow(clippy::panic)]
    pub fn price_tag(
        pay_to: Address,
        asset: DeployedTokenAmount<U256, Eip155TokenDeployment>,
    ) -> v1::PriceTag {
        let chain_id: ChainId = (&asset.token.chain_reference).into();
        let network = chain_id
            .as_network_name()
            .unwrap_or_else(|| panic!("Can not get network name for chain id {chain_id}"));
        let extra = PaymentRequirementsExtra::from_deployment(asset.token.eip712(), None);
        v1::PriceTag {
            scheme: ExactScheme.to_string(),
            pay_to: ChecksummedAddress(pay_to).to_string(),
            asset: ChecksummedAddress(asset.token.address).to_string(),
            network: network.to_string(),
            amount: asset.amount.to_string(),
            max_timeout_seconds: 300,
            extra,
            enricher: Some(Arc::new(eip155_extra_enricher)),
        }
    }
}

/// Enricher function for V1 EIP-155 price tags - fills in EIP-712 domain
/// parameters from the facilitator's advertised capabilities when missing.
pub fn eip155_extra_enricher(price_tag: &mut v1::PriceTag, capabilities: &proto::SupportedResponse) {
    if price_tag.extra.is_some() {
        return;
    }

    let extra = capabilities
        .kinds
        .iter()
        .find(|kind| {
            v1::X402Version1 == kind.x402_version
                && kind.scheme == ExactScheme.to_string()
                && kind.network == price_tag.network
        })
        .and_then(|kind| kind.extra.as_ref())
        .and_then(|extra| serde_json::from_value::<PaymentRequirementsExtra>(extra.clone()).ok());

    if let Some(extra) = extra {
        price_tag.extra = serde_json::to_value(extra).ok();
    }
}

impl V2Eip155Exact {
    /// Creates a V2 price tag for an EIP-155 token payment.
    pub fn price_tag(
        pay_to: Address,
        asset: DeployedTokenAmount<U256, Eip155TokenDeployment>,
    ) -> v2::PriceTag {
        let chain_id: ChainId = (&asset.token.chain_reference).into();
        let transfer_method = match &asset.token.transfer_method {
            crate::chain::AssetTransferMethod::Permit2 => {
                Some(crate::exact::types::AssetTransferMethod::Permit2)
            }
            crate::chain::AssetTransferMethod::Eip3009 { .. } => None,
        };
        let extra = PaymentRequirementsExtra::from_deployment(asset.token.eip712(), transfer_method);
        let requirements = v2::PaymentRequirements {
            scheme: ExactScheme.to_string(),
            pay_to: ChecksummedAddress(pay_to).to_string(),
            asset: ChecksummedAddress(asset.token.address).to_string(),
            network: chain_id,
            amount: asset.amount.to_string(),
            max_timeout_seconds: 300,
            extra,
        };
        v2::PriceTag {
            requirements,
            enricher: Some(Arc::new(eip155_extra_enricher_v2)),
        }
    }
}

/// Enricher function for V2 EIP-155 price tags - fills in EIP-712 domain
/// parameters from the facilitator's advertised capabilities when missing.
pub fn eip155_extra_enricher_v2(price_tag: &mut v2::PriceTag, capabilities: &proto::SupportedResponse) {
    if price_tag.requirements.extra.is_some() {
        return;
    }

    let extra = capabilities
        .kinds
        .iter()
        .find(|kind| {
            v2::X402Version2 == kind.x402_version
                && kind.scheme == ExactScheme.to_string()
                && kind.network == price_tag.requirements.network.to_string()
        })
        .and_then(|kind| kind.extra.as_ref())
        .and_then(|extra| serde_json::from_value::<PaymentRequirementsExtra>(extra.clone()).ok());

    if let Some(extra) = extra {
        price_tag.requirements.extra = serde_json::to_value(extra).ok();
    }
}
