//! Known EVM network configurations and USDC/USDM token deployments.

use alloy_primitives::{Address, address};
use r402::networks::NetworkInfo;

use crate::chain::{AssetTransferMethod, Eip155ChainReference, Eip155TokenDeployment};

/// Base Mainnet chain ID.
pub const BASE_MAINNET: u64 = 8453;
/// Base Sepolia (testnet) chain ID.
pub const BASE_SEPOLIA: u64 = 84532;
/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: u64 = 137;
/// Polygon Amoy (testnet) chain ID.
pub const POLYGON_AMOY: u64 = 80002;
/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET: u64 = 43114;
/// Avalanche Fuji (testnet) chain ID.
pub const AVALANCHE_FUJI: u64 = 43113;
/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: u64 = 1;
/// Celo Mainnet chain ID.
pub const CELO_MAINNET: u64 = 42220;
/// Celo Sepolia (testnet) chain ID.
pub const CELO_SEPOLIA: u64 = 11_142_220;
/// `MegaETH` Mainnet (Frontier) chain ID.
pub const MEGAETH_MAINNET: u64 = 4326;
/// `MegaETH` Testnet v2 chain ID.
pub const MEGAETH_TESTNET: u64 = 6343;
/// Monad Mainnet chain ID.
pub const MONAD_MAINNET: u64 = 143;
/// Monad Testnet chain ID.
pub const MONAD_TESTNET: u64 = 10143;

/// USDC contract address on Base Mainnet.
pub const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
/// USDC contract address on Base Sepolia.
pub const USDC_BASE_SEPOLIA: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");
/// USDC contract address on Ethereum Mainnet.
pub const USDC_ETHEREUM: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// USDC contract address on Polygon Mainnet.
pub const USDC_POLYGON: Address = address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359");
/// USDC contract address on Polygon Amoy (Circle native).
pub const USDC_POLYGON_AMOY: Address = address!("41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582");
/// USDC contract address on Avalanche C-Chain.
pub const USDC_AVALANCHE: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");
/// USDC contract address on Avalanche Fuji.
pub const USDC_AVALANCHE_FUJI: Address = address!("5425890298aed601595a70AB815c96711a31Bc65");
/// USDC contract address on Celo.
pub const USDC_CELO: Address = address!("cebA9300f2b948710d2653dD7B07f33A8B32118C");
/// USDC contract address on Celo Sepolia (Circle native).
pub const USDC_CELO_SEPOLIA: Address = address!("01C5C0122039549AD1493B8220cABEdD739BC44E");
/// USDM contract address on `MegaETH` Mainnet (Frontier). `MegaETH` uses USDM
/// (`MegaUSD`) instead of Circle USDC.
pub const USDM_MEGAETH: Address = address!("FAfDdbb3FC7688494971a79cc65DCa3EF82079E7");
/// USDC contract address on Monad Mainnet (Circle native).
pub const USDC_MONAD: Address = address!("754704Bc059F8C67012fEd69BC8A327a5aafb603");
/// USDC contract address on Monad Testnet (Circle native).
pub const USDC_MONAD_TESTNET: Address = address!("534b2f3A21130d7a60830c2Df862319e593943A3");

/// Default EIP-712 domain name for USDC.
pub const DEFAULT_USDC_NAME: &str = "USD Coin";
/// Default EIP-712 domain version for USDC.
pub const DEFAULT_USDC_VERSION: &str = "2";
/// Default token decimals for USDC.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// CAIP-2 network info for all known EVM networks, for use with
/// [`r402::networks::NetworkRegistry`].
pub const EVM_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        name: "base",
        namespace: "eip155",
        reference: "8453",
    },
    NetworkInfo {
        name: "base-sepolia",
        namespace: "eip155",
        reference: "84532",
    },
    NetworkInfo {
        name: "ethereum",
        namespace: "eip155",
        reference: "1",
    },
    NetworkInfo {
        name: "polygon",
        namespace: "eip155",
        reference: "137",
    },
    NetworkInfo {
        name: "polygon-amoy",
        namespace: "eip155",
        reference: "80002",
    },
    NetworkInfo {
        name: "avalanche",
        namespace: "eip155",
        reference: "43114",
    },
    NetworkInfo {
        name: "avalanche-fuji",
        namespace: "eip155",
        reference: "43113",
    },
    NetworkInfo {
        name: "celo",
        namespace: "eip155",
        reference: "42220",
    },
    NetworkInfo {
        name: "celo-sepolia",
        namespace: "eip155",
        reference: "11142220",
    },
    NetworkInfo {
        name: "megaeth",
        namespace: "eip155",
        reference: "4326",
    },
    NetworkInfo {
        name: "megaeth-testnet",
        namespace: "eip155",
        reference: "6343",
    },
    NetworkInfo {
        name: "monad",
        namespace: "eip155",
        reference: "143",
    },
    NetworkInfo {
        name: "monad-testnet",
        namespace: "eip155",
        reference: "10143",
    },
];

/// Returns the deployments of the chain-native stablecoin (USDC, or USDM on
/// `MegaETH`) for every known EVM network.
#[must_use]
pub fn known_stablecoin_deployments() -> Vec<Eip155TokenDeployment> {
    vec![
        usdc_deployment(BASE_MAINNET, USDC_BASE, DEFAULT_USDC_NAME, DEFAULT_USDC_VERSION),
        usdc_deployment(
            BASE_SEPOLIA,
            USDC_BASE_SEPOLIA,
            // Base Sepolia USDC contract returns "USDC" from name(), not "USD Coin".
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            ETHEREUM_MAINNET,
            USDC_ETHEREUM,
            DEFAULT_USDC_NAME,
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            POLYGON_MAINNET,
            USDC_POLYGON,
            DEFAULT_USDC_NAME,
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            POLYGON_AMOY,
            USDC_POLYGON_AMOY,
            // Polygon Amoy uses newer FiatTokenV2_2 with name() = "USDC".
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            AVALANCHE_MAINNET,
            USDC_AVALANCHE,
            DEFAULT_USDC_NAME,
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            AVALANCHE_FUJI,
            USDC_AVALANCHE_FUJI,
            DEFAULT_USDC_NAME,
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            CELO_MAINNET,
            USDC_CELO,
            // Celo USDC contract name() = "USDC" (confirmed on-chain).
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            CELO_SEPOLIA,
            USDC_CELO_SEPOLIA,
            // Celo Sepolia uses Circle native USDC, name() = "USDC".
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
        Eip155TokenDeployment {
            chain_reference: Eip155ChainReference::new(MEGAETH_MAINNET),
            address: USDM_MEGAETH,
            decimals: 18,
            transfer_method: AssetTransferMethod::Eip3009 {
                name: "MegaUSD".to_owned(),
                version: "1".to_owned(),
            },
        },
        usdc_deployment(
            MONAD_MAINNET,
            USDC_MONAD,
            // Monad uses Circle native USDC (FiatTokenV2_2), name() = "USDC".
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
        usdc_deployment(
            MONAD_TESTNET,
            USDC_MONAD_TESTNET,
            // Monad testnet uses Circle native USDC, name() = "USDC".
            "USDC",
            DEFAULT_USDC_VERSION,
        ),
    ]
}

fn usdc_deployment(chain_id: u64, address: Address, name: &str, version: &str) -> Eip155TokenDeployment {
    Eip155TokenDeployment {
        chain_reference: Eip155ChainReference::new(chain_id),
        address,
        decimals: DEFAULT_TOKEN_DECIMALS,
        transfer_method: AssetTransferMethod::Eip3009 {
            name: name.to_owned(),
            version: version.to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_stablecoin_deployments_cover_every_network() {
        assert_eq!(known_stablecoin_deployments().len(), EVM_NETWORKS.len());
    }
}
