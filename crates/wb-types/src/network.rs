use serde::{Deserialize, Serialize};

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// The network the provider is currently pointed at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

impl Network {
    /// Builds a network entry, resolving the display name from the
    /// well-known chain table (`"unknown"` otherwise).
    pub fn from_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            name: known_network_name(chain_id).unwrap_or("unknown").to_owned(),
        }
    }
}

pub fn known_network_name(chain_id: u64) -> Option<&'static str> {
    let name = match chain_id {
        MAINNET_CHAIN_ID => "mainnet",
        SEPOLIA_CHAIN_ID => "sepolia",
        17_000 => "holesky",
        10 => "optimism",
        56 => "bnb",
        137 => "matic",
        8_453 => "base",
        42_161 => "arbitrum",
        59_144 => "linea",
        _ => return None,
    };
    Some(name)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to register a network it does not know yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub display_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_endpoints: Vec<String>,
    pub explorer_endpoints: Vec<String>,
}

impl NetworkDescriptor {
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            display_name: "Sepolia".to_owned(),
            native_currency: NativeCurrency {
                name: "SepoliaETH".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            rpc_endpoints: vec!["https://rpc.sepolia.org".to_owned()],
            explorer_endpoints: vec!["https://sepolia.etherscan.io".to_owned()],
        }
    }
}

/// `0x`-prefixed lowercase hex, the chain id encoding wallets expect.
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
