//! Bitcoin network tags and the handful of chain parameters the wallet needs
//!
//! Only address/WIF version bytes, the bech32 prefix and the BIP-32
//! serialization version words are carried; nothing else about a chain
//! matters to key derivation.

use crate::error::WalletError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// BIP-44 coin type for Bitcoin mainnet
pub const COIN_TYPE_BITCOIN: u32 = 0;
/// BIP-44 coin type shared by every test network
pub const COIN_TYPE_BITCOIN_TESTNET: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
    Simnet,
}

/// Consensus parameters consumed by the address and WIF encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub pubkey_hash_version: u8,
    pub script_hash_version: u8,
    pub bech32_hrp: &'static str,
    pub wif_version: u8,
    /// BIP-32 version word for serialized private extended keys
    pub xprv_version: [u8; 4],
    /// BIP-32 version word for serialized public extended keys
    pub xpub_version: [u8; 4],
}

const MAINNET_PARAMS: NetworkParams = NetworkParams {
    pubkey_hash_version: 0x00,
    script_hash_version: 0x05,
    bech32_hrp: "bc",
    wif_version: 0x80,
    xprv_version: [0x04, 0x88, 0xAD, 0xE4],
    xpub_version: [0x04, 0x88, 0xB2, 0x1E],
};

const TESTNET_PARAMS: NetworkParams = NetworkParams {
    pubkey_hash_version: 0x6F,
    script_hash_version: 0xC4,
    bech32_hrp: "tb",
    wif_version: 0xEF,
    xprv_version: [0x04, 0x35, 0x83, 0x94],
    xpub_version: [0x04, 0x35, 0x87, 0xCF],
};

const REGTEST_PARAMS: NetworkParams = NetworkParams {
    bech32_hrp: "bcrt",
    ..TESTNET_PARAMS
};

const SIMNET_PARAMS: NetworkParams = NetworkParams {
    pubkey_hash_version: 0x3F,
    script_hash_version: 0x7B,
    bech32_hrp: "sb",
    wif_version: 0x64,
    xprv_version: [0x04, 0x20, 0xB9, 0x00],
    xpub_version: [0x04, 0x20, 0xBD, 0x3A],
};

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Mainnet,
        Network::Testnet,
        Network::Regtest,
        Network::Simnet,
    ];

    pub fn params(self) -> &'static NetworkParams {
        match self {
            Network::Mainnet => &MAINNET_PARAMS,
            Network::Testnet => &TESTNET_PARAMS,
            Network::Regtest => &REGTEST_PARAMS,
            Network::Simnet => &SIMNET_PARAMS,
        }
    }

    /// Get the BIP44 coin type for this network
    ///
    /// - Mainnet: 0
    /// - Testnet/Regtest/Simnet: 1
    pub fn coin_type(self) -> u32 {
        match self {
            Network::Mainnet => COIN_TYPE_BITCOIN,
            _ => COIN_TYPE_BITCOIN_TESTNET,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            "simnet" => Ok(Network::Simnet),
            other => Err(WalletError::InvalidNetwork(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_type() {
        assert_eq!(Network::Mainnet.coin_type(), 0);
        assert_eq!(Network::Testnet.coin_type(), 1);
        assert_eq!(Network::Regtest.coin_type(), 1);
        assert_eq!(Network::Simnet.coin_type(), 1);
    }

    #[test]
    fn test_parse_network() {
        assert_eq!("regtest".parse::<Network>().unwrap(), Network::Regtest);
        assert_eq!("MainNet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!(matches!(
            "signet".parse::<Network>(),
            Err(WalletError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_regtest_shares_testnet_versions() {
        let testnet = Network::Testnet.params();
        let regtest = Network::Regtest.params();
        assert_eq!(testnet.pubkey_hash_version, regtest.pubkey_hash_version);
        assert_eq!(testnet.script_hash_version, regtest.script_hash_version);
        assert_eq!(testnet.wif_version, regtest.wif_version);
        assert_eq!(regtest.bech32_hrp, "bcrt");
    }
}
