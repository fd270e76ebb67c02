//! Address encodings for a compressed secp256k1 public key
//!
//! - `p2pkh`: Base58Check(version_pubkey || HASH160(P))
//! - `p2sh`: P2WPKH nested in P2SH, Base58Check(version_script || HASH160(OP_0 <HASH160(P)>))
//! - `bech32`: native segwit v0, bech32(hrp, 0, HASH160(P))

use bitcoin::bech32::{segwit, Hrp};
use bitcoin::secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;
use crate::hash::{base58check_decode, base58check_encode, hash160};
use crate::network::Network;

const OP_0: u8 = 0x00;
const PUSH_20: u8 = 0x14;

/// The closed set of address encodings the wallet can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[serde(alias = "p2kh")]
    P2pkh,
    P2sh,
    #[serde(alias = "p2wpkh")]
    Bech32,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::P2pkh => "p2pkh",
            AddressType::P2sh => "p2sh",
            AddressType::Bech32 => "bech32",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            // "p2kh" is the spelling older configs use
            "p2pkh" | "p2kh" => Ok(AddressType::P2pkh),
            "p2sh" => Ok(AddressType::P2sh),
            "bech32" | "p2wpkh" => Ok(AddressType::Bech32),
            other => Err(WalletError::InvalidAddressType(other.to_string())),
        }
    }
}

/// An encoded address tagged with how it was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    encoded: String,
    address_type: AddressType,
    network: Network,
}

impl Address {
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Result of parsing an address string back into its hash payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub address_type: AddressType,
    /// Public key hash for p2pkh/bech32, script hash for p2sh
    pub hash: [u8; 20],
}

/// `OP_0 <20-byte key hash>`, the P2WPKH witness program script
pub fn p2wpkh_script(pubkey_hash: &[u8; 20]) -> [u8; 22] {
    let mut script = [0u8; 22];
    script[0] = OP_0;
    script[1] = PUSH_20;
    script[2..].copy_from_slice(pubkey_hash);
    script
}

/// Encode a compressed public key as an address of the given type
pub fn encode_address(
    public_key: &[u8; 33],
    address_type: AddressType,
    network: Network,
) -> Result<Address, WalletError> {
    PublicKey::from_slice(public_key)
        .map_err(|e| WalletError::InvalidAddress(format!("bad public key: {}", e)))?;

    let params = network.params();
    let key_hash = hash160(public_key);

    let encoded = match address_type {
        AddressType::P2pkh => base58_with_version(params.pubkey_hash_version, &key_hash),
        AddressType::P2sh => {
            let script_hash = hash160(&p2wpkh_script(&key_hash));
            base58_with_version(params.script_hash_version, &script_hash)
        }
        AddressType::Bech32 => {
            let hrp = Hrp::parse(params.bech32_hrp)
                .map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
            segwit::encode_v0(hrp, &key_hash)
                .map_err(|e| WalletError::InvalidAddress(e.to_string()))?
        }
    };

    Ok(Address {
        encoded,
        address_type,
        network,
    })
}

fn base58_with_version(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    base58check_encode(&payload)
}

/// Parse an address produced for `network` back into its type and hash
pub fn decode_address(encoded: &str, network: Network) -> Result<DecodedAddress, WalletError> {
    let params = network.params();
    let bech32_prefix = format!("{}1", params.bech32_hrp);

    if encoded.to_lowercase().starts_with(&bech32_prefix) {
        let (hrp, version, program) =
            segwit::decode(encoded).map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
        if hrp.to_lowercase() != params.bech32_hrp {
            return Err(WalletError::InvalidAddress(format!(
                "prefix {} does not belong to {}",
                hrp, network
            )));
        }
        if version != segwit::VERSION_0 || program.len() != 20 {
            return Err(WalletError::InvalidAddress(
                "only v0 key-hash witness programs are supported".into(),
            ));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&program);
        return Ok(DecodedAddress {
            address_type: AddressType::Bech32,
            hash,
        });
    }

    let payload = base58check_decode(encoded).map_err(WalletError::InvalidAddress)?;
    if payload.len() != 21 {
        return Err(WalletError::InvalidAddress(format!(
            "expected 21-byte payload, got {}",
            payload.len()
        )));
    }
    let address_type = if payload[0] == params.pubkey_hash_version {
        AddressType::P2pkh
    } else if payload[0] == params.script_hash_version {
        AddressType::P2sh
    } else {
        return Err(WalletError::InvalidAddress(format!(
            "version byte {:#04x} does not belong to {}",
            payload[0], network
        )));
    };
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(DecodedAddress { address_type, hash })
}
