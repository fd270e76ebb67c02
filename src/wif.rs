//! Wallet Import Format for private keys

use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::hash::{base58check_decode, base58check_encode};
use crate::network::Network;

/// Suffix marking the key as belonging to a compressed public key
const COMPRESSED_FLAG: u8 = 0x01;

/// A decoded WIF string
pub struct DecodedWif {
    pub secret: Zeroizing<[u8; 32]>,
    pub network: Network,
    pub compressed: bool,
}

/// Encode `secret` as WIF; the compression flag is always set
pub fn encode_wif(secret: &[u8; 32], network: Network) -> String {
    let mut payload = Zeroizing::new(Vec::with_capacity(34));
    payload.push(network.params().wif_version);
    payload.extend_from_slice(secret);
    payload.push(COMPRESSED_FLAG);
    base58check_encode(&payload)
}

/// Decode a WIF string for `network`, recovering the key and compression flag
///
/// The version byte must be the one `network` uses. Testnet and regtest share
/// a byte, so either network accepts the other's keys.
pub fn decode_wif(wif: &str, network: Network) -> Result<DecodedWif, WalletError> {
    let payload = Zeroizing::new(base58check_decode(wif).map_err(WalletError::InvalidWif)?);

    let compressed = match payload.len() {
        33 => false,
        34 if payload[33] == COMPRESSED_FLAG => true,
        34 => {
            return Err(WalletError::InvalidWif(format!(
                "unexpected compression flag {:#04x}",
                payload[33]
            )))
        }
        len => return Err(WalletError::InvalidWif(format!("bad payload length {}", len))),
    };

    if payload[0] != network.params().wif_version {
        return Err(WalletError::InvalidWif(format!(
            "version byte {:#04x} does not belong to {}",
            payload[0], network
        )));
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&payload[1..33]);

    Ok(DecodedWif {
        secret,
        network,
        compressed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_one_mainnet() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        assert_eq!(
            encode_wif(&secret, Network::Mainnet),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
    }

    #[test]
    fn test_round_trip() {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(
            &hex::decode("0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d").unwrap(),
        );
        for network in Network::ALL {
            let decoded = decode_wif(&encode_wif(&secret, network), network).unwrap();
            assert_eq!(*decoded.secret, secret);
            assert_eq!(decoded.network, network);
            assert!(decoded.compressed);
        }
    }

    #[test]
    fn test_decodes_uncompressed() {
        let decoded =
            decode_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ", Network::Mainnet)
                .unwrap();
        assert!(!decoded.compressed);
        assert_eq!(decoded.network, Network::Mainnet);
        assert_eq!(
            hex::encode(*decoded.secret),
            "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d"
        );
    }

    #[test]
    fn test_rejects_corrupted() {
        assert!(matches!(
            decode_wif(
                "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWo",
                Network::Mainnet
            ),
            Err(WalletError::InvalidWif(_))
        ));
    }

    #[test]
    fn test_regtest_round_trip() {
        let secret = [7u8; 32];
        let wif = encode_wif(&secret, Network::Regtest);
        assert!(wif.starts_with('c'));

        let decoded = decode_wif(&wif, Network::Regtest).unwrap();
        assert_eq!(decoded.network, Network::Regtest);
        assert_eq!(*decoded.secret, secret);
        assert!(decoded.compressed);
    }

    #[test]
    fn test_rejects_other_network() {
        let wif = encode_wif(&[7u8; 32], Network::Mainnet);
        assert!(matches!(
            decode_wif(&wif, Network::Regtest),
            Err(WalletError::InvalidWif(_))
        ));
        assert!(decode_wif(&wif, Network::Simnet).is_err());
    }
}
