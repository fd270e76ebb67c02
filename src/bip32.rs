//! BIP-32 hierarchical deterministic key tree
//!
//! `ExtendedKey` is a pure value: deriving a child never mutates the parent,
//! so one key can be shared across threads and derived from concurrently.
//! Private key bytes and chain codes live in `Zeroizing` buffers.
//!
//! Invalid children (`I_L >= n` or a zero child key) are surfaced as
//! `WalletError::DeriveSkip` instead of silently moving to the next index.

use bitcoin::secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::hash::{base58check_decode, base58check_encode, hash160, hmac_sha512};
use crate::network::Network;

/// Offset added to an index to request a hardened child (2^31)
pub const HARDENED_KEY: u32 = 0x8000_0000;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const SERIALIZED_LEN: usize = 78;

pub fn is_hardened(index: u32) -> bool {
    index >= HARDENED_KEY
}

#[derive(Clone)]
enum KeyMaterial {
    Private {
        secret: Zeroizing<[u8; 32]>,
        public: [u8; 33],
    },
    /// SEC1 compressed point
    Public([u8; 33]),
}

impl KeyMaterial {
    fn private(secp: &Secp256k1<All>, secret: &SecretKey) -> Self {
        KeyMaterial::Private {
            secret: Zeroizing::new(secret.secret_bytes()),
            public: PublicKey::from_secret_key(secp, secret).serialize(),
        }
    }
}

/// A node in the BIP-32 tree
#[derive(Clone)]
pub struct ExtendedKey {
    key: KeyMaterial,
    chain_code: Zeroizing<[u8; 32]>,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    network: Network,
}

impl ExtendedKey {
    /// Build the master extended private key from a BIP-39 seed
    ///
    /// `I = HMAC-SHA512("Bitcoin seed", seed)`; the left half is the master
    /// secret and the right half the master chain code.
    pub fn master_from_seed(seed: &[u8], network: Network) -> Result<Self, WalletError> {
        let i = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, &[seed]));

        // from_slice rejects zero and values >= n
        let secret = SecretKey::from_slice(&i[..32]).map_err(|_| WalletError::InvalidSeed)?;

        let master = Self {
            key: KeyMaterial::private(&Secp256k1::new(), &secret),
            chain_code: split_chain_code(&i),
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            network,
        };
        log::debug!(
            "Created master key {} on {}",
            hex::encode(master.fingerprint()),
            network
        );
        Ok(master)
    }

    /// Derive the child at `index` (hardened when `index >= 2^31`)
    pub fn derive_child(&self, index: u32) -> Result<Self, WalletError> {
        let secp = Secp256k1::new();
        let index_bytes = index.to_be_bytes();
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            WalletError::InvalidExtendedKey(format!("cannot derive below depth {}", u8::MAX))
        })?;

        match &self.key {
            KeyMaterial::Private { secret, public } => {
                let parent = SecretKey::from_slice(&secret[..])
                    .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?;

                let i = Zeroizing::new(if is_hardened(index) {
                    hmac_sha512(
                        &self.chain_code[..],
                        &[&[0u8][..], &secret[..], &index_bytes[..]],
                    )
                } else {
                    hmac_sha512(&self.chain_code[..], &[&public[..], &index_bytes[..]])
                });

                let tweak = tweak_scalar(&i, index)?;
                let child = parent
                    .add_tweak(&tweak)
                    .map_err(|_| WalletError::DeriveSkip(index))?;

                Ok(Self {
                    key: KeyMaterial::private(&secp, &child),
                    chain_code: split_chain_code(&i),
                    depth,
                    parent_fingerprint: fingerprint_of(public),
                    child_number: index,
                    network: self.network,
                })
            }
            KeyMaterial::Public(public) => {
                if is_hardened(index) {
                    return Err(WalletError::CannotHardenPublic(index));
                }
                let parent = PublicKey::from_slice(public)
                    .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?;

                let i = Zeroizing::new(hmac_sha512(
                    &self.chain_code[..],
                    &[&public[..], &index_bytes[..]],
                ));
                let tweak = tweak_scalar(&i, index)?;
                let child = parent
                    .add_exp_tweak(&secp, &tweak)
                    .map_err(|_| WalletError::DeriveSkip(index))?;

                Ok(Self {
                    key: KeyMaterial::Public(child.serialize()),
                    chain_code: split_chain_code(&i),
                    depth,
                    parent_fingerprint: fingerprint_of(public),
                    child_number: index,
                    network: self.network,
                })
            }
        }
    }

    /// Apply `derive_child` for each index in order
    pub fn derive_path(&self, path: &[u32]) -> Result<Self, WalletError> {
        let mut key = self.clone();
        for &index in path {
            key = key.derive_child(index)?;
        }
        Ok(key)
    }

    /// The public-only counterpart of this key
    pub fn neuter(&self) -> Self {
        Self {
            key: KeyMaterial::Public(self.public_key()),
            chain_code: self.chain_code.clone(),
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            network: self.network,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private { .. })
    }

    /// Raw 32-byte secret, `None` for public-only keys
    pub fn private_key(&self) -> Option<&[u8; 32]> {
        match &self.key {
            KeyMaterial::Private { secret, .. } => Some(&**secret),
            KeyMaterial::Public(_) => None,
        }
    }

    /// Compressed (33-byte, 0x02/0x03 prefixed) public key
    pub fn public_key(&self) -> [u8; 33] {
        match &self.key {
            KeyMaterial::Private { public, .. } | KeyMaterial::Public(public) => *public,
        }
    }

    /// First four bytes of HASH160 of this key's public key
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key())
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Serialize to the 78-byte BIP-32 format and Base58Check it
    /// (`xprv`/`xpub` on mainnet, `tprv`/`tpub` on testnet and regtest).
    pub fn to_base58(&self) -> String {
        let params = self.network.params();
        let mut payload = Zeroizing::new(Vec::with_capacity(SERIALIZED_LEN));
        match &self.key {
            KeyMaterial::Private { secret, .. } => {
                payload.extend_from_slice(&params.xprv_version);
                self.push_header(&mut payload);
                payload.push(0u8);
                payload.extend_from_slice(&secret[..]);
            }
            KeyMaterial::Public(public) => {
                payload.extend_from_slice(&params.xpub_version);
                self.push_header(&mut payload);
                payload.extend_from_slice(public);
            }
        }
        base58check_encode(&payload)
    }

    fn push_header(&self, payload: &mut Vec<u8>) {
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child_number.to_be_bytes());
        payload.extend_from_slice(&self.chain_code[..]);
    }

    /// Parse a Base58Check extended key
    ///
    /// Testnet and regtest share version words, so both decode as testnet.
    pub fn from_base58(encoded: &str) -> Result<Self, WalletError> {
        let data = Zeroizing::new(
            base58check_decode(encoded).map_err(WalletError::InvalidExtendedKey)?,
        );
        if data.len() != SERIALIZED_LEN {
            return Err(WalletError::InvalidExtendedKey(format!(
                "expected {} bytes, got {}",
                SERIALIZED_LEN,
                data.len()
            )));
        }

        let version = &data[0..4];
        let (network, private) = Network::ALL
            .into_iter()
            .find_map(|n| {
                let params = n.params();
                if version == params.xprv_version {
                    Some((n, true))
                } else if version == params.xpub_version {
                    Some((n, false))
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                WalletError::InvalidExtendedKey(format!("unknown version {}", hex::encode(version)))
            })?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut child_bytes = [0u8; 4];
        child_bytes.copy_from_slice(&data[9..13]);
        let child_number = u32::from_be_bytes(child_bytes);
        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_number != 0) {
            return Err(WalletError::InvalidExtendedKey(
                "master key with non-zero parent fingerprint or index".into(),
            ));
        }

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&data[13..45]);

        let key = if private {
            if data[45] != 0 {
                return Err(WalletError::InvalidExtendedKey(
                    "private key data must start with 0x00".into(),
                ));
            }
            let secret = SecretKey::from_slice(&data[46..78])
                .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?;
            KeyMaterial::private(&Secp256k1::new(), &secret)
        } else {
            let public = PublicKey::from_slice(&data[45..78])
                .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?;
            KeyMaterial::Public(public.serialize())
        };

        Ok(Self {
            key,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
            network,
        })
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("private", &self.is_private())
            .field("public_key", &hex::encode(self.public_key()))
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .field("network", &self.network)
            .finish()
    }
}

fn fingerprint_of(public_key: &[u8; 33]) -> [u8; 4] {
    let id = hash160(public_key);
    [id[0], id[1], id[2], id[3]]
}

fn split_chain_code(i: &[u8; 64]) -> Zeroizing<[u8; 32]> {
    let mut chain_code = Zeroizing::new([0u8; 32]);
    chain_code.copy_from_slice(&i[32..]);
    chain_code
}

/// Parse `I_L` as a scalar; `I_L >= n` means this index must be skipped
fn tweak_scalar(i: &[u8; 64], index: u32) -> Result<Scalar, WalletError> {
    let mut il = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&i[..32]);
    Scalar::from_be_bytes(*il).map_err(|_| WalletError::DeriveSkip(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1
    const TV1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn tv1_master() -> ExtendedKey {
        let seed = hex::decode(TV1_SEED).unwrap();
        ExtendedKey::master_from_seed(&seed, Network::Mainnet).unwrap()
    }

    #[test]
    fn test_vector1_master() {
        let master = tv1_master();
        assert_eq!(
            master.to_base58(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            master.neuter().to_base58(),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
        assert_eq!(master.depth(), 0);
        assert_eq!(master.parent_fingerprint(), [0u8; 4]);
    }

    #[test]
    fn test_vector1_hardened_child() {
        let child = tv1_master().derive_child(HARDENED_KEY).unwrap();
        assert_eq!(
            child.to_base58(),
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
        assert_eq!(child.depth(), 1);
        assert_eq!(child.parent_fingerprint(), tv1_master().fingerprint());
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let account = tv1_master().derive_child(HARDENED_KEY).unwrap();
        let via_private = account.derive_path(&[1, 7]).unwrap();
        let via_public = account.neuter().derive_path(&[1, 7]).unwrap();
        assert_eq!(via_private.public_key(), via_public.public_key());
        assert_eq!(via_private.chain_code(), via_public.chain_code());
        assert_eq!(via_private.neuter().to_base58(), via_public.to_base58());
    }

    #[test]
    fn test_hardening_boundary_on_public_parent() {
        let public = tv1_master().neuter();
        assert!(public.derive_child(HARDENED_KEY - 1).is_ok());
        assert_eq!(
            public.derive_child(HARDENED_KEY).err(),
            Some(WalletError::CannotHardenPublic(HARDENED_KEY))
        );
        assert_eq!(
            public.derive_child(u32::MAX).err(),
            Some(WalletError::CannotHardenPublic(u32::MAX))
        );
    }

    #[test]
    fn test_base58_round_trip() {
        let key = tv1_master().derive_path(&[HARDENED_KEY, 1]).unwrap();
        for encoded in [key.to_base58(), key.neuter().to_base58()] {
            let decoded = ExtendedKey::from_base58(&encoded).unwrap();
            assert_eq!(decoded.to_base58(), encoded);
        }
    }

    #[test]
    fn test_from_base58_rejects_garbage() {
        assert!(matches!(
            ExtendedKey::from_base58("xprv123"),
            Err(WalletError::InvalidExtendedKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let master = tv1_master();
        let secret = hex::encode(master.private_key().unwrap());
        let debug = format!("{:?}", master);
        assert!(!debug.contains(&secret));
    }

    #[test]
    fn test_tweak_out_of_range_is_skipped() {
        assert_eq!(
            tweak_scalar(&[0xff; 64], 5).err(),
            Some(WalletError::DeriveSkip(5))
        );

        // I_L equal to the curve order is out of range, one below it is not
        let order =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
        let mut i = [0u8; 64];
        i[..32].copy_from_slice(&order);
        assert_eq!(
            tweak_scalar(&i, HARDENED_KEY).err(),
            Some(WalletError::DeriveSkip(HARDENED_KEY))
        );

        i[31] -= 1;
        assert!(tweak_scalar(&i, 0).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let mut key = tv1_master();
        key.depth = u8::MAX - 1;
        let deepest = key.derive_child(0).unwrap();
        assert_eq!(deepest.depth(), u8::MAX);

        assert!(matches!(
            deepest.derive_child(0),
            Err(WalletError::InvalidExtendedKey(_))
        ));
        assert!(matches!(
            deepest.neuter().derive_child(0),
            Err(WalletError::InvalidExtendedKey(_))
        ));
    }
}
