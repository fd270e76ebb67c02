use serde::Serialize;
use std::fmt;
use zeroize::Zeroizing;

use crate::address::{Address, AddressType};
use crate::network::Network;

/// A derived child key, ready for `importprivkey` and `generatetoaddress`
#[derive(Clone, Serialize)]
pub struct ChildWallet {
    #[serde(skip)]
    wif: Zeroizing<String>,
    #[serde(with = "hex_pubkey")]
    public_key: [u8; 33],
    address: Address,
}

impl ChildWallet {
    pub(crate) fn new(wif: String, public_key: [u8; 33], address: Address) -> Self {
        Self {
            wif: Zeroizing::new(wif),
            public_key,
            address,
        }
    }

    /// Private key in Wallet Import Format (compressed)
    pub fn wif(&self) -> &str {
        &self.wif
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn address_type(&self) -> AddressType {
        self.address.address_type()
    }

    pub fn network(&self) -> Network {
        self.address.network()
    }
}

impl fmt::Debug for ChildWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildWallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

mod hex_pubkey {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(key: &[u8; 33], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key))
    }
}
