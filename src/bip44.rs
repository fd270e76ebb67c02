//! BIP-44 wallet, account and address derivation
//!
//! Path layout: `m / purpose' / coin_type' / account' / change / address_index`.
//! The first three levels are hardened and produce an [`Account`]; change and
//! index are normal derivations done per address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::address::{encode_address, AddressType};
use crate::bip32::{ExtendedKey, HARDENED_KEY};
use crate::child::ChildWallet;
use crate::error::WalletError;
use crate::mnemonic::generate_mnemonic;
use crate::network::{Network, COIN_TYPE_BITCOIN_TESTNET};
use crate::seed::mnemonic_to_seed;
use crate::wif::encode_wif;

/// BIP-44 purpose
pub const PURPOSE: u32 = 44;

/// External (receiving) chain
pub const CHANGE_EXTERNAL: u32 = 0;
/// Internal (change) chain
pub const CHANGE_INTERNAL: u32 = 1;

/// Root handle: the mnemonic and the master extended private key
pub struct HDWallet {
    mnemonic: Zeroizing<String>,
    master: ExtendedKey,
    network: Network,
}

impl HDWallet {
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn master_key(&self) -> &ExtendedKey {
        &self.master
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Open the account subtree `m/purpose'/coin_type'/account'`
    pub fn account(&self, purpose: u32, coin_type: u32, account: u32) -> Result<Account, WalletError> {
        let path = [
            purpose | HARDENED_KEY,
            coin_type | HARDENED_KEY,
            account | HARDENED_KEY,
        ];
        let key = self.master.derive_path(&path)?;
        log::debug!(
            "Opened account m/{}'/{}'/{}' ({})",
            purpose,
            coin_type,
            account,
            hex::encode(key.fingerprint())
        );
        Ok(Account {
            key,
            network: self.network,
            path,
        })
    }
}

impl fmt::Debug for HDWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HDWallet")
            .field("master_fingerprint", &hex::encode(self.master.fingerprint()))
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

/// Create a wallet from `mnemonic`, or from a freshly generated one of
/// `bit_size` bits when `mnemonic` is absent or blank.
pub fn new_hd_wallet(
    bit_size: usize,
    mnemonic: Option<&str>,
    network: Network,
    passphrase: &str,
) -> Result<HDWallet, WalletError> {
    let mnemonic = match mnemonic.map(str::trim).filter(|m| !m.is_empty()) {
        Some(words) => Zeroizing::new(words.to_string()),
        None => {
            log::info!("No mnemonic supplied, generating {} bits of entropy", bit_size);
            Zeroizing::new(generate_mnemonic(bit_size)?)
        }
    };

    let seed = mnemonic_to_seed(&mnemonic, passphrase)?;
    let master = ExtendedKey::master_from_seed(seed.as_bytes(), network)?;

    Ok(HDWallet {
        mnemonic,
        master,
        network,
    })
}

/// Free-function form of [`HDWallet::account`]
pub fn account_for(
    wallet: &HDWallet,
    purpose: u32,
    coin_type: u32,
    account: u32,
) -> Result<Account, WalletError> {
    wallet.account(purpose, coin_type, account)
}

/// Free-function form of [`Account::derive_address`]
pub fn derive_address(
    account: &Account,
    change: u32,
    index: u32,
    address_type: AddressType,
) -> Result<ChildWallet, WalletError> {
    account.derive_address(change, index, address_type)
}

/// Extended private key at `m/purpose'/coin_type'/account'`
#[derive(Clone, Debug)]
pub struct Account {
    key: ExtendedKey,
    network: Network,
    path: [u32; 3],
}

impl Account {
    /// Derive the child at `change/index` and bundle its WIF, public key and address
    pub fn derive_address(
        &self,
        change: u32,
        index: u32,
        address_type: AddressType,
    ) -> Result<ChildWallet, WalletError> {
        if change != CHANGE_EXTERNAL && change != CHANGE_INTERNAL {
            return Err(WalletError::InvalidChange(change));
        }
        if index >= HARDENED_KEY {
            return Err(WalletError::InvalidIndex(index));
        }

        let child = self.key.derive_child(change)?.derive_child(index)?;
        let secret = child
            .private_key()
            .ok_or_else(|| WalletError::InvalidExtendedKey("account key is public-only".into()))?;

        let public_key = child.public_key();
        let address = encode_address(&public_key, address_type, self.network)?;
        let wif = encode_wif(secret, self.network);

        Ok(ChildWallet::new(wif, public_key, address))
    }

    pub fn extended_key(&self) -> &ExtendedKey {
        &self.key
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Account-level extended public key (xpub/tpub)
    pub fn xpub(&self) -> String {
        self.key.neuter().to_base58()
    }

    /// Account path in apostrophe notation, e.g. `m/44'/1'/0'`
    pub fn path(&self) -> String {
        let [purpose, coin_type, account] = self.path.map(|i| i & !HARDENED_KEY);
        format!("m/{}'/{}'/{}'", purpose, coin_type, account)
    }
}

/// How the account-level path is assembled from the configuration
///
/// `Bip44` is `m/44'/coin_type(network)'/account'`. `Legacy` reproduces the
/// layout earlier releases of this tool used, `m/44'/1'/coin_type(network)'`,
/// so addresses created by those releases can be recovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountLayout {
    #[default]
    Bip44,
    Legacy,
}

impl AccountLayout {
    /// `(purpose, coin_type, account)` arguments for [`account_for`]
    pub fn path_args(self, network: Network, account: u32) -> (u32, u32, u32) {
        match self {
            AccountLayout::Bip44 => (PURPOSE, network.coin_type(), account),
            AccountLayout::Legacy => (PURPOSE, COIN_TYPE_BITCOIN_TESTNET, network.coin_type()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountLayout::Bip44 => "bip44",
            AccountLayout::Legacy => "legacy",
        }
    }
}

impl fmt::Display for AccountLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bip44" => Ok(AccountLayout::Bip44),
            "legacy" => Ok(AccountLayout::Legacy),
            other => Err(format!("unknown account layout '{}' (bip44 or legacy)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generates_when_mnemonic_blank() {
        for blank in [None, Some(""), Some("   ")] {
            let wallet = new_hd_wallet(256, blank, Network::Regtest, "").unwrap();
            assert_eq!(wallet.mnemonic().split(' ').count(), 24);
        }
    }

    #[test]
    fn test_bit_size_only_checked_when_generating() {
        assert!(new_hd_wallet(100, Some(ABANDON_ABOUT), Network::Regtest, "").is_ok());
        assert_eq!(
            new_hd_wallet(100, None, Network::Regtest, "").err(),
            Some(WalletError::InvalidBitSize(100))
        );
    }

    #[test]
    fn test_account_depth_and_path() {
        let wallet = new_hd_wallet(128, Some(ABANDON_ABOUT), Network::Regtest, "").unwrap();
        let account = account_for(&wallet, PURPOSE, 1, 0).unwrap();
        assert_eq!(account.extended_key().depth(), 3);
        assert_eq!(account.extended_key().child_number(), HARDENED_KEY);
        assert_eq!(account.path(), "m/44'/1'/0'");
    }

    #[test]
    fn test_change_must_be_zero_or_one() {
        let wallet = new_hd_wallet(128, Some(ABANDON_ABOUT), Network::Regtest, "").unwrap();
        let account = wallet.account(PURPOSE, 1, 0).unwrap();
        assert_eq!(
            account.derive_address(2, 0, AddressType::Bech32).err(),
            Some(WalletError::InvalidChange(2))
        );
        assert_eq!(
            account
                .derive_address(0, HARDENED_KEY, AddressType::Bech32)
                .err(),
            Some(WalletError::InvalidIndex(HARDENED_KEY))
        );
    }

    #[test]
    fn test_layout_path_args() {
        assert_eq!(
            AccountLayout::Bip44.path_args(Network::Mainnet, 3),
            (44, 0, 3)
        );
        assert_eq!(
            AccountLayout::Bip44.path_args(Network::Regtest, 0),
            (44, 1, 0)
        );
        assert_eq!(
            AccountLayout::Legacy.path_args(Network::Mainnet, 7),
            (44, 1, 0)
        );
        assert_eq!(
            AccountLayout::Legacy.path_args(Network::Regtest, 7),
            (44, 1, 1)
        );
    }
}
