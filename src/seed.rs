//! BIP-39 seed stretching: PBKDF2-HMAC-SHA512 over the mnemonic

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::mnemonic::validate_mnemonic;

pub const SEED_LEN: usize = 64;
pub const PBKDF2_ROUNDS: u32 = 2048;

/// 64-byte BIP-39 seed, wiped on drop
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Derive the seed for `(mnemonic, passphrase)`
///
/// The mnemonic is checksum-validated first. Both the password (the mnemonic
/// sentence) and the salt (`"mnemonic" || passphrase`) are NFKD-normalized.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<Seed, WalletError> {
    validate_mnemonic(mnemonic)?;

    let password = Zeroizing::new(mnemonic.nfkd().collect::<String>());
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase).nfkd().collect::<String>());

    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut seed[..],
    );
    Ok(Seed(seed))
}
