//! BIP-39 mnemonic generation and validation (English word list)

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Entropy sizes accepted by BIP-39
pub const VALID_BIT_SIZES: [usize; 5] = [128, 160, 192, 224, 256];

fn check_bit_size(bit_size: usize) -> Result<(), WalletError> {
    if VALID_BIT_SIZES.contains(&bit_size) {
        Ok(())
    } else {
        Err(WalletError::InvalidBitSize(bit_size))
    }
}

/// Generate a fresh mnemonic from `bit_size` bits of OS entropy
///
/// Returns the words joined by single spaces: 12 words for 128 bits up to
/// 24 words for 256 bits.
pub fn generate_mnemonic(bit_size: usize) -> Result<String, WalletError> {
    check_bit_size(bit_size)?;

    let mut entropy = Zeroizing::new(vec![0u8; bit_size / 8]);
    OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|e| WalletError::EntropyUnavailable(e.to_string()))?;

    let phrase = entropy_to_mnemonic(&entropy)?;
    log::debug!("Generated {}-word mnemonic", phrase.split(' ').count());
    Ok(phrase)
}

/// Map raw entropy to its mnemonic sentence
///
/// The checksum (first `bits/32` bits of SHA-256 over the entropy) is
/// appended before the bits are split into 11-bit word indices.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<String, WalletError> {
    check_bit_size(entropy.len() * 8)?;
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Check word membership, word count and checksum of a mnemonic sentence
pub fn validate_mnemonic(words: &str) -> Result<(), WalletError> {
    parse_mnemonic(words).map(|_| ())
}

pub(crate) fn parse_mnemonic(words: &str) -> Result<Mnemonic, WalletError> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_word_counts() {
        for (bits, words) in [(128, 12), (160, 15), (192, 18), (224, 21), (256, 24)] {
            let phrase = generate_mnemonic(bits).unwrap();
            assert_eq!(phrase.split(' ').count(), words);
            validate_mnemonic(&phrase).unwrap();
        }
    }

    #[test]
    fn test_rejects_bad_bit_size() {
        for bits in [0, 64, 127, 129, 136, 288] {
            assert_eq!(
                generate_mnemonic(bits),
                Err(WalletError::InvalidBitSize(bits))
            );
        }
    }

    #[test]
    fn test_zero_entropy_vector() {
        assert_eq!(entropy_to_mnemonic(&[0u8; 16]).unwrap(), ABANDON_ABOUT);
    }

    #[test]
    fn test_rejects_unknown_word() {
        let phrase = ABANDON_ABOUT.replace("about", "aboot");
        assert!(matches!(
            validate_mnemonic(&phrase),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_rejects_bad_checksum() {
        // "abandon" x12 has a wrong checksum word
        let phrase = vec!["abandon"; 12].join(" ");
        assert!(matches!(
            validate_mnemonic(&phrase),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }
}
