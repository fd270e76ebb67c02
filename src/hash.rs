//! Hash and checksum-encoding helpers shared by the key tree and encoders

use bitcoin::base58;
use bitcoin::hashes::{hash160, sha256d, sha512, Hash, HashEngine, Hmac, HmacEngine};

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).to_byte_array()
}

/// HMAC-SHA512 over the concatenation of `parts`
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(key);
    for part in parts {
        engine.input(part);
    }
    Hmac::<sha512::Hash>::from_engine(engine).to_byte_array()
}

/// Base58 encode `payload` with a 4-byte double-SHA256 checksum appended
pub fn base58check_encode(payload: &[u8]) -> String {
    base58::encode_check(payload)
}

/// Decode a Base58Check string, verifying and stripping the checksum
pub fn base58check_decode(encoded: &str) -> Result<Vec<u8>, String> {
    base58::decode_check(encoded).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash160_empty() {
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    #[test]
    fn test_base58check_checksum() {
        let payload = [0x00u8; 21];
        let encoded = base58check_encode(&payload);
        assert_eq!(encoded, "1111111111111111111114oLvT2");

        let mut raw = bitcoin::base58::decode(&encoded).unwrap();
        let checksum = double_sha256(&payload);
        assert_eq!(&raw[21..], &checksum[..4]);

        raw[21] ^= 0x01;
        let tampered = bitcoin::base58::encode(&raw);
        assert!(base58check_decode(&tampered).is_err());
    }

    #[test]
    fn test_hmac_parts_concatenate() {
        let whole = hmac_sha512(b"key", &[&b"hello world"[..]]);
        let split = hmac_sha512(b"key", &[&b"hello"[..], &b" "[..], &b"world"[..]]);
        assert_eq!(whole, split);
    }
}
