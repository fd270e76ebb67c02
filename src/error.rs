//! Error types for wallet derivation and node collaborators
//!
//! `WalletError` is the taxonomy of the pure derivation core. `NodeError`
//! covers everything that talks to the outside world (RPC, ZMQ, config file).

use thiserror::Error;

/// Core error type for mnemonic, seed, key tree and address operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Entropy bit size is not one of 128, 160, 192, 224, 256
    #[error("Invalid bit size: {0} (must be in [128, 256] and a multiple of 32)")]
    InvalidBitSize(usize),

    /// The OS random source could not be read
    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// Bad checksum, unknown word or bad word count
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Master key material is zero or not below the curve order
    #[error("Invalid seed: master key is out of range")]
    InvalidSeed,

    /// Hardened child requested from a public-only extended key
    #[error("Cannot derive hardened child {0:#010x} from a public key")]
    CannotHardenPublic(u32),

    /// Derived key is invalid; BIP-32 says to continue with the next index
    #[error("Child {0} yields an invalid key, retry with the next index")]
    DeriveSkip(u32),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// BIP-44 change must be 0 (external) or 1 (internal)
    #[error("Invalid change type: {0} (must be 0 or 1)")]
    InvalidChange(u32),

    /// Address index must be below 2^31 (non-hardened)
    #[error("Invalid address index: {0}")]
    InvalidIndex(u32),

    #[error("Invalid address type: {0} (expected bech32, p2pkh or p2sh)")]
    InvalidAddressType(String),

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("Invalid WIF: {0}")]
    InvalidWif(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors raised by the node-facing collaborators
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    /// ZMQ message without exactly three frames
    #[error("Malformed notification: {0}")]
    MalformedMessage(String),

    /// Raw block or transaction bytes failed consensus decoding
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

impl From<bitcoincore_rpc::Error> for NodeError {
    fn from(err: bitcoincore_rpc::Error) -> Self {
        NodeError::Rpc(err.to_string())
    }
}

impl From<zeromq::ZmqError> for NodeError {
    fn from(err: zeromq::ZmqError) -> Self {
        NodeError::Subscription(err.to_string())
    }
}
