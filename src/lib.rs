//! Matcha: HD wallet bootstrap and block generation for a Bitcoin regtest node
//!
//! The wallet core turns entropy into a BIP-39 mnemonic, the mnemonic into a
//! BIP-32 key tree, and walks BIP-44 paths down to child keys encoded as
//! P2PKH, P2SH-P2WPKH or native SegWit addresses plus WIF private keys.
//! Around that core sit the pieces the `matcha` binary needs to drive a
//! local bitcoind: a TOML config file, a JSON-RPC client, a ZMQ subscriber
//! and the mining loop.
//!
//! # Architecture
//!
//! - **Wallet core** (`mnemonic`, `seed`, `bip32`, `bip44`, `address`, `wif`):
//!   pure and deterministic apart from mnemonic generation
//! - **Node collaborators** (`rpc`, `events`, `zmq`): behind the `NodeRpc`
//!   and `FrameSource` traits so the driver can be tested without a node
//! - **Driver**: bootstrap funding and the periodic mining/event loop
//!
//! # Example
//!
//! ```no_run
//! use matcha::{new_hd_wallet, AddressType, Network, PURPOSE};
//!
//! let wallet = new_hd_wallet(128, None, Network::Regtest, "")?;
//! let account = wallet.account(PURPOSE, Network::Regtest.coin_type(), 0)?;
//! let child = account.derive_address(0, 0, AddressType::Bech32)?;
//! println!("{} {}", child.address(), child.wif());
//! # Ok::<(), matcha::WalletError>(())
//! ```

// Public modules
pub mod address;
pub mod bip32;
pub mod bip44;
pub mod child;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod hash;
pub mod mnemonic;
pub mod network;
pub mod rpc;
pub mod seed;
pub mod wif;
pub mod zmq;

// Re-exports for convenience
pub use address::{decode_address, encode_address, Address, AddressType, DecodedAddress};
pub use bip32::{ExtendedKey, HARDENED_KEY};
pub use bip44::{
    account_for, derive_address, new_hd_wallet, Account, AccountLayout, HDWallet,
    CHANGE_EXTERNAL, CHANGE_INTERNAL, PURPOSE,
};
pub use child::ChildWallet;
pub use config::{Config, ConfigOverrides};
pub use driver::{bootstrap, print_summary, run, ManagedAddresses, INITIAL_BLOCKS};
pub use error::{NodeError, WalletError};
pub use events::{render_event, FrameSource, NodeEvent, RawMessage, Topic};
pub use mnemonic::{entropy_to_mnemonic, generate_mnemonic, validate_mnemonic};
pub use network::{Network, NetworkParams};
pub use rpc::{BitcoinRpcClient, NodeRpc};
pub use seed::{mnemonic_to_seed, Seed};
pub use wif::{decode_wif, encode_wif, DecodedWif};
pub use zmq::ZmqSubscriber;

// Common result type
pub type Result<T> = std::result::Result<T, WalletError>;
