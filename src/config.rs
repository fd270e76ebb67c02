//! Tool configuration
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults < TOML config file < command-line flags.
//!
//! The config file is also where the wallet mnemonic is persisted, so a
//! generated wallet is reused on the next run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::address::AddressType;
use crate::bip44::AccountLayout;
use crate::error::{NodeError, WalletError};
use crate::mnemonic::VALID_BIT_SIZES;
use crate::network::Network;

/// File name looked up in the home directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = ".matcha.toml";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// bitcoind RPC host
    pub host: String,
    /// bitcoind RPC port
    pub port: u16,
    pub user: String,
    pub password: String,
    pub network: Network,
    /// BIP-39 passphrase
    pub wallet_password: String,
    pub address_type: AddressType,
    /// Empty means "generate one"
    pub mnemonic: String,
    /// ZMQ publisher endpoint; empty disables the block/tx feed
    pub zmq_address: String,
    /// Entropy bits for a generated mnemonic
    pub bit_size: usize,
    /// Seconds between automatically mined blocks
    pub second: u64,
    /// Number of addresses to derive, import and fund
    pub address_count: u32,
    /// Print verbose block/tx JSON from the node
    pub verbose: bool,
    pub account_layout: AccountLayout,
    pub account: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 18443,
            user: "admin".to_string(),
            password: "password".to_string(),
            network: Network::Regtest,
            wallet_password: String::new(),
            address_type: AddressType::Bech32,
            mnemonic: String::new(),
            zmq_address: "tcp://localhost:28332".to_string(),
            bit_size: 128,
            second: 30,
            address_count: 10,
            verbose: true,
            account_layout: AccountLayout::Bip44,
            account: 0,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("network", &self.network)
            .field("address_type", &self.address_type)
            .field("mnemonic_set", &!self.mnemonic.is_empty())
            .field("zmq_address", &self.zmq_address)
            .field("bit_size", &self.bit_size)
            .field("second", &self.second)
            .field("address_count", &self.address_count)
            .field("verbose", &self.verbose)
            .field("account_layout", &self.account_layout)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Values given on the command line; `None` keeps the lower layer's value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub network: Option<Network>,
    pub wallet_password: Option<String>,
    pub address_type: Option<AddressType>,
    pub mnemonic: Option<String>,
    pub zmq_address: Option<String>,
    pub bit_size: Option<usize>,
    pub second: Option<u64>,
    pub address_count: Option<u32>,
    pub verbose: Option<bool>,
    pub account_layout: Option<AccountLayout>,
    pub account: Option<u32>,
}

impl Config {
    /// `$HOME/.matcha.toml`
    pub fn default_path() -> Result<PathBuf, NodeError> {
        let home = dirs::home_dir()
            .ok_or_else(|| NodeError::Config("could not find home directory".into()))?;
        Ok(home.join(DEFAULT_CONFIG_FILE))
    }

    /// Load the config file at `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| NodeError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Using config file: {}", path.display());
        Ok(config)
    }

    /// Write the config as TOML, owner-readable only on unix
    pub fn save(&self, path: &Path) -> Result<(), NodeError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        log::debug!("Wrote config file {}", path.display());
        Ok(())
    }

    /// Layer command-line values on top of this config
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = overrides.$field {
                    self.$field = value;
                })*
            };
        }
        take!(
            host,
            port,
            user,
            password,
            network,
            wallet_password,
            address_type,
            mnemonic,
            zmq_address,
            bit_size,
            second,
            address_count,
            verbose,
            account_layout,
            account,
        );
        self
    }

    /// Reject settings the wallet core or the driver cannot work with
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.mnemonic.trim().is_empty() && !VALID_BIT_SIZES.contains(&self.bit_size) {
            return Err(WalletError::InvalidBitSize(self.bit_size).into());
        }
        if self.address_count == 0 {
            return Err(NodeError::Config("address_count must be at least 1".into()));
        }
        if self.second == 0 {
            return Err(NodeError::Config("second must be at least 1".into()));
        }
        Ok(())
    }

    /// `http://host:port` for the JSON-RPC client
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
