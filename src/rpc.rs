/// Bitcoin Core RPC client wrapper
///
/// Only the handful of calls the tool needs: import keys, mine blocks and
/// fetch verbose block/transaction JSON for event output.

use bitcoincore_rpc::{Auth, Client, RpcApi};
use serde_json::{json, Value};

use crate::error::NodeError;

/// `maxtries` passed to `generatetoaddress`
pub const MAX_TRIES: u64 = 10;

/// The node operations the driver depends on
pub trait NodeRpc: Send + Sync {
    fn get_blockchain_info(&self) -> Result<Value, NodeError>;

    /// Import a WIF private key into the node wallet without rescanning
    fn import_privkey(&self, wif: &str) -> Result<(), NodeError>;

    /// Mine `n` blocks paying to `address`; returns the block hashes
    fn generate_to_address(
        &self,
        n: u64,
        address: &str,
        max_tries: u64,
    ) -> Result<Vec<String>, NodeError>;

    /// `getblock <hash> 1`
    fn get_block_verbose(&self, hash: &str) -> Result<Value, NodeError>;

    /// `getrawtransaction <txid> true`
    fn get_rawtx_verbose(&self, txid: &str) -> Result<Value, NodeError>;
}

pub struct BitcoinRpcClient {
    client: Client,
}

impl BitcoinRpcClient {
    /// Connect to bitcoind and probe the connection with `getblockchaininfo`
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self, NodeError> {
        let auth = Auth::UserPass(username.to_string(), password.to_string());
        let client = Client::new(url, auth)?;

        // Test connection
        let info: Value = client
            .call("getblockchaininfo", &[])
            .map_err(|e| NodeError::Rpc(format!("failed to connect to {}: {}", url, e)))?;

        log::info!(
            "Connected to bitcoind at {} (chain: {}, blocks: {})",
            url,
            info["chain"].as_str().unwrap_or("unknown"),
            info["blocks"]
        );

        Ok(Self { client })
    }
}

impl NodeRpc for BitcoinRpcClient {
    fn get_blockchain_info(&self) -> Result<Value, NodeError> {
        Ok(self.client.call("getblockchaininfo", &[])?)
    }

    fn import_privkey(&self, wif: &str) -> Result<(), NodeError> {
        let _: Value = self
            .client
            .call("importprivkey", &[json!(wif), json!(""), json!(false)])?;
        Ok(())
    }

    fn generate_to_address(
        &self,
        n: u64,
        address: &str,
        max_tries: u64,
    ) -> Result<Vec<String>, NodeError> {
        let hashes: Vec<String> = self.client.call(
            "generatetoaddress",
            &[json!(n), json!(address), json!(max_tries)],
        )?;
        log::debug!("Mined {} block(s) to {}", hashes.len(), address);
        Ok(hashes)
    }

    fn get_block_verbose(&self, hash: &str) -> Result<Value, NodeError> {
        Ok(self.client.call("getblock", &[json!(hash), json!(1)])?)
    }

    fn get_rawtx_verbose(&self, txid: &str) -> Result<Value, NodeError> {
        Ok(self
            .client
            .call("getrawtransaction", &[json!(txid), json!(true)])?)
    }
}
