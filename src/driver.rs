//! Regtest driver: fund the wallet, then keep the chain moving
//!
//! [`bootstrap`] derives the external addresses of an account, imports each
//! key into the node and mines a batch of blocks to it. [`run`] then mines one
//! block to a random managed address every interval while printing the
//! blocks and transactions the node announces over ZMQ.

use rand::seq::SliceRandom;
use std::io::Write;
use std::time::Duration;
use tokio::time::{interval_at, Instant};

use crate::address::AddressType;
use crate::bip44::{Account, HDWallet, CHANGE_EXTERNAL};
use crate::child::ChildWallet;
use crate::error::NodeError;
use crate::events::{render_event, FrameSource, NodeEvent, RawMessage, SEPARATOR};
use crate::rpc::{NodeRpc, MAX_TRIES};

/// Blocks mined to each address during bootstrap
pub const INITIAL_BLOCKS: u64 = 10;

/// The funded child wallets the mining loop pays to
#[derive(Debug, Clone, Default)]
pub struct ManagedAddresses {
    children: Vec<ChildWallet>,
}

impl ManagedAddresses {
    pub fn children(&self) -> &[ChildWallet] {
        &self.children
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.address().as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn pick_random(&self) -> Option<&ChildWallet> {
        self.children.choose(&mut rand::thread_rng())
    }
}

/// Derive `count` external addresses, import and fund each one
///
/// Writes the "Available Accounts" listing as it goes, then the matching
/// "Private Keys" listing.
pub fn bootstrap<W: Write>(
    account: &Account,
    rpc: &dyn NodeRpc,
    count: u32,
    address_type: AddressType,
    blocks_per_address: u64,
    out: &mut W,
) -> Result<ManagedAddresses, NodeError> {
    writeln!(out, "Available Accounts\n{}", SEPARATOR)?;

    let mut children = Vec::with_capacity(count as usize);
    for i in 0..count {
        let child = account.derive_address(CHANGE_EXTERNAL, i, address_type)?;
        rpc.import_privkey(child.wif())?;
        rpc.generate_to_address(blocks_per_address, child.address().as_str(), MAX_TRIES)?;
        writeln!(out, "({}) {}", i, child.address())?;
        children.push(child);
    }
    log::info!(
        "Funded {} {} address(es) with {} block(s) each",
        children.len(),
        address_type,
        blocks_per_address
    );

    writeln!(out, "Private Keys\n{}", SEPARATOR)?;
    for (n, child) in children.iter().enumerate() {
        writeln!(out, "({}) {}", n, child.wif())?;
    }

    Ok(ManagedAddresses { children })
}

/// Write the HD wallet block: mnemonic and the base path addresses hang off
pub fn print_summary<W: Write>(
    wallet: &HDWallet,
    account: &Account,
    out: &mut W,
) -> Result<(), NodeError> {
    writeln!(
        out,
        "HD Wallet\n{}\nMnemonic:      {}\nBase HD Path:  {}/{}/{{account_index}}",
        SEPARATOR,
        wallet.mnemonic(),
        account.path(),
        CHANGE_EXTERNAL
    )?;
    Ok(())
}

/// Mine on a timer and print node events until the notification stream fails
///
/// Mining errors are logged and the loop carries on. Messages without three
/// frames are skipped. A block or transaction that fails to decode, a failed
/// verbose lookup, or a transport error ends the loop.
pub async fn run<S: FrameSource, W: Write>(
    source: &mut S,
    rpc: &dyn NodeRpc,
    addresses: &ManagedAddresses,
    interval: Duration,
    verbose: bool,
    out: &mut W,
) -> Result<(), NodeError> {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    log::info!(
        "Mining a block every {}s to {} address(es)",
        interval.as_secs_f64(),
        addresses.len()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                mine_one(rpc, addresses);
            }
            frames = source.recv() => {
                let message = match RawMessage::from_frames(frames?) {
                    Ok(message) => message,
                    Err(e) => {
                        log::warn!("Skipping notification: {}", e);
                        continue;
                    }
                };
                log::debug!(
                    "Notification {} #{}",
                    String::from_utf8_lossy(message.topic_bytes()),
                    message.sequence()
                );
                if let Some(event) = NodeEvent::decode(&message)? {
                    writeln!(out, "{}", render_event(&event, rpc, verbose)?)?;
                    out.flush()?;
                }
            }
        }
    }
}

fn mine_one(rpc: &dyn NodeRpc, addresses: &ManagedAddresses) {
    let Some(child) = addresses.pick_random() else {
        log::warn!("No managed addresses to mine to");
        return;
    };
    match rpc.generate_to_address(1, child.address().as_str(), MAX_TRIES) {
        Ok(hashes) => log::debug!("Mined {:?} to {}", hashes, child.address()),
        Err(e) => log::warn!("Periodic mining to {} failed: {}", child.address(), e),
    }
}
