//! Shared test utilities: a scripted node and a scripted notification feed

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use matcha::{NodeError, NodeRpc};

pub const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Records every call; `generate_to_address` can be told to fail
#[derive(Default)]
pub struct MockRpc {
    pub imported: Mutex<Vec<String>>,
    pub mined: Mutex<Vec<(u64, String, u64)>>,
    pub verbose_lookups: Mutex<Vec<String>>,
    pub fail_mining: bool,
}

impl MockRpc {
    pub fn failing_mining() -> Self {
        Self {
            fail_mining: true,
            ..Default::default()
        }
    }

    pub fn imported(&self) -> Vec<String> {
        self.imported.lock().unwrap().clone()
    }

    pub fn mined(&self) -> Vec<(u64, String, u64)> {
        self.mined.lock().unwrap().clone()
    }
}

impl NodeRpc for MockRpc {
    fn get_blockchain_info(&self) -> Result<Value, NodeError> {
        Ok(json!({ "chain": "regtest", "blocks": 0 }))
    }

    fn import_privkey(&self, wif: &str) -> Result<(), NodeError> {
        self.imported.lock().unwrap().push(wif.to_string());
        Ok(())
    }

    fn generate_to_address(
        &self,
        n: u64,
        address: &str,
        max_tries: u64,
    ) -> Result<Vec<String>, NodeError> {
        self.mined
            .lock()
            .unwrap()
            .push((n, address.to_string(), max_tries));
        if self.fail_mining {
            return Err(NodeError::Rpc("mining disabled".into()));
        }
        Ok((0..n).map(|i| format!("{:064x}", i)).collect())
    }

    fn get_block_verbose(&self, hash: &str) -> Result<Value, NodeError> {
        self.verbose_lookups.lock().unwrap().push(hash.to_string());
        Ok(json!({ "hash": hash, "height": 0 }))
    }

    fn get_rawtx_verbose(&self, txid: &str) -> Result<Value, NodeError> {
        self.verbose_lookups.lock().unwrap().push(txid.to_string());
        Ok(json!({ "txid": txid }))
    }
}

/// Replays queued frame sets, then fails like a dropped socket
pub struct ScriptedFrames {
    queue: VecDeque<Vec<Vec<u8>>>,
    /// Delay before the closing error, so timer branches get a chance to run
    linger: Duration,
    closes_at: Option<Instant>,
}

impl ScriptedFrames {
    pub fn new(messages: Vec<Vec<Vec<u8>>>) -> Self {
        Self {
            queue: messages.into(),
            linger: Duration::ZERO,
            closes_at: None,
        }
    }

    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }
}

impl matcha::FrameSource for ScriptedFrames {
    async fn recv(&mut self) -> Result<Vec<Vec<u8>>, NodeError> {
        match self.queue.pop_front() {
            Some(frames) => Ok(frames),
            None => {
                // The loop drops this future whenever the timer fires, so
                // the close time must not restart on every call
                let linger = self.linger;
                let deadline = *self.closes_at.get_or_insert_with(|| Instant::now() + linger);
                tokio::time::sleep_until(deadline).await;
                Err(NodeError::Subscription("socket closed".into()))
            }
        }
    }
}

pub fn notification(topic: &str, payload: Vec<u8>, sequence: u32) -> Vec<Vec<u8>> {
    vec![
        topic.as_bytes().to_vec(),
        payload,
        sequence.to_le_bytes().to_vec(),
    ]
}
