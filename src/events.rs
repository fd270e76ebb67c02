//! Block and transaction notifications published by bitcoind over ZMQ
//!
//! bitcoind sends every notification as three frames: topic, body and a
//! 4-byte little-endian sequence number. Only `rawblock` and `rawtx` carry
//! something the tool prints; the hash topics are subscribed to but ignored.

use bitcoin::consensus::deserialize;
use bitcoin::{Block, Transaction};
use std::fmt;
use std::future::Future;

use crate::error::NodeError;
use crate::rpc::NodeRpc;

/// Separator printed before each event
pub const SEPARATOR: &str = "==================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Hash,
    HashBlock,
    HashTx,
    RawBlock,
    RawTx,
}

impl Topic {
    /// Every topic the subscriber registers for
    pub const ALL: [Topic; 5] = [
        Topic::Hash,
        Topic::HashBlock,
        Topic::HashTx,
        Topic::RawBlock,
        Topic::RawTx,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Hash => "hash",
            Topic::HashBlock => "hashblock",
            Topic::HashTx => "hashtx",
            Topic::RawBlock => "rawblock",
            Topic::RawTx => "rawtx",
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Topic> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str().as_bytes() == bytes)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated three-frame notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    topic: Vec<u8>,
    payload: Vec<u8>,
    sequence: u32,
}

impl RawMessage {
    /// Check the frame count and the sequence frame width
    pub fn from_frames(frames: Vec<Vec<u8>>) -> Result<Self, NodeError> {
        let [topic, payload, sequence]: [Vec<u8>; 3] = frames.try_into().map_err(
            |frames: Vec<Vec<u8>>| {
                NodeError::MalformedMessage(format!("expected 3 frames, got {}", frames.len()))
            },
        )?;

        let sequence: [u8; 4] = sequence.as_slice().try_into().map_err(|_| {
            NodeError::MalformedMessage(format!(
                "sequence frame is {} bytes, expected 4",
                sequence.len()
            ))
        })?;

        Ok(Self {
            topic,
            payload,
            sequence: u32::from_le_bytes(sequence),
        })
    }

    /// `None` for topics the tool does not know
    pub fn topic(&self) -> Option<Topic> {
        Topic::from_bytes(&self.topic)
    }

    pub fn topic_bytes(&self) -> &[u8] {
        &self.topic
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    Block { hash: String },
    Transaction { txid: String },
}

impl NodeEvent {
    /// Decode a `rawblock` / `rawtx` body; other topics yield `Ok(None)`
    pub fn decode(message: &RawMessage) -> Result<Option<NodeEvent>, NodeError> {
        match message.topic() {
            Some(Topic::RawBlock) => {
                let block: Block = deserialize(message.payload())
                    .map_err(|e| NodeError::Decode(format!("rawblock: {}", e)))?;
                Ok(Some(NodeEvent::Block {
                    hash: block.block_hash().to_string(),
                }))
            }
            Some(Topic::RawTx) => {
                let tx: Transaction = deserialize(message.payload())
                    .map_err(|e| NodeError::Decode(format!("rawtx: {}", e)))?;
                Ok(Some(NodeEvent::Transaction {
                    txid: tx.compute_txid().to_string(),
                }))
            }
            _ => Ok(None),
        }
    }
}

/// Text printed for one event; in verbose mode the node's JSON view follows
pub fn render_event(
    event: &NodeEvent,
    rpc: &dyn NodeRpc,
    verbose: bool,
) -> Result<String, NodeError> {
    let (header, detail) = match event {
        NodeEvent::Block { hash } => (
            format!("block hash: {}", hash),
            verbose.then(|| rpc.get_block_verbose(hash)).transpose()?,
        ),
        NodeEvent::Transaction { txid } => (
            format!("tx hash: {}", txid),
            verbose.then(|| rpc.get_rawtx_verbose(txid)).transpose()?,
        ),
    };

    let mut out = format!("{}\n{}", SEPARATOR, header);
    if let Some(json) = detail {
        let pretty = serde_json::to_string_pretty(&json)
            .map_err(|e| NodeError::Decode(e.to_string()))?;
        out.push('\n');
        out.push_str(&pretty);
    }
    Ok(out)
}

/// Anything that yields multipart notifications
pub trait FrameSource {
    fn recv(&mut self) -> impl Future<Output = Result<Vec<Vec<u8>>, NodeError>>;
}
