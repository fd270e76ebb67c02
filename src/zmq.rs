/// ZMQ subscriber for bitcoind's `-zmqpub*` notifications

use zeromq::{Socket, SocketRecv, SubSocket};

use crate::error::NodeError;
use crate::events::{FrameSource, Topic};

pub struct ZmqSubscriber {
    socket: SubSocket,
    endpoint: String,
}

impl ZmqSubscriber {
    /// Connect a SUB socket to `endpoint` and subscribe to every [`Topic`]
    pub async fn connect(endpoint: &str) -> Result<Self, NodeError> {
        let mut socket = SubSocket::new();
        socket
            .connect(endpoint)
            .await
            .map_err(|e| NodeError::Subscription(format!("connect {}: {}", endpoint, e)))?;

        for topic in Topic::ALL {
            socket.subscribe(topic.as_str()).await?;
        }

        log::info!("Subscribed to ZMQ notifications at {}", endpoint);
        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FrameSource for ZmqSubscriber {
    async fn recv(&mut self) -> Result<Vec<Vec<u8>>, NodeError> {
        let message = self.socket.recv().await?;
        Ok(message
            .into_vec()
            .into_iter()
            .map(|frame| frame.to_vec())
            .collect())
    }
}
