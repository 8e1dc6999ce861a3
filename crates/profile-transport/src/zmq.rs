use crate::{
    Command, CommandChannel, ProfileSubscriber, Result, StreamMetadata, Timestamp,
    TransportError,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use tracing::debug;
use zeromq::{Socket, SocketRecv, SocketSend, ZmqMessage};

/// SUB socket on the profile data channel, subscribed to every topic.
pub struct ZmqSubscriber {
    endpoint: String,
    socket: zeromq::SubSocket,
    // Frames of a multipart message not consumed yet.
    pending: VecDeque<Vec<u8>>,
}

impl ZmqSubscriber {
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let mut socket = zeromq::SubSocket::new();
        socket
            .connect(endpoint)
            .await
            .map_err(|e| TransportError::Connect(format!("{endpoint}: {e}")))?;
        socket
            .subscribe("")
            .await
            .map_err(|e| TransportError::Connect(format!("{endpoint}: {e}")))?;
        debug!(endpoint, "profile subscriber connected");
        Ok(Self {
            endpoint: endpoint.to_string(),
            socket,
            pending: VecDeque::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn next_part(&mut self) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            let msg = self
                .socket
                .recv()
                .await
                .map_err(|e| TransportError::Io(e.to_string()))?;
            self.pending
                .extend(msg.into_vec().into_iter().map(|b| b.to_vec()));
        }
        self.pending.pop_front().ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl ProfileSubscriber for ZmqSubscriber {
    async fn recv_metadata(&mut self) -> Result<StreamMetadata> {
        let raw = self.next_part().await?;
        let mut md = StreamMetadata::decode(&raw)?;
        md.received_at = Some(Timestamp::now());
        Ok(md)
    }

    async fn recv_payload(&mut self) -> Result<Vec<u8>> {
        self.next_part().await
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

/// REQ socket on the model control channel.
pub struct ZmqCommandChannel {
    socket: zeromq::ReqSocket,
}

impl ZmqCommandChannel {
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let mut socket = zeromq::ReqSocket::new();
        socket
            .connect(endpoint)
            .await
            .map_err(|e| TransportError::Connect(format!("{endpoint}: {e}")))?;
        Ok(Self { socket })
    }
}

#[async_trait]
impl CommandChannel for ZmqCommandChannel {
    async fn request(&mut self, command: &Command) -> Result<Vec<u8>> {
        self.socket
            .send(ZmqMessage::from(command.to_pickle()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let reply = self
            .socket
            .recv()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(reply.into_vec().into_iter().flat_map(|b| b.to_vec()).collect())
    }
}
