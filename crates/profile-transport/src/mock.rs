use crate::{
    Command, CommandChannel, ProfileSubscriber, Result, StreamMetadata, Timestamp,
    TransportError,
};
use async_trait::async_trait;
use std::collections::VecDeque;

/// In-process data channel fed from a queue of raw parts. Once the queue is
/// drained every receive returns [`TransportError::Closed`].
#[derive(Debug, Default)]
pub struct MockSubscriber {
    parts: VecDeque<Vec<u8>>,
}

impl MockSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one well-formed cycle: pickled metadata then the payload.
    pub fn push_cycle(&mut self, md: &StreamMetadata, payload: Vec<u8>) {
        self.parts.push_back(md.to_pickle());
        self.parts.push_back(payload);
    }

    /// Queue a single raw part, e.g. corrupt metadata.
    pub fn push_part(&mut self, part: Vec<u8>) {
        self.parts.push_back(part);
    }

    pub fn remaining(&self) -> usize {
        self.parts.len()
    }
}

#[async_trait]
impl ProfileSubscriber for MockSubscriber {
    async fn recv_metadata(&mut self) -> Result<StreamMetadata> {
        let raw = self.parts.pop_front().ok_or(TransportError::Closed)?;
        let mut md = StreamMetadata::decode(&raw)?;
        md.received_at = Some(Timestamp::now());
        Ok(md)
    }

    async fn recv_payload(&mut self) -> Result<Vec<u8>> {
        self.parts.pop_front().ok_or(TransportError::Closed)
    }
}

/// Control channel that records every request and answers with a fixed reply.
#[derive(Debug, Default)]
pub struct MockCommandChannel {
    pub requests: Vec<Command>,
    pub reply: Vec<u8>,
    pub fail: bool,
}

impl MockCommandChannel {
    pub fn with_reply(reply: &[u8]) -> Self {
        Self {
            reply: reply.to_vec(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CommandChannel for MockCommandChannel {
    async fn request(&mut self, command: &Command) -> Result<Vec<u8>> {
        if self.fail {
            return Err(TransportError::Io("mock command channel refused".into()));
        }
        self.requests.push(command.clone());
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_subscriber_cycle() {
        let mut sub = MockSubscriber::new();
        sub.push_cycle(&StreamMetadata::new("|S4", vec![1]), b"abcd".to_vec());
        assert_eq!(sub.remaining(), 2);

        let md = sub.recv_metadata().await.unwrap();
        assert_eq!(md.shape, vec![1]);
        assert!(md.received_at.is_some());
        assert_eq!(sub.recv_payload().await.unwrap(), b"abcd".to_vec());
        assert!(matches!(
            sub.recv_metadata().await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_mock_subscriber_bad_metadata() {
        let mut sub = MockSubscriber::new();
        sub.push_part(b"{oops".to_vec());
        let err = sub.recv_metadata().await.unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_mock_command_channel_records() {
        let mut ch = MockCommandChannel::with_reply(b"ok");
        let reply = ch.request(&Command::send_profiles_twiss()).await.unwrap();
        assert_eq!(reply, b"ok".to_vec());
        assert_eq!(ch.requests, vec![Command::send_profiles_twiss()]);

        ch.fail = true;
        assert!(ch.request(&Command::send_profiles_twiss()).await.is_err());
        assert_eq!(ch.requests.len(), 1);
    }
}
