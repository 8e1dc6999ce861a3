use crate::{Command, Result, StreamMetadata};
use async_trait::async_trait;

/// Subscriber side of the data channel. Each cycle is one metadata part
/// followed by one payload part.
#[async_trait]
pub trait ProfileSubscriber: Send {
    /// Wait for the next metadata part and decode it.
    async fn recv_metadata(&mut self) -> Result<StreamMetadata>;

    /// Wait for the raw buffer that follows a metadata part.
    async fn recv_payload(&mut self) -> Result<Vec<u8>>;

    /// Drop any buffered parts of the current message after a decode failure
    /// so the next `recv_metadata` starts on a message boundary.
    fn discard_pending(&mut self) {}
}

/// Blocking-style request/reply channel to the upstream producer.
#[async_trait]
pub trait CommandChannel: Send {
    /// Send one command and wait for its reply.
    async fn request(&mut self, command: &Command) -> Result<Vec<u8>>;
}
