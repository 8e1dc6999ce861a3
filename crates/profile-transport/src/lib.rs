//! profile-transport: streamed profile data and upstream command channels
//!
//! The data channel delivers a metadata part (`dtype` + `shape`) followed by a raw
//! buffer part. The control channel is a one-shot request/reply used to ask the
//! upstream model to start producing profiles. The default build enables a `mock`
//! backend so that binaries and tests run on any host without a message broker.

mod types;
pub use types::{ByteOrder, Command, Dtype, StreamMetadata, Timestamp, SEND_PROFILES_TWISS};

mod error;
pub use error::{Result, TransportError};

mod codec;
pub use codec::{data_rows, decode_rows, BOUNDARY_ROWS};

mod traits;
pub use traits::{CommandChannel, ProfileSubscriber};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockCommandChannel, MockSubscriber};

#[cfg(feature = "zmq")]
mod zmq;

#[cfg(feature = "zmq")]
pub use zmq::{ZmqCommandChannel, ZmqSubscriber};

/// Build a `tcp://host:port` endpoint string.
pub fn tcp_endpoint(host: &str, port: u16) -> String {
    format!("tcp://{host}:{port}")
}
