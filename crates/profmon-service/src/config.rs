use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL_PORT: u16 = 12312;
pub const DEFAULT_PROFILE_PORT: u16 = 12345;

/// Runtime settings, resolved by the binary from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub config_path: PathBuf,
    pub host: String,
    /// Control channel (request/reply) port.
    pub model_port: u16,
    /// Data channel (publish/subscribe) port.
    pub profile_port: u16,
    /// Send the profile request at startup.
    pub trigger: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("screenProps5.dat"),
            host: "127.0.0.1".to_string(),
            model_port: DEFAULT_MODEL_PORT,
            profile_port: DEFAULT_PROFILE_PORT,
            trigger: true,
        }
    }
}

impl ServiceConfig {
    pub fn model_endpoint(&self) -> String {
        profile_transport::tcp_endpoint(&self.host, self.model_port)
    }

    pub fn profile_endpoint(&self) -> String {
        profile_transport::tcp_endpoint(&self.host, self.profile_port)
    }
}
