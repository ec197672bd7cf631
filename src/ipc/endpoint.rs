use crate::config::Config;
use std::path::PathBuf;
use std::time::Duration;

/// Where and how the requester reaches the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub socket_path: PathBuf,
    /// Must equal the name the helper announces in its welcome frame.
    pub service_name: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Endpoint {
    pub fn new(socket_path: impl Into<PathBuf>, service_name: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            service_name: service_name.into(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            socket_path: config.socket_path(),
            service_name: config.ipc.service_name.clone(),
            connect_timeout: config.ipc.connect_timeout(),
            request_timeout: config.ipc.request_timeout(),
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
