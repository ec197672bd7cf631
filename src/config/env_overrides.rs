use super::Config;

impl Config {
    /// Environment always beats the file. Overrides are never persisted:
    /// callers that save reload from disk first.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(service) = std::env::var("SZCONTEXT_SERVICE_NAME")
            && !service.is_empty()
        {
            self.ipc.service_name = service;
        }

        if let Ok(secs) = std::env::var("SZCONTEXT_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && (1..=60).contains(&secs)
        {
            self.ipc.request_timeout_secs = secs;
        }

        if let Ok(socket) = std::env::var("SZCONTEXT_SOCKET")
            && !socket.is_empty()
        {
            self.ipc.socket_path = Some(socket.into());
        }

        if let Ok(level) = std::env::var("SZCONTEXT_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
