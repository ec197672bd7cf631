use crate::capabilities::Application;
use crate::error::ConfigError;
use crate::identity::{MACH_SERVICE, SOCKET_FILE_NAME};
use crate::paths::AuthorizedRoots;
use crate::version::{CONFIG_VERSION, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Shared configuration read by both processes from the group container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Shared application-group container - computed at load, not serialized
    #[serde(skip)]
    pub group_container: PathBuf,

    #[serde(default = "default_version")]
    pub version: Version,

    /// Directories the user granted access to. `~` is expanded on read.
    #[serde(default)]
    pub authorized_roots: Vec<String>,

    #[serde(default)]
    pub capabilities: CapabilitiesConfig,

    #[serde(default)]
    pub ipc: IpcConfig,

    #[serde(default)]
    pub helper: HelperConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_version() -> Version {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            group_container: PathBuf::new(),
            version: default_version(),
            authorized_roots: Vec::new(),
            capabilities: CapabilitiesConfig::default(),
            ipc: IpcConfig::default(),
            helper: HelperConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Authorized roots with `~` expanded and paths normalized.
    pub fn authorized_roots(&self) -> AuthorizedRoots {
        AuthorizedRoots::from_paths(
            self.authorized_roots
                .iter()
                .map(|raw| shellexpand::tilde(raw).into_owned()),
        )
    }

    /// Helper socket: explicit override, else inside the group container.
    pub fn socket_path(&self) -> PathBuf {
        self.ipc
            .socket_path
            .clone()
            .unwrap_or_else(|| self.group_container.join(SOCKET_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.version.is_compatible_with(CONFIG_VERSION) {
            return Err(ConfigError::Validation(format!(
                "config version {} is incompatible with supported version {CONFIG_VERSION}",
                self.version
            )));
        }
        if self.ipc.service_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ipc.service_name must not be empty".into(),
            ));
        }
        if self.ipc.request_timeout_secs == 0
            || self.ipc.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(ConfigError::Validation(format!(
                "ipc.request_timeout_secs must be within 1..={MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }
        if self.ipc.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "ipc.connect_timeout_secs must be positive".into(),
            ));
        }
        if self.helper.launch_command.is_empty() {
            return Err(ConfigError::Validation(
                "helper.launch_command must name a program".into(),
            ));
        }
        if let Some(unknown) = self
            .capabilities
            .enabled
            .iter()
            .find(|id| !Application::all().any(|app| app.bundle_id() == id.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "capabilities.enabled names unknown capability {unknown}"
            )));
        }
        if let Some((identifier, _)) = self
            .helper
            .launch_overrides
            .iter()
            .find(|(_, argv)| argv.is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "helper.launch_overrides.\"{identifier}\" must name a program"
            )));
        }
        Ok(())
    }
}

/// Subset of the catalog shown in menus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    /// Enabled identifiers. Empty means every catalog entry is enabled.
    #[serde(default)]
    pub enabled: Vec<String>,
}

impl CapabilitiesConfig {
    pub fn is_enabled(&self, identifier: &str) -> bool {
        self.enabled.is_empty() || self.enabled.iter().any(|id| id == identifier)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_service_name() -> String {
    MACH_SERVICE.into()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    2
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            socket_path: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl IpcConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Helper-only settings. `{bundle}` and `{path}` in argv templates are
/// substituted per request; no shell is involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default = "default_launch_command")]
    pub launch_command: Vec<String>,
    #[serde(default)]
    pub launch_overrides: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
}

fn default_launch_command() -> Vec<String> {
    ["open", "-b", "{bundle}", "{path}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_initial_backoff_secs() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    30
}

fn default_max_restarts() -> u32 {
    10
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            launch_command: default_launch_command(),
            launch_overrides: BTreeMap::new(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            max_restarts: default_max_restarts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
