mod env_overrides;
mod loader;
mod schema;

#[cfg(test)]
pub(crate) mod test_env;

pub use loader::default_group_container;
pub use schema::{CapabilitiesConfig, Config, HelperConfig, IpcConfig, ObservabilityConfig};
