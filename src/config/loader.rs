use super::Config;
use crate::identity::{APP_GROUP, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use directories::{BaseDirs, UserDirs};
use std::fs;
use std::path::{Path, PathBuf};

pub(super) const GROUP_CONTAINER_ENV: &str = "SZCONTEXT_GROUP_CONTAINER";

/// Location of the shared group container.
///
/// `SZCONTEXT_GROUP_CONTAINER` wins; otherwise the platform default, which on
/// macOS is `~/Library/Group Containers/<app group>`.
pub fn default_group_container() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(GROUP_CONTAINER_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
    }

    if cfg!(target_os = "macos") {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Ok(home.join("Library").join("Group Containers").join(APP_GROUP))
    } else {
        let base = BaseDirs::new().context("Could not find home directory")?;
        Ok(base.data_local_dir().join(APP_GROUP))
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_in(&default_group_container()?)
    }

    /// Loads `config.toml` from `container`, writing defaults when missing.
    pub fn load_or_init_in(container: &Path) -> Result<Self> {
        if !container.exists() {
            fs::create_dir_all(container).with_context(|| {
                format!("Failed to create group container {}", container.display())
            })?;
        }

        let config_path = container.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path,
                group_container: container.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %config.config_path.display(), "wrote default config");
            Ok(config)
        }
    }

    /// Reads and validates an existing config file. Its parent directory
    /// becomes the group container.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_path = config_path.to_path_buf();
        config.group_container = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
