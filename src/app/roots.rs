use crate::config::Config;
use crate::paths::{self, AuthorizedRoot};
use anyhow::{Result, bail};

fn expand(raw: &str) -> String {
    shellexpand::tilde(raw).into_owned()
}

/// Adds `raw` to the authorized roots. Returns `false` when an equivalent
/// root is already present.
pub(crate) fn add_root(config: &mut Config, raw: &str) -> Result<bool> {
    let expanded = expand(raw);
    let Some(root) = AuthorizedRoot::new(&expanded) else {
        bail!("'{raw}' is not an absolute path");
    };
    if !root.as_path().is_dir() {
        tracing::warn!(root = %root, "authorized root does not exist yet");
    }
    if config.authorized_roots().iter().any(|existing| *existing == root) {
        return Ok(false);
    }
    config.authorized_roots.push(root.to_string());
    Ok(true)
}

/// Removes every entry equivalent to `raw`. Returns whether anything changed.
pub(crate) fn remove_root(config: &mut Config, raw: &str) -> bool {
    let Some(target) = paths::normalize(&expand(raw)) else {
        return false;
    };
    let before = config.authorized_roots.len();
    config
        .authorized_roots
        .retain(|entry| paths::normalize(&expand(entry)).as_deref() != Some(target.as_path()));
    config.authorized_roots.len() != before
}
