//! Installs the helper as a per-user background service: a launchd agent on
//! macOS, a systemd user unit on Linux.

mod commands;
mod platform;
mod utils;

pub use commands::handle_command;

use crate::identity::HELPER_BUNDLE;

pub(super) const SERVICE_LABEL: &str = HELPER_BUNDLE;
pub(super) const SYSTEMD_UNIT: &str = "szcontext-helper.service";
