use clap::{Subcommand, ValueEnum};

use crate::capabilities::CapabilityKind;

/// Helper service management subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    /// Install the helper as a launchd agent or systemd user unit
    Install,
    /// Start the helper service
    Start,
    /// Stop the helper service
    Stop,
    /// Check helper service status
    Status,
    /// Uninstall the helper service
    Uninstall,
}

/// Authorized root management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RootsCommand {
    /// List authorized roots
    List,
    /// Grant access to a directory
    Add {
        /// Absolute directory path (`~` is expanded)
        path: String,
    },
    /// Revoke access to a directory
    Remove {
        /// Directory path as listed by `roots list`
        path: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Terminal,
    Editor,
}

impl From<KindArg> for CapabilityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Terminal => Self::Terminal,
            KindArg::Editor => Self::Editor,
        }
    }
}
