//! Catalog of external applications the helper is allowed to launch.

mod catalog;
mod registry;
mod types;

pub use registry::CapabilityRegistry;
pub use types::{Application, ApplicationCapability, CapabilityKind, EditorApp, TerminalApp};
