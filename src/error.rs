use crate::capabilities::CapabilityKind;
use crate::version::Version;
use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `SzContext`.
///
/// Each subsystem defines its own error variant. The UI layer matches on
/// these to pick a user-facing message; binaries and glue code use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum SzError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Capability registry ─────────────────────────────────────────────
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    // ── Request construction (requester side, before transmission) ──────
    #[error("request: {0}")]
    Request(#[from] RequestError),

    // ── IPC exchange ────────────────────────────────────────────────────
    #[error("ipc: {0}")]
    Ipc(#[from] IpcError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Registry errors ─────────────────────────────────────────────────────────

/// Raised only while building a registry, never at request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate capability identifier {identifier} ({first} and {second})")]
    DuplicateIdentifier {
        identifier: String,
        first: CapabilityKind,
        second: CapabilityKind,
    },

    #[error("capability '{name}' has an empty identifier")]
    EmptyIdentifier { name: String },
}

// ─── Request errors ──────────────────────────────────────────────────────────

/// Client-side rejections. Nothing is transmitted when one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("path {path} is outside every authorized root")]
    PathNotEligible { path: String },

    #[error("unknown capability {identifier}")]
    UnknownCapability { identifier: String },

    #[error("invalid {scheme} URL: {reason}")]
    InvalidUrl { scheme: &'static str, reason: String },
}

// ─── IPC errors ──────────────────────────────────────────────────────────────

/// Failures of a single exchange with the helper.
///
/// Message text is diagnostic only; callers branch on [`IpcError::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpcError {
    #[error("helper service {service} unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("helper refused the connection: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("protocol {requester} is incompatible with helper protocol {helper}")]
    ProtocolIncompatible { requester: Version, helper: Version },

    #[error("helper does not know capability {identifier}")]
    UnknownCapability { identifier: String },

    #[error("failed to launch {capability} at {path}: {cause}")]
    LaunchError {
        capability: String,
        path: String,
        cause: String,
    },

    #[error("no response from helper within {after:?}")]
    TimedOut { after: Duration },

    #[error("connection to helper lost: {reason}")]
    ConnectionLost { reason: String },

    #[error("correlation token {token} is already in flight")]
    DuplicateToken { token: String },

    #[error("malformed frame: {0}")]
    Codec(String),
}

/// Stable error classification exposed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ServiceUnavailable,
    AuthorizationDenied,
    ProtocolIncompatible,
    UnknownCapability,
    LaunchError,
    TimedOut,
    ConnectionLost,
    InvalidRequest,
}

impl IpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::ProtocolIncompatible { .. } => ErrorKind::ProtocolIncompatible,
            Self::UnknownCapability { .. } => ErrorKind::UnknownCapability,
            Self::LaunchError { .. } => ErrorKind::LaunchError,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::ConnectionLost { .. } | Self::Codec(_) => ErrorKind::ConnectionLost,
            Self::DuplicateToken { .. } => ErrorKind::InvalidRequest,
        }
    }
}

impl From<std::io::Error> for IpcError {
    fn from(err: std::io::Error) -> Self {
        Self::ConnectionLost {
            reason: err.to_string(),
        }
    }
}

impl SzError {
    /// Classification for the UI layer, where one applies.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ipc(err) => Some(err.kind()),
            Self::Request(RequestError::UnknownCapability { .. }) => {
                Some(ErrorKind::UnknownCapability)
            }
            Self::Request(_) => Some(ErrorKind::InvalidRequest),
            Self::Config(_) | Self::Registry(_) | Self::Other(_) => None,
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SzError>;
