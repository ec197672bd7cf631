//! Messages exchanged between the requester and the helper.
//!
//! Every frame is a JSON object tagged by `type`. The requester speaks
//! [`RequesterFrame`], the helper answers with [`HelperFrame`].

use crate::error::IpcError;
use crate::version::{PROTOCOL_VERSION, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Distinguishes concurrent requests on one channel. Fresh per user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Ask the helper to open `path` with the application named by `capability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub token: CorrelationToken,
    pub version: Version,
    pub capability: String,
    pub path: String,
}

impl LaunchRequest {
    /// New request with a fresh token at the current protocol version.
    pub fn new(capability: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            token: CorrelationToken::new(),
            version: PROTOCOL_VERSION,
            capability: capability.into(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchResponse {
    pub token: CorrelationToken,
    pub outcome: Outcome,
}

impl LaunchResponse {
    pub fn success(token: CorrelationToken) -> Self {
        Self {
            token,
            outcome: Outcome::Success,
        }
    }

    pub fn failure(token: CorrelationToken, reason: FailureReason) -> Self {
        Self {
            token,
            outcome: Outcome::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Collapse the outcome into the requester's error taxonomy.
    pub fn into_result(self) -> Result<(), IpcError> {
        match self.outcome {
            Outcome::Success => Ok(()),
            Outcome::Failure { reason } => Err(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure { reason: FailureReason },
}

/// Why the helper refused or failed a request.
///
/// `cause` is diagnostic text only; callers branch on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    ProtocolIncompatible {
        requester: Version,
        helper: Version,
    },
    UnknownCapability {
        identifier: String,
    },
    LaunchError {
        capability: String,
        path: String,
        cause: String,
    },
}

impl From<FailureReason> for IpcError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::ProtocolIncompatible { requester, helper } => {
                Self::ProtocolIncompatible { requester, helper }
            }
            FailureReason::UnknownCapability { identifier } => Self::UnknownCapability { identifier },
            FailureReason::LaunchError {
                capability,
                path,
                cause,
            } => Self::LaunchError {
                capability,
                path,
                cause,
            },
        }
    }
}

/// Frames written by the helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HelperFrame {
    /// First frame on every accepted connection.
    Welcome { service: String, version: Version },
    /// Peer failed the transport-level check; the connection closes next.
    Denied { reason: String },
    Response(LaunchResponse),
    Pong { version: Version },
}

/// Frames written by the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequesterFrame {
    Launch(LaunchRequest),
    Ping,
}
