use crate::capabilities::CapabilityRegistry;
use crate::ipc::launcher::Launcher;
use crate::ipc::protocol::{FailureReason, LaunchRequest, LaunchResponse};
use crate::version::{PROTOCOL_VERSION, Version};
use std::path::Path;

/// Helper-side validation and dispatch of one request.
///
/// Checks run in a fixed order and each short-circuits: protocol major
/// version, then capability lookup, then the launch. A rejected request
/// never reaches the registry or the launcher.
pub struct RequestHandler<L> {
    registry: CapabilityRegistry,
    launcher: L,
    version: Version,
}

impl<L: Launcher> RequestHandler<L> {
    pub fn new(registry: CapabilityRegistry, launcher: L) -> Self {
        Self {
            registry,
            launcher,
            version: PROTOCOL_VERSION,
        }
    }

    /// Advertise a different protocol version.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub async fn handle(&self, request: &LaunchRequest) -> LaunchResponse {
        let token = request.token;

        if !request.version.is_compatible_with(self.version) {
            tracing::warn!(
                %token,
                requester = %request.version,
                helper = %self.version,
                "rejecting request with incompatible protocol version"
            );
            return LaunchResponse::failure(
                token,
                FailureReason::ProtocolIncompatible {
                    requester: request.version,
                    helper: self.version,
                },
            );
        }

        let Some(capability) = self.registry.lookup(&request.capability) else {
            tracing::warn!(%token, capability = %request.capability, "rejecting unknown capability");
            return LaunchResponse::failure(
                token,
                FailureReason::UnknownCapability {
                    identifier: request.capability.clone(),
                },
            );
        };

        match self
            .launcher
            .launch(capability, Path::new(&request.path))
            .await
        {
            Ok(()) => LaunchResponse::success(token),
            Err(err) => {
                tracing::warn!(
                    %token,
                    capability = capability.identifier,
                    path = %request.path,
                    error = %format!("{err:#}"),
                    "launch failed"
                );
                LaunchResponse::failure(
                    token,
                    FailureReason::LaunchError {
                        capability: capability.identifier.to_string(),
                        path: request.path.clone(),
                        cause: format!("{err:#}"),
                    },
                )
            }
        }
    }
}
