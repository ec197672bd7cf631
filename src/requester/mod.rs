//! Requester side: selection filtering, request construction and delivery.
//!
//! Every request passes the same gate whether it came from a menu click, the
//! CLI or a URL: the path must lie under an authorized root and the
//! capability must exist in the registry. Rejected requests are never
//! transmitted.

mod selection;
mod url_scheme;

pub use selection::Selection;
pub use url_scheme::OpenUrl;

use crate::capabilities::{ApplicationCapability, CapabilityKind, CapabilityRegistry};
use crate::config::{CapabilitiesConfig, Config};
use crate::error::{IpcError, RequestError, Result};
use crate::ipc::{Endpoint, IpcCoordinator, LaunchRequest};
use crate::paths::{self, AuthorizedRoots};
use crate::version::Version;
use futures_util::future::join_all;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;

/// One group of the contextual menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection<'a> {
    pub kind: CapabilityKind,
    pub entries: Vec<&'a ApplicationCapability>,
}

pub struct Requester {
    registry: CapabilityRegistry,
    roots: AuthorizedRoots,
    capabilities: CapabilitiesConfig,
    endpoint: Endpoint,
    coordinator: Mutex<Option<Arc<IpcCoordinator>>>,
}

impl Requester {
    pub fn new(
        registry: CapabilityRegistry,
        roots: AuthorizedRoots,
        capabilities: CapabilitiesConfig,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            registry,
            roots,
            capabilities,
            endpoint,
            coordinator: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config, registry: CapabilityRegistry) -> Self {
        Self::new(
            registry,
            config.authorized_roots(),
            config.capabilities.clone(),
            Endpoint::from_config(config),
        )
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn roots(&self) -> &AuthorizedRoots {
        &self.roots
    }

    pub fn is_eligible(&self, path: &str) -> bool {
        paths::is_contained(path, &self.roots)
    }

    /// Candidates from `selection` that lie under an authorized root.
    pub fn eligible_paths<'s>(&self, selection: &'s Selection) -> Vec<&'s str> {
        selection
            .candidates()
            .into_iter()
            .filter(|path| self.is_eligible(path))
            .collect()
    }

    /// Enabled capabilities grouped by kind, empty when nothing in the
    /// selection is eligible.
    pub fn menu(&self, selection: &Selection) -> Vec<MenuSection<'_>> {
        if self.eligible_paths(selection).is_empty() {
            return Vec::new();
        }
        CapabilityKind::iter()
            .map(|kind| MenuSection {
                kind,
                entries: self
                    .registry
                    .list_all(kind)
                    .into_iter()
                    .filter(|entry| self.capabilities.is_enabled(entry.identifier))
                    .collect(),
            })
            .filter(|section| !section.entries.is_empty())
            .collect()
    }

    /// Validates and builds a request. Nothing is sent.
    pub fn build_request(
        &self,
        capability: &str,
        path: &str,
    ) -> std::result::Result<LaunchRequest, RequestError> {
        let Some(normalized) = paths::normalize(path).filter(|_| self.is_eligible(path)) else {
            tracing::warn!(path, "path is outside every authorized root");
            return Err(RequestError::PathNotEligible { path: path.into() });
        };
        if !self.registry.contains(capability) {
            tracing::warn!(capability, "unknown capability");
            return Err(RequestError::UnknownCapability {
                identifier: capability.into(),
            });
        }
        Ok(LaunchRequest::new(
            capability,
            normalized.to_string_lossy().into_owned(),
        ))
    }

    /// Shared connection to the helper, reconnecting when the last one broke.
    pub async fn connect(&self) -> std::result::Result<Arc<IpcCoordinator>, IpcError> {
        let mut slot = self.coordinator.lock().await;
        if let Some(existing) = slot.as_ref()
            && existing.is_connected().await
        {
            return Ok(Arc::clone(existing));
        }
        let fresh = Arc::new(IpcCoordinator::connect(&self.endpoint).await?);
        *slot = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Opens `path` with `capability` through the helper.
    pub async fn open(&self, capability: &str, path: &str) -> Result<()> {
        let request = self.build_request(capability, path)?;
        let token = request.token;
        let coordinator = self.connect().await?;
        tracing::debug!(%token, capability, path, "sending launch request");
        coordinator.send(request).await?.into_result()?;
        Ok(())
    }

    /// One request per path, in flight concurrently. Results keep input order.
    pub async fn open_all<'p>(
        &self,
        capability: &str,
        paths: &'p [String],
    ) -> Vec<(&'p str, Result<()>)> {
        let results = join_all(paths.iter().map(|path| self.open(capability, path))).await;
        paths.iter().map(String::as_str).zip(results).collect()
    }

    pub async fn open_url(&self, raw: &str) -> Result<()> {
        let url = OpenUrl::parse(raw)?;
        self.open(&url.app, &url.path).await
    }

    /// Helper liveness; returns its protocol version.
    pub async fn status(&self) -> std::result::Result<Version, IpcError> {
        self.connect().await?.ping().await
    }
}
