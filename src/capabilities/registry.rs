use super::{ApplicationCapability, CapabilityKind, catalog};
use crate::error::RegistryError;
use std::collections::HashMap;

/// Immutable lookup table of launchable applications.
///
/// Identifiers double as routing keys on the wire, so they must be unique
/// across both kinds; construction fails otherwise.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    entries: Vec<ApplicationCapability>,
    index: HashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    /// Registry over the compiled-in catalog.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_entries(catalog::builtin_capabilities())
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = ApplicationCapability>,
    ) -> Result<Self, RegistryError> {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.identifier.is_empty() {
                return Err(RegistryError::EmptyIdentifier {
                    name: entry.display_name.to_string(),
                });
            }
            if let Some(first) = index.insert(entry.identifier, position) {
                return Err(RegistryError::DuplicateIdentifier {
                    identifier: entry.identifier.to_string(),
                    first: entries[first].kind(),
                    second: entry.kind(),
                });
            }
        }
        tracing::debug!(capabilities = entries.len(), "capability registry initialized");
        Ok(Self { entries, index })
    }

    pub fn lookup(&self, identifier: &str) -> Option<&ApplicationCapability> {
        self.index.get(identifier).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Entries of one kind in declaration order.
    pub fn list_all(&self, kind: CapabilityKind) -> Vec<&ApplicationCapability> {
        self.entries.iter().filter(|e| e.kind() == kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicationCapability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
