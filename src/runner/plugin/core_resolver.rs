//! Registry source: wraps a `NamespaceRegistry` as a `NamespaceSource`.
//!
//! This is how the standard namespaces reach a realm's `require`.

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::plugin::registry::NamespaceRegistry;
use crate::runner::plugin::resolver::NamespaceSource;
use crate::runner::plugin::types::NamespaceDef;

pub struct RegistrySource {
    name: String,
    registry: NamespaceRegistry,
}

impl RegistrySource {
    pub fn new(registry: NamespaceRegistry) -> Self {
        Self::named("registry", registry)
    }

    pub fn named(name: impl Into<String>, registry: NamespaceRegistry) -> Self {
        RegistrySource {
            name: name.into(),
            registry,
        }
    }

    /// Source over the standard namespaces.
    pub fn std() -> Self {
        Self::named("std", NamespaceRegistry::with_std())
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }
}

impl NamespaceSource for RegistrySource {
    fn provides(&self, namespace: &str) -> bool {
        self.registry.has_namespace(namespace)
    }

    fn load(&self, namespace: &str) -> Result<NamespaceDef> {
        self.registry
            .get_namespace(namespace)
            .cloned()
            .ok_or_else(|| BridgeError::NamespaceNotFound {
                namespace: namespace.to_string(),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
