//! Registry of compiled-in namespaces.

use std::collections::HashMap;

use super::types::{NamespaceDef, PackageInfo};
use crate::runner::std_lib::register_std_namespaces;

/// Holds namespace definitions registered programmatically, plus the
/// packages they came from.
pub struct NamespaceRegistry {
    /// All registered namespaces.
    namespaces: HashMap<String, NamespaceDef>,

    /// Registered packages, in registration order.
    packages: Vec<PackageInfo>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        NamespaceRegistry {
            namespaces: HashMap::new(),
            packages: Vec::new(),
        }
    }

    /// Create a registry holding the standard namespaces (`text`, `io`).
    pub fn with_std() -> Self {
        let mut registry = Self::new();
        register_std_namespaces(&mut registry);
        registry.packages.push(
            PackageInfo::new("std", env!("CARGO_PKG_VERSION"))
                .with_provides(vec!["text".to_string(), "io".to_string()]),
        );
        registry
    }

    pub fn register_namespace(&mut self, def: NamespaceDef) {
        self.namespaces.insert(def.name.clone(), def);
    }

    pub fn get_namespace(&self, name: &str) -> Option<&NamespaceDef> {
        self.namespaces.get(name)
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn packages(&self) -> &[PackageInfo] {
        &self.packages
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::with_std()
    }
}
