//! Namespace table: the ordered list of sources a loader or realm consults.
//!
//! When a namespace is required and not yet loaded, the table asks each
//! source in registration order whether it provides the name. The first
//! source that does wins, and the table remembers which one it was so the
//! next lookup (e.g. a forced `load`) goes straight to it.
//!
//! ```text
//! (require "text")
//!      ↓
//! 1. owner cache → miss
//! 2. sources[0].provides("text") → no
//! 3. sources[1].provides("text") → yes, remember index 1
//! 4. sources[1].load("text")
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::runner::ds::error::Result;
use crate::runner::plugin::resolver::NamespaceSource;
use crate::runner::plugin::types::NamespaceDef;

#[derive(Default)]
pub struct NamespaceTable {
    /// Registered sources, queried in order.
    sources: Vec<Arc<dyn NamespaceSource>>,
    /// Which source index owns which namespace.
    owners: RwLock<HashMap<String, usize>>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        NamespaceTable {
            sources: Vec::new(),
            owners: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn NamespaceSource>) {
        self.sources.push(source);
    }

    fn owner_index(&self, namespace: &str) -> Option<usize> {
        if let Some(&idx) = self.owners.read().get(namespace) {
            return Some(idx);
        }
        let idx = self.sources.iter().position(|s| s.provides(namespace))?;
        self.owners.write().insert(namespace.to_string(), idx);
        Some(idx)
    }

    pub fn provides(&self, namespace: &str) -> bool {
        self.owner_index(namespace).is_some()
    }

    /// Load `namespace` from its owning source, `None` when no source has it.
    pub fn find(&self, namespace: &str) -> Result<Option<NamespaceDef>> {
        match self.owner_index(namespace) {
            Some(idx) => {
                let source = &self.sources[idx];
                trace!(namespace, source = source.name(), "namespace source hit");
                source.load(namespace).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn sources(&self) -> &[Arc<dyn NamespaceSource>] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
