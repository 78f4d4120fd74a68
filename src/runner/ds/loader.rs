//! Module loaders.
//!
//! A loader is the unit of isolation: every module gets its own, and an
//! isolated realm resolves namespaces through it before anything else.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::runner::ds::error::Result;
use crate::runner::plugin::resolver::NamespaceSource;
use crate::runner::plugin::super_global::NamespaceTable;
use crate::runner::plugin::types::NamespaceDef;

pub struct ModuleLoader {
    id: Uuid,
    name: String,
    parent: Option<Arc<ModuleLoader>>,
    sources: NamespaceTable,
}

impl ModuleLoader {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleLoader {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: None,
            sources: NamespaceTable::new(),
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: Arc<ModuleLoader>) -> Self {
        ModuleLoader {
            parent: Some(parent),
            ..ModuleLoader::new(name)
        }
    }

    pub fn add_source(mut self, source: Arc<dyn NamespaceSource>) -> Self {
        self.sources.add_source(source);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ModuleLoader>> {
        self.parent.as_ref()
    }

    /// Parent-first lookup through the loader chain.
    pub fn find_source(&self, namespace: &str) -> Result<Option<NamespaceDef>> {
        if let Some(parent) = &self.parent {
            if let Some(def) = parent.find_source(namespace)? {
                return Ok(Some(def));
            }
        }
        self.sources.find(namespace)
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleLoader({}, {})", self.name, self.id.to_hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::value::Value;

    struct Tagged(&'static str, i64);

    impl NamespaceSource for Tagged {
        fn provides(&self, namespace: &str) -> bool {
            namespace == self.0
        }

        fn load(&self, namespace: &str) -> Result<NamespaceDef> {
            Ok(NamespaceDef::new(namespace).add_var("tag", Value::Integer(self.1)))
        }

        fn name(&self) -> &str {
            "tagged"
        }
    }

    #[test]
    fn test_parent_first() {
        let parent = Arc::new(ModuleLoader::new("parent").add_source(Arc::new(Tagged("a", 1))));
        let child = ModuleLoader::with_parent("child", parent)
            .add_source(Arc::new(Tagged("a", 2)))
            .add_source(Arc::new(Tagged("b", 3)));

        let a = child.find_source("a").unwrap().unwrap();
        assert_eq!(a.vars.get("tag"), Some(&Value::Integer(1)));
        let b = child.find_source("b").unwrap().unwrap();
        assert_eq!(b.vars.get("tag"), Some(&Value::Integer(3)));
        assert!(child.find_source("c").unwrap().is_none());
    }

    #[test]
    fn test_loaders_have_distinct_ids() {
        assert_ne!(ModuleLoader::new("x").id(), ModuleLoader::new("x").id());
    }
}
