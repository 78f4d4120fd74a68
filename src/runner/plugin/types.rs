//! Core types for namespace packages.

use std::collections::{HashMap, HashSet};

use crate::runner::ds::function_object::{Arity, ForeignFn, NativeFn};
use crate::runner::ds::error::Result;
use crate::runner::ds::value::Value;

/// Contents of one namespace as delivered by a source: the vars it interns
/// when required or loaded.
#[derive(Debug, Clone)]
pub struct NamespaceDef {
    /// Fully-qualified namespace name (e.g. "text").
    pub name: String,

    /// Var name -> root value.
    pub vars: HashMap<String, Value>,

    /// Vars that accept per-thread bindings.
    pub dynamic: HashSet<String>,
}

impl NamespaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceDef {
            name: name.into(),
            vars: HashMap::new(),
            dynamic: HashSet::new(),
        }
    }

    /// Add a compiled-in function. Its qualified name is `ns/name`.
    pub fn add_fn(self, name: &str, arity: Arity, func: NativeFn) -> Self {
        let qualified = format!("{}/{}", self.name, name);
        self.add_var(name, Value::Function(ForeignFn::native(qualified, arity, func)))
    }

    /// Add a function with captured state.
    pub fn add_closure<F>(self, name: &str, arity: Arity, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let qualified = format!("{}/{}", self.name, name);
        self.add_var(name, Value::Function(ForeignFn::closure(qualified, arity, func)))
    }

    /// Add a plain var.
    pub fn add_var(mut self, name: &str, value: Value) -> Self {
        self.vars.insert(name.to_string(), value);
        self
    }

    /// Add a dynamic var with its root value.
    pub fn add_dynamic(mut self, name: &str, root: Value) -> Self {
        self.dynamic.insert(name.to_string());
        self.add_var(name, root)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

/// Package metadata.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    /// Namespaces this package provides.
    pub provides: Vec<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageInfo {
            name: name.into(),
            version: version.into(),
            provides: Vec::new(),
        }
    }

    pub fn with_provides(mut self, provides: Vec<String>) -> Self {
        self.provides = provides;
        self
    }
}
